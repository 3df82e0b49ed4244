//! RelaxForge Solver Engine
//!
//! This crate provides the Lagrangian relaxation loop including:
//! - Dualized constraint registry and penalty variable synthesis
//! - Harmonic step-size schedule
//! - Primal feasibility and complementary slackness tests
//! - The subgradient iteration engine, eager or one round at a time
//!
//! Logging levels:
//! - **INFO**: Session start/end
//! - **DEBUG**: Dualized constraints, one line per iteration
//! - **TRACE**: Individual multiplier updates

pub mod evaluator;
pub mod lagrangian;
pub mod penalty;
pub mod registry;
pub mod scope;
pub mod snapshot;
pub mod step;

pub use evaluator::{complementary_slackness, primal_feasible};
pub use lagrangian::{Iterations, LagrangianModel};
pub use penalty::{penalty_bounds, synthesize, PenaltyLink};
pub use registry::{DualHandle, DualRegistry, DualizedConstraint};
pub use scope::SessionScope;
pub use snapshot::{IterationSnapshot, LrOutcome, LrStatus};
pub use step::StepSchedule;

pub use relaxforge_config::{LrConfig, MultiplierProjection};
