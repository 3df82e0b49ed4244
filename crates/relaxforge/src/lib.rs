//! RelaxForge - Lagrangian Relaxation in Rust
//!
//! Pick the constraints that make a model hard, dualize them, and let the
//! subgradient method price them into the objective.
//!
//! # Example
//!
//! ```rust
//! use relaxforge::prelude::*;
//!
//! let mut lr = LagrangianModel::new(MicrolpModel::new());
//! let x = lr.add_var(VarBounds::between(0.0, 8.0));
//! let y = lr.add_var(VarBounds::between(0.0, 8.0));
//! lr.update().unwrap();
//!
//! lr.dualize((x + y).leq(10.0)).unwrap();
//! lr.set_objective(x + y, Direction::Maximize);
//!
//! let outcome = lr.optimize(&LrConfig::default()).unwrap();
//! assert!(outcome.status.is_terminal());
//! assert_eq!(lr.inner().objective(), &(x + y));
//! ```

// Model building blocks
pub use relaxforge_core::{
    copy_model, ConstrId, ConstraintTemplate, Direction, LinearConstraint, LinearExpr, Model,
    RelaxForgeError, Result, Sense, SolveStatus, VarBounds, VarId, VarType,
};

// Configuration
pub use relaxforge_config::{ConfigError, LrConfig, MultiplierProjection};

// Relaxation engine
pub use relaxforge_solver::{
    DualHandle, DualRegistry, DualizedConstraint, IterationSnapshot, Iterations, LagrangianModel,
    LrOutcome, LrStatus,
};

#[cfg(feature = "microlp")]
pub use relaxforge_microlp::MicrolpModel;

#[cfg(feature = "console")]
pub use relaxforge_console as console;

mod relax;
pub use relax::{run_relaxation, run_relaxation_from, CONFIG_FILE};

pub mod prelude {
    pub use super::{
        ConstraintTemplate, Direction, LinearExpr, Model, Sense, SolveStatus, VarBounds, VarId,
        VarType,
    };
    pub use super::{
        IterationSnapshot, LagrangianModel, LrConfig, LrOutcome, LrStatus, MultiplierProjection,
    };
    #[cfg(feature = "microlp")]
    pub use super::MicrolpModel;
}
