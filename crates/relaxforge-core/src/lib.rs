//! RelaxForge Core - Model types and solver traits for Lagrangian relaxation
//!
//! This crate provides the fundamental abstractions shared by RelaxForge:
//! - Linear expressions over decision variables
//! - Constraint templates and normalized linear constraints
//! - The [`Model`] trait implemented by LP/MIP backends
//! - The error type used across the workspace

pub mod error;
pub mod model;

pub use error::{RelaxForgeError, Result};
pub use model::{
    copy_model, ConstrId, ConstraintTemplate, Direction, LinearConstraint, LinearExpr, Model,
    Sense, SolveStatus, VarBounds, VarId, VarType,
};
