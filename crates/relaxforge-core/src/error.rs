//! Error types for RelaxForge

use thiserror::Error;

/// Main error type for RelaxForge operations
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RelaxForgeError {
    /// Relational operator of a constraint template is not `<=`, `==` or `>=`
    #[error("Unsupported constraint kind: {0:?}")]
    UnsupportedConstraintKind(String),

    /// The penalized subproblem has no feasible solution
    #[error("Relaxation infeasible at iteration {iteration}")]
    RelaxationInfeasible {
        /// 1-based iteration on which the solve failed.
        iteration: u64,
    },

    /// The penalized subproblem is unbounded in the optimization direction
    #[error("Relaxation unbounded at iteration {iteration}")]
    RelaxationUnbounded {
        /// 1-based iteration on which the solve failed.
        iteration: u64,
    },

    /// Error in session configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Misuse of the underlying model (unknown or uncommitted variable, ...)
    #[error("Model error: {0}")]
    Model(String),

    /// Invalid operation for current session state
    #[error("Invalid state: {0}")]
    InvalidState(String),
}

/// Result type alias for RelaxForge operations
pub type Result<T> = std::result::Result<T, RelaxForgeError>;
