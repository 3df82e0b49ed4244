//! Linear model abstractions.
//!
//! RelaxForge never solves a model itself. It drives a [`Model`] backend:
//! anything that accepts bounded, typed variables, linear constraints and a linear
//! objective, and returns variable values for the current snapshot.

mod constraint;
mod copy;
mod expr;


use std::fmt;

pub use constraint::{ConstraintTemplate, LinearConstraint, Sense};
pub use copy::copy_model;
pub use expr::LinearExpr;

use crate::error::Result;

/// Handle to a decision variable of a [`Model`].
///
/// Handles are dense: the n-th variable created in a model has index n.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VarId(usize);

impl VarId {
    #[inline]
    pub const fn new(index: usize) -> Self {
        VarId(index)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0
    }

    /// Builds the template `self <= rhs`.
    pub fn leq(self, rhs: impl Into<LinearExpr>) -> ConstraintTemplate {
        ConstraintTemplate::le(self, rhs)
    }

    /// Builds the template `self == rhs`.
    pub fn equals(self, rhs: impl Into<LinearExpr>) -> ConstraintTemplate {
        ConstraintTemplate::eq(self, rhs)
    }

    /// Builds the template `self >= rhs`.
    pub fn geq(self, rhs: impl Into<LinearExpr>) -> ConstraintTemplate {
        ConstraintTemplate::ge(self, rhs)
    }
}

impl fmt::Display for VarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "x{}", self.0)
    }
}

/// Handle to a linear constraint of a [`Model`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConstrId(usize);

impl ConstrId {
    #[inline]
    pub const fn new(index: usize) -> Self {
        ConstrId(index)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Lower and upper bound of a variable. `None` means unbounded on that side.
///
/// # Examples
///
/// ```
/// use relaxforge_core::VarBounds;
///
/// let b = VarBounds::non_negative();
/// assert_eq!(b.lower, Some(0.0));
/// assert_eq!(b.upper, None);
/// assert!(b.contains(3.5, 0.0));
/// assert!(!b.contains(-1.0, 1e-6));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VarBounds {
    pub lower: Option<f64>,
    pub upper: Option<f64>,
}

impl VarBounds {
    /// Unrestricted in sign.
    pub const fn free() -> Self {
        VarBounds {
            lower: None,
            upper: None,
        }
    }

    /// `[0, +inf)`
    pub const fn non_negative() -> Self {
        VarBounds {
            lower: Some(0.0),
            upper: None,
        }
    }

    /// `(-inf, 0]`
    pub const fn non_positive() -> Self {
        VarBounds {
            lower: None,
            upper: Some(0.0),
        }
    }

    /// `[lower, upper]`
    pub const fn between(lower: f64, upper: f64) -> Self {
        VarBounds {
            lower: Some(lower),
            upper: Some(upper),
        }
    }

    /// Returns true if `value` lies within the bounds, widened by `tolerance`.
    pub fn contains(&self, value: f64, tolerance: f64) -> bool {
        self.lower.map_or(true, |lo| value >= lo - tolerance)
            && self.upper.map_or(true, |hi| value <= hi + tolerance)
    }
}

/// Domain of a decision variable.
///
/// Binary variables take values in `{0, 1}` regardless of the bounds they
/// were created with; bounds can only tighten that range further.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum VarType {
    #[default]
    Continuous,
    Integer,
    Binary,
}

impl VarType {
    /// Returns true for integer and binary variables.
    pub fn is_integral(self) -> bool {
        !matches!(self, VarType::Continuous)
    }
}

impl fmt::Display for VarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VarType::Continuous => write!(f, "continuous"),
            VarType::Integer => write!(f, "integer"),
            VarType::Binary => write!(f, "binary"),
        }
    }
}

/// Optimization direction of an objective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Direction {
    Minimize,
    #[default]
    Maximize,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Minimize => write!(f, "minimize"),
            Direction::Maximize => write!(f, "maximize"),
        }
    }
}

/// Outcome of a single [`Model::optimize`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SolveStatus {
    /// An optimal solution is available through [`Model::values`].
    Optimal,
    Infeasible,
    Unbounded,
}

/// An LP/MIP backend driven by the relaxation engine.
///
/// Variables and constraints are created in a pending state and become
/// referenceable once [`Model::update`] commits them. Backends that have no
/// such distinction can treat `update` as a no-op, but they must still
/// reject constraints over variables they do not know.
pub trait Model {
    /// Creates a decision variable of the given type.
    fn add_typed_var(&mut self, bounds: VarBounds, vtype: VarType) -> VarId;

    /// Creates a continuous decision variable with the given bounds.
    fn add_var(&mut self, bounds: VarBounds) -> VarId {
        self.add_typed_var(bounds, VarType::Continuous)
    }

    /// Creates a linear constraint.
    ///
    /// # Errors
    ///
    /// Returns [`RelaxForgeError::Model`](crate::RelaxForgeError::Model) if the
    /// expression references a variable that is unknown or not yet committed.
    fn add_constr(&mut self, constraint: LinearConstraint) -> Result<ConstrId>;

    /// Commits pending variables and constraints.
    fn update(&mut self) -> Result<()>;

    /// Replaces the active objective.
    fn set_objective(&mut self, expr: LinearExpr, direction: Direction) -> Result<()>;

    /// Returns the active objective expression.
    fn objective(&self) -> &LinearExpr;

    /// Returns the active optimization direction.
    fn direction(&self) -> Direction;

    /// Optimizes the current model snapshot.
    fn optimize(&mut self) -> Result<SolveStatus>;

    /// Objective value of the last optimal solve, if any.
    fn objective_value(&self) -> Option<f64>;

    /// Variable values of the last optimal solve, indexed by [`VarId::index`].
    ///
    /// Values stay available until the next [`Model::optimize`] call, even
    /// if the objective is replaced in between.
    fn values(&self) -> Option<&[f64]>;

    /// Bounds of every variable, indexed by [`VarId::index`].
    fn var_bounds(&self) -> &[VarBounds];

    /// Type of every variable, indexed by [`VarId::index`].
    fn var_types(&self) -> &[VarType];

    /// Every constraint, indexed by [`ConstrId::index`].
    fn constraints(&self) -> &[LinearConstraint];

    /// Type of a single variable, or `None` for an unknown handle.
    fn var_type(&self, var: VarId) -> Option<VarType> {
        self.var_types().get(var.index()).copied()
    }

    /// Value of a single variable in the last optimal solve.
    fn value(&self, var: VarId) -> Option<f64> {
        self.values()
            .and_then(|values| values.get(var.index()).copied())
    }

    /// Number of variables, committed or pending.
    fn var_count(&self) -> usize {
        self.var_bounds().len()
    }
}
