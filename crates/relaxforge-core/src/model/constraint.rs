//! Relational senses, normalized constraints and constraint templates.

use std::fmt;
use std::str::FromStr;

use super::LinearExpr;
use crate::error::{RelaxForgeError, Result};

/// Relational operator of a linear constraint.
///
/// Parses the symbols used by common modelling layers. The single-character
/// forms `<` and `>` denote the non-strict relations, as they do in
/// constraint senses reported by LP/MIP backends.
///
/// # Examples
///
/// ```
/// use relaxforge_core::Sense;
///
/// assert_eq!("<=".parse::<Sense>().unwrap(), Sense::LessEqual);
/// assert_eq!("=".parse::<Sense>().unwrap(), Sense::Equal);
/// assert!("!=".parse::<Sense>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Sense {
    LessEqual,
    Equal,
    GreaterEqual,
}

impl Sense {
    pub fn symbol(self) -> &'static str {
        match self {
            Sense::LessEqual => "<=",
            Sense::Equal => "==",
            Sense::GreaterEqual => ">=",
        }
    }

    /// Returns true if `lhs <sense> rhs` holds within `tolerance`.
    pub fn holds(self, lhs: f64, rhs: f64, tolerance: f64) -> bool {
        match self {
            Sense::LessEqual => lhs <= rhs + tolerance,
            Sense::GreaterEqual => lhs >= rhs - tolerance,
            Sense::Equal => rhs - tolerance <= lhs && lhs <= rhs + tolerance,
        }
    }
}

impl FromStr for Sense {
    type Err = RelaxForgeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "<=" | "<" | "=<" => Ok(Sense::LessEqual),
            "==" | "=" => Ok(Sense::Equal),
            ">=" | ">" | "=>" => Ok(Sense::GreaterEqual),
            other => Err(RelaxForgeError::UnsupportedConstraintKind(other.to_string())),
        }
    }
}

impl TryFrom<&str> for Sense {
    type Error = RelaxForgeError;

    fn try_from(s: &str) -> Result<Self> {
        s.parse()
    }
}

impl fmt::Display for Sense {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A constraint in backend form: `expr <sense> rhs`, with no constant in
/// `expr`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LinearConstraint {
    pub expr: LinearExpr,
    pub sense: Sense,
    pub rhs: f64,
}

impl LinearConstraint {
    /// Creates a constraint, moving any constant of `expr` to the right-hand
    /// side.
    pub fn new(expr: LinearExpr, sense: Sense, rhs: f64) -> Self {
        let (expr, constant) = expr.split_constant();
        LinearConstraint {
            expr,
            sense,
            rhs: rhs - constant,
        }
    }

    /// Creates `lhs <sense> rhs` from two expressions.
    ///
    /// # Examples
    ///
    /// ```
    /// use relaxforge_core::{LinearConstraint, LinearExpr, Sense, VarId};
    ///
    /// let x = VarId::new(0);
    /// // x + 2 <= 7  ->  x <= 5
    /// let c = LinearConstraint::from_sides(x + 2.0, Sense::LessEqual, LinearExpr::from(7.0));
    /// assert_eq!(c.rhs, 5.0);
    /// assert_eq!(c.expr.constant(), 0.0);
    /// ```
    pub fn from_sides(lhs: LinearExpr, sense: Sense, rhs: LinearExpr) -> Self {
        LinearConstraint::new(lhs - rhs, sense, 0.0)
    }

    /// Returns true if the constraint holds for `values` within `tolerance`.
    /// Returns `None` if a referenced variable has no value.
    pub fn is_satisfied(&self, values: &[f64], tolerance: f64) -> Option<bool> {
        self.expr
            .evaluate(values)
            .map(|lhs| self.sense.holds(lhs, self.rhs, tolerance))
    }
}

impl fmt::Display for LinearConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.expr, self.sense, self.rhs)
    }
}

/// An unposted relation `lhs <op> rhs`, captured before it reaches a model.
///
/// The operator is kept as the symbol it was written with and is only
/// interpreted by [`ConstraintTemplate::sense`]. This lets a template carry
/// an operator RelaxForge cannot dualize; the failure then surfaces at the
/// point of dualization.
///
/// # Examples
///
/// ```
/// use relaxforge_core::{ConstraintTemplate, Sense, VarId};
///
/// let x = VarId::new(0);
/// let y = VarId::new(1);
///
/// let t = (x + y).leq(10.0);
/// assert_eq!(t.sense().unwrap(), Sense::LessEqual);
///
/// let odd = ConstraintTemplate::new(x, "!=", y);
/// assert!(odd.sense().is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConstraintTemplate {
    lhs: LinearExpr,
    operator: String,
    rhs: LinearExpr,
}

impl ConstraintTemplate {
    pub fn new(
        lhs: impl Into<LinearExpr>,
        operator: impl Into<String>,
        rhs: impl Into<LinearExpr>,
    ) -> Self {
        ConstraintTemplate {
            lhs: lhs.into(),
            operator: operator.into(),
            rhs: rhs.into(),
        }
    }

    pub fn with_sense(lhs: impl Into<LinearExpr>, sense: Sense, rhs: impl Into<LinearExpr>) -> Self {
        ConstraintTemplate::new(lhs, sense.symbol(), rhs)
    }

    /// `lhs <= rhs`
    pub fn le(lhs: impl Into<LinearExpr>, rhs: impl Into<LinearExpr>) -> Self {
        ConstraintTemplate::with_sense(lhs, Sense::LessEqual, rhs)
    }

    /// `lhs == rhs`
    #[allow(clippy::should_implement_trait)]
    pub fn eq(lhs: impl Into<LinearExpr>, rhs: impl Into<LinearExpr>) -> Self {
        ConstraintTemplate::with_sense(lhs, Sense::Equal, rhs)
    }

    /// `lhs >= rhs`
    pub fn ge(lhs: impl Into<LinearExpr>, rhs: impl Into<LinearExpr>) -> Self {
        ConstraintTemplate::with_sense(lhs, Sense::GreaterEqual, rhs)
    }

    pub fn lhs(&self) -> &LinearExpr {
        &self.lhs
    }

    pub fn rhs(&self) -> &LinearExpr {
        &self.rhs
    }

    /// The operator symbol as written.
    pub fn operator(&self) -> &str {
        &self.operator
    }

    /// Interprets the operator symbol.
    ///
    /// # Errors
    ///
    /// Returns [`RelaxForgeError::UnsupportedConstraintKind`] for anything
    /// other than the `<=`, `==` and `>=` families.
    pub fn sense(&self) -> Result<Sense> {
        self.operator.parse()
    }

    /// Converts the template to backend form.
    pub fn to_constraint(&self) -> Result<LinearConstraint> {
        Ok(LinearConstraint::from_sides(
            self.lhs.clone(),
            self.sense()?,
            self.rhs.clone(),
        ))
    }
}

impl fmt::Display for ConstraintTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.lhs, self.operator, self.rhs)
    }
}
