//! Linear expressions over model variables.

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

use super::{ConstraintTemplate, VarId};

/// A linear expression `sum(coeff_i * x_i) + constant`.
///
/// Terms are kept in insertion order and are not merged, so two expressions
/// built by the same sequence of operations compare equal. Use
/// [`LinearExpr::collapsed`] to obtain a canonical form.
///
/// # Examples
///
/// ```
/// use relaxforge_core::{LinearExpr, VarId};
///
/// let x = VarId::new(0);
/// let y = VarId::new(1);
/// let expr = 2.0 * x + y - 3.0;
///
/// assert_eq!(expr.terms().len(), 2);
/// assert_eq!(expr.constant(), -3.0);
/// assert_eq!(expr.evaluate(&[1.0, 4.0]), Some(3.0));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LinearExpr {
    terms: Vec<(VarId, f64)>,
    constant: f64,
}

impl LinearExpr {
    /// The empty expression, equal to zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// A constant expression.
    pub fn from_constant(value: f64) -> Self {
        LinearExpr {
            terms: Vec::new(),
            constant: value,
        }
    }

    /// A single term `coeff * var`.
    pub fn term(var: VarId, coeff: f64) -> Self {
        LinearExpr {
            terms: vec![(var, coeff)],
            constant: 0.0,
        }
    }

    pub fn add_term(&mut self, var: VarId, coeff: f64) {
        self.terms.push((var, coeff));
    }

    pub fn add_constant(&mut self, value: f64) {
        self.constant += value;
    }

    pub fn terms(&self) -> &[(VarId, f64)] {
        &self.terms
    }

    pub fn constant(&self) -> f64 {
        self.constant
    }

    /// Returns true if the expression has no variable terms.
    pub fn is_constant(&self) -> bool {
        self.terms.is_empty()
    }

    /// Iterates the distinct variables referenced by the expression.
    pub fn vars(&self) -> impl Iterator<Item = VarId> + '_ {
        self.terms.iter().map(|&(var, _)| var)
    }

    /// Splits off the constant term.
    pub fn split_constant(mut self) -> (LinearExpr, f64) {
        let constant = std::mem::take(&mut self.constant);
        (self, constant)
    }

    /// Canonical form: one term per variable, sorted by variable, zero
    /// coefficients dropped.
    pub fn collapsed(&self) -> LinearExpr {
        let mut terms = self.terms.clone();
        terms.sort_by_key(|&(var, _)| var);

        let mut merged: Vec<(VarId, f64)> = Vec::with_capacity(terms.len());
        for (var, coeff) in terms {
            match merged.last_mut() {
                Some((last, acc)) if *last == var => *acc += coeff,
                _ => merged.push((var, coeff)),
            }
        }
        merged.retain(|&(_, coeff)| coeff != 0.0);

        LinearExpr {
            terms: merged,
            constant: self.constant,
        }
    }

    /// Evaluates the expression under a dense value vector.
    ///
    /// Returns `None` if a referenced variable has no value.
    pub fn evaluate(&self, values: &[f64]) -> Option<f64> {
        self.terms
            .iter()
            .try_fold(self.constant, |acc, &(var, coeff)| {
                values.get(var.index()).map(|v| acc + coeff * v)
            })
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

    fn scale(mut self, factor: f64) -> Self {
        for (_, coeff) in &mut self.terms {
            *coeff *= factor;
        }
        self.constant *= factor;
        self
    }
}

impl From<VarId> for LinearExpr {
    fn from(var: VarId) -> Self {
        LinearExpr::term(var, 1.0)
    }
}

impl From<f64> for LinearExpr {
    fn from(value: f64) -> Self {
        LinearExpr::from_constant(value)
    }
}

impl From<(VarId, f64)> for LinearExpr {
    fn from((var, coeff): (VarId, f64)) -> Self {
        LinearExpr::term(var, coeff)
    }
}

impl<R: Into<LinearExpr>> AddAssign<R> for LinearExpr {
    fn add_assign(&mut self, rhs: R) {
        let rhs = rhs.into();
        self.terms.extend(rhs.terms);
        self.constant += rhs.constant;
    }
}

impl<R: Into<LinearExpr>> SubAssign<R> for LinearExpr {
    fn sub_assign(&mut self, rhs: R) {
        *self += rhs.into().scale(-1.0);
    }
}

impl<R: Into<LinearExpr>> Add<R> for LinearExpr {
    type Output = LinearExpr;

    fn add(mut self, rhs: R) -> LinearExpr {
        self += rhs;
        self
    }
}

impl<R: Into<LinearExpr>> Sub<R> for LinearExpr {
    type Output = LinearExpr;

    fn sub(mut self, rhs: R) -> LinearExpr {
        self -= rhs;
        self
    }
}

impl Neg for LinearExpr {
    type Output = LinearExpr;

    fn neg(self) -> LinearExpr {
        self.scale(-1.0)
    }
}

impl Mul<f64> for LinearExpr {
    type Output = LinearExpr;

    fn mul(self, rhs: f64) -> LinearExpr {
        self.scale(rhs)
    }
}

impl Mul<LinearExpr> for f64 {
    type Output = LinearExpr;

    fn mul(self, rhs: LinearExpr) -> LinearExpr {
        rhs.scale(self)
    }
}

impl<R: Into<LinearExpr>> Add<R> for VarId {
    type Output = LinearExpr;

    fn add(self, rhs: R) -> LinearExpr {
        LinearExpr::from(self) + rhs
    }
}

impl<R: Into<LinearExpr>> Sub<R> for VarId {
    type Output = LinearExpr;

    fn sub(self, rhs: R) -> LinearExpr {
        LinearExpr::from(self) - rhs
    }
}

impl Neg for VarId {
    type Output = LinearExpr;

    fn neg(self) -> LinearExpr {
        LinearExpr::term(self, -1.0)
    }
}

impl Mul<f64> for VarId {
    type Output = LinearExpr;

    fn mul(self, rhs: f64) -> LinearExpr {
        LinearExpr::term(self, rhs)
    }
}

impl Mul<VarId> for f64 {
    type Output = LinearExpr;

    fn mul(self, rhs: VarId) -> LinearExpr {
        LinearExpr::term(rhs, self)
    }
}

impl Add<VarId> for f64 {
    type Output = LinearExpr;

    fn add(self, rhs: VarId) -> LinearExpr {
        LinearExpr::from_constant(self) + rhs
    }
}

impl Sub<VarId> for f64 {
    type Output = LinearExpr;

    fn sub(self, rhs: VarId) -> LinearExpr {
        LinearExpr::from_constant(self) - rhs
    }
}

impl Add<LinearExpr> for f64 {
    type Output = LinearExpr;

    fn add(self, rhs: LinearExpr) -> LinearExpr {
        rhs + self
    }
}

impl Sub<LinearExpr> for f64 {
    type Output = LinearExpr;

    fn sub(self, rhs: LinearExpr) -> LinearExpr {
        LinearExpr::from_constant(self) - rhs
    }
}

impl<T: Into<LinearExpr>> Sum<T> for LinearExpr {
    fn sum<I: Iterator<Item = T>>(iter: I) -> Self {
        iter.fold(LinearExpr::new(), |acc, item| acc + item)
    }
}

impl fmt::Display for LinearExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for &(var, coeff) in &self.terms {
            if first {
                write!(f, "{coeff} {var}")?;
                first = false;
            } else if coeff < 0.0 {
                write!(f, " - {} {var}", -coeff)?;
            } else {
                write!(f, " + {coeff} {var}")?;
            }
        }
        if first {
            write!(f, "{}", self.constant)
        } else if self.constant < 0.0 {
            write!(f, " - {}", -self.constant)
        } else if self.constant > 0.0 {
            write!(f, " + {}", self.constant)
        } else {
            Ok(())
        }
    }
}
