//! Penalty variable synthesis.
//!
//! Dualizing `lhs <op> rhs` creates a penalty variable `p` and the linking
//! constraint `p == rhs - lhs`. The bounds of `p` follow the operator:
//!
//! | operator | bounds of `p` |
//! |----------|---------------|
//! | `<=`     | `p >= 0`      |
//! | `==`     | free          |
//! | `>=`     | `p <= 0`      |

use relaxforge_core::{
    ConstrId, ConstraintTemplate, LinearConstraint, LinearExpr, Model, RelaxForgeError, Result,
    Sense, VarBounds, VarId,
};
use tracing::debug;

/// Model objects created for one dualized constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PenaltyLink {
    pub sense: Sense,
    pub penalty: VarId,
    pub link: ConstrId,
}

/// Bounds of the penalty variable of a constraint with the given sense.
///
/// # Example
///
/// ```
/// use relaxforge_core::{Sense, VarBounds};
/// use relaxforge_solver::penalty_bounds;
///
/// assert_eq!(penalty_bounds(Sense::LessEqual), VarBounds::non_negative());
/// assert_eq!(penalty_bounds(Sense::GreaterEqual), VarBounds::non_positive());
/// assert_eq!(penalty_bounds(Sense::Equal), VarBounds::free());
/// ```
pub fn penalty_bounds(sense: Sense) -> VarBounds {
    match sense {
        Sense::LessEqual => VarBounds::non_negative(),
        Sense::GreaterEqual => VarBounds::non_positive(),
        Sense::Equal => VarBounds::free(),
    }
}

/// Creates the penalty variable and linking constraint for `template`.
///
/// The operator and the referenced variables are checked before the model
/// is touched, so a rejected template leaves the model unchanged. The model
/// is committed after the variable is created and again after the
/// constraint, so the constraint always references a committed variable.
///
/// # Errors
///
/// Returns [`RelaxForgeError::UnsupportedConstraintKind`] for an operator
/// other than `<=`, `==` or `>=`, [`RelaxForgeError::Model`] if the template
/// references a variable the model does not have, and propagates backend
/// errors.
///
/// [`RelaxForgeError::UnsupportedConstraintKind`]: relaxforge_core::RelaxForgeError::UnsupportedConstraintKind
/// [`RelaxForgeError::Model`]: relaxforge_core::RelaxForgeError::Model
pub fn synthesize<M>(model: &mut M, template: &ConstraintTemplate) -> Result<PenaltyLink>
where
    M: Model + ?Sized,
{
    let sense = template.sense()?;
    let var_count = model.var_count();
    if let Some(var) = template
        .lhs()
        .vars()
        .chain(template.rhs().vars())
        .find(|var| var.index() >= var_count)
    {
        return Err(RelaxForgeError::Model(format!(
            "dualized constraint references unknown variable {var}"
        )));
    }

    let penalty = model.add_var(penalty_bounds(sense));
    model.update()?;

    let violation = template.rhs().clone() - template.lhs().clone();
    let link = model.add_constr(LinearConstraint::from_sides(
        LinearExpr::from(penalty),
        Sense::Equal,
        violation,
    ))?;
    model.update()?;

    debug!(
        event = "dualize",
        penalty = penalty.index(),
        link = link.index(),
        sense = %sense,
        constraint = %template,
    );

    Ok(PenaltyLink {
        sense,
        penalty,
        link,
    })
}
