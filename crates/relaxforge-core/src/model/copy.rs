//! Copying one model into another backend.

use super::{LinearExpr, Model, VarId};
use crate::error::{RelaxForgeError, Result};

/// Copies every variable (bounds and type), constraint and the objective of `source` into
/// `target`.
///
/// Returns the variable mapping: entry `i` is the handle in `target` of the
/// `i`-th variable of `source`. Constraints whose expression is empty are
/// skipped.
pub fn copy_model<S, T>(source: &S, target: &mut T) -> Result<Vec<VarId>>
where
    S: Model + ?Sized,
    T: Model + ?Sized,
{
    let var_map: Vec<VarId> = source
        .var_bounds()
        .iter()
        .zip(source.var_types())
        .map(|(&bounds, &vtype)| target.add_typed_var(bounds, vtype))
        .collect();

    target.update()?;

    for constraint in source.constraints() {
        if constraint.expr.is_constant() {
            continue;
        }
        let mut copied = constraint.clone();
        copied.expr = remap(&constraint.expr, &var_map)?;
        target.add_constr(copied)?;
    }

    target.set_objective(remap(source.objective(), &var_map)?, source.direction())?;
    target.update()?;

    Ok(var_map)
}

fn remap(expr: &LinearExpr, var_map: &[VarId]) -> Result<LinearExpr> {
    let mut mapped = LinearExpr::from_constant(expr.constant());
    for &(var, coeff) in expr.terms() {
        let target_var = var_map.get(var.index()).ok_or_else(|| {
            RelaxForgeError::Model(format!("source model references unknown variable {var}"))
        })?;
        mapped.add_term(*target_var, coeff);
    }
    Ok(mapped)
}
