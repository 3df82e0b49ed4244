//! Primal feasibility and complementary slackness tests.
//!
//! Both tests are read-only over an already computed solution and never
//! trigger a solve. A value vector that does not cover a referenced variable
//! counts as a failed test.

use crate::registry::DualRegistry;

/// Returns true if the solution satisfies every dualized constraint in its
/// original form, within `epsilon`.
///
/// - `lhs <= rhs`: `lhs <= rhs + epsilon`
/// - `lhs >= rhs`: `lhs >= rhs - epsilon`
/// - `lhs == rhs`: `rhs - epsilon <= lhs <= rhs + epsilon`
///
/// Stops at the first violated constraint.
pub fn primal_feasible(registry: &DualRegistry, values: &[f64], epsilon: f64) -> bool {
    registry.iter().all(|record| {
        let template = record.template();
        match (
            template.lhs().evaluate(values),
            template.rhs().evaluate(values),
        ) {
            (Some(lhs), Some(rhs)) => record.sense().holds(lhs, rhs, epsilon),
            _ => false,
        }
    })
}

/// Returns true if, for every dualized constraint, the multiplier or the
/// penalty value is within `epsilon` of zero.
pub fn complementary_slackness(registry: &DualRegistry, values: &[f64], epsilon: f64) -> bool {
    registry.iter().all(|record| {
        match values.get(record.penalty().index()) {
            Some(penalty) => record.multiplier().abs() <= epsilon || penalty.abs() <= epsilon,
            None => false,
        }
    })
}

#[cfg(test)]
#[path = "evaluator_tests.rs"]
mod tests;
