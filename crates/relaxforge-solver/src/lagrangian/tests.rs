//! Tests for the relaxation engine, driven by the scripted backend.

use super::*;
use crate::MultiplierProjection;
use relaxforge_core::LinearConstraint;
use relaxforge_test::{ScriptedModel, ScriptedSolve};

/// `max x + y` over `x, y in [0, 8]`.
fn xy_model() -> (LagrangianModel<ScriptedModel>, VarId, VarId) {
    let mut lr = LagrangianModel::new(ScriptedModel::new());
    let x = lr.add_var(VarBounds::between(0.0, 8.0));
    let y = lr.add_var(VarBounds::between(0.0, 8.0));
    lr.update().unwrap();
    lr.set_objective(x + y, Direction::Maximize);
    (lr, x, y)
}

fn base() -> LinearExpr {
    VarId::new(0) + VarId::new(1)
}

#[test]
fn test_dualize_creates_penalty_and_link() {
    let (mut lr, x, y) = xy_model();
    let handle = lr.dualize((x + y).leq(10.0)).unwrap();

    let penalty = lr.penalty_var(handle).unwrap();
    assert_eq!(penalty, VarId::new(2));
    assert_eq!(
        lr.inner().var_bounds()[penalty.index()],
        VarBounds::non_negative()
    );

    let link = lr.record(handle).unwrap().link();
    let constraint = &lr.inner().constraints()[link.index()];
    assert_eq!(constraint.is_satisfied(&[4.0, 6.0, 0.0], 1e-9), Some(true));
    assert_eq!(constraint.is_satisfied(&[4.0, 3.0, 3.0], 1e-9), Some(true));
    assert_eq!(constraint.is_satisfied(&[4.0, 6.0, 1.0], 1e-9), Some(false));

    assert_eq!(lr.template(handle), Some(&(x + y).leq(10.0)));
    assert_eq!(lr.multiplier(handle), Some(2.0));
    assert_eq!(lr.dualized_count(), 1);
}

#[test]
fn test_unsupported_operator_leaves_state_unchanged() {
    let (mut lr, x, y) = xy_model();
    let err = lr
        .dualize(ConstraintTemplate::new(x + y, "!=", 10.0))
        .unwrap_err();

    assert!(matches!(err, RelaxForgeError::UnsupportedConstraintKind(op) if op == "!="));
    assert_eq!(lr.dualized_count(), 0);
    assert_eq!(lr.inner().var_count(), 2);
    assert!(lr.inner().constraints().is_empty());
}

#[test]
fn test_unknown_variable_leaves_state_unchanged() {
    let (mut lr, x, _) = xy_model();
    let err = lr.dualize((x + VarId::new(7)).leq(10.0)).unwrap_err();

    assert!(matches!(err, RelaxForgeError::Model(_)));
    assert_eq!(lr.dualized_count(), 0);
    assert_eq!(lr.inner().var_count(), 2);
    assert!(lr.inner().constraints().is_empty());
}

#[test]
fn test_hard_constraint_forwarded() {
    let (mut lr, x, _) = xy_model();
    let id = lr.add_constr(x.leq(3.0)).unwrap();

    assert_eq!(id.index(), 0);
    assert_eq!(lr.inner().constraints().len(), 1);
    assert_eq!(lr.dualized_count(), 0);
}

#[test]
fn test_first_iteration_updates_every_multiplier() {
    let (mut lr, x, y) = xy_model();
    let a = lr.dualize(x.leq(1.0)).unwrap();
    let b = lr.dualize(y.geq(5.0)).unwrap();
    assert_eq!(lr.multipliers(), vec![2.0, 2.0]);

    // x = 3, y = 2: penalties 1 - 3 = -2 and 5 - 2 = 3
    lr.inner_mut().push_solution(vec![3.0, 2.0, -2.0, 3.0]);
    let config = LrConfig::new().with_max_iterations(10);
    let mut iterations = lr.iterate(&config).unwrap();
    let snapshot = iterations.next().unwrap().unwrap();

    assert_eq!(snapshot.iteration, 1);
    assert_eq!(snapshot.multipliers, vec![2.0, 2.0]);
    assert_eq!(snapshot.penalties, vec![-2.0, 3.0]);
    assert_eq!(snapshot.step_size, 1.0);
    assert!(snapshot.step_size_updated);
    assert!(!snapshot.primal_feasible);
    assert!(!snapshot.complementary_slackness);
    assert_eq!(iterations.model().multipliers(), vec![4.0, -1.0]);
    drop(iterations);

    assert_eq!(lr.multiplier(a), Some(4.0));
    assert_eq!(lr.multiplier(b), Some(-1.0));
}

#[test]
fn test_first_step_uses_start_denominator() {
    let (mut lr, x, y) = xy_model();
    lr.dualize(x.leq(1.0)).unwrap();
    lr.dualize(y.geq(5.0)).unwrap();

    lr.inner_mut().push_solution(vec![3.0, 2.0, -2.0, 3.0]);
    let config = LrConfig::new().with_start_denominator(4.0);
    let mut iterations = lr.iterate(&config).unwrap();
    iterations.next().unwrap().unwrap();
    drop(iterations);

    assert_eq!(lr.multipliers(), vec![2.5, 1.25]);
    assert_eq!(lr.step_size(), 0.25);
    assert_eq!(lr.denominator(), 5.0);
}

#[test]
fn test_penalized_objective_rebuilt_from_base() {
    let (mut lr, x, y) = xy_model();
    lr.dualize(x.leq(1.0)).unwrap();
    lr.dualize(y.geq(5.0)).unwrap();
    let (p1, p2) = (VarId::new(2), VarId::new(3));

    lr.inner_mut().push_solution(vec![3.0, 2.0, -2.0, 3.0]);
    lr.optimize(&LrConfig::new().with_max_iterations(2))
        .unwrap();

    let history = lr.inner().objective_history();
    assert_eq!(history.len(), 3);
    assert_eq!(
        history[0].0.collapsed(),
        (x + y + 2.0 * p1 + 2.0 * p2).collapsed()
    );
    assert_eq!(
        history[1].0.collapsed(),
        (x + y + 4.0 * p1 - 1.0 * p2).collapsed()
    );
    assert!(history.iter().all(|(_, d)| *d == Direction::Maximize));
    assert_eq!(history[2], (base(), Direction::Maximize));
}

#[test]
fn test_converging_round_keeps_multipliers() {
    let (mut lr, x, y) = xy_model();
    let handle = lr.dualize((x + y).leq(10.0)).unwrap();

    lr.inner_mut().push_solution(vec![4.0, 6.0, 0.0]);
    let outcome = lr.optimize(&LrConfig::default()).unwrap();

    assert_eq!(outcome.status, LrStatus::Converged);
    assert_eq!(outcome.iterations, 1);
    assert_eq!(lr.multiplier(handle), Some(2.0));
    assert_eq!(lr.status(), LrStatus::Converged);
    assert!(lr.primal_feasible());
    assert!(lr.complementary_slackness());
    assert_eq!(lr.penalty_value(handle), Some(0.0));

    let last = outcome.final_snapshot.as_ref().unwrap();
    assert!(last.is_optimal());
    assert_eq!(outcome.objective_value(), Some(10.0));
}

#[test]
fn test_exhaustion_restores_objective() {
    let (mut lr, x, _) = xy_model();
    lr.dualize(x.leq(1.0)).unwrap();

    lr.inner_mut().push_solution(vec![3.0, 0.0, -2.0]);
    let outcome = lr
        .optimize(&LrConfig::new().with_max_iterations(3))
        .unwrap();

    assert_eq!(outcome.status, LrStatus::Exhausted);
    assert_eq!(outcome.iterations, 3);
    assert_eq!(lr.inner().objective(), &base());
    assert_eq!(lr.inner().direction(), Direction::Maximize);
    assert_eq!(lr.inner().solve_count(), 3);
    // the last round still updates: 2 + 1 * 2 each round, step stays 1
    assert_eq!(lr.multipliers(), vec![8.0]);
}

#[test]
fn test_infeasible_relaxation_ends_session() {
    let (mut lr, x, _) = xy_model();
    lr.dualize(x.leq(1.0)).unwrap();

    lr.inner_mut().push(ScriptedSolve::Infeasible);
    let err = lr.optimize(&LrConfig::default()).unwrap_err();

    assert_eq!(err, RelaxForgeError::RelaxationInfeasible { iteration: 1 });
    assert_eq!(lr.status(), LrStatus::Exhausted);
    assert_eq!(lr.inner().objective(), &base());
    assert!(!lr.primal_feasible());
}

#[test]
fn test_unbounded_relaxation_fuses_iterator() {
    let (mut lr, x, _) = xy_model();
    lr.dualize(x.leq(1.0)).unwrap();

    lr.inner_mut()
        .push_solution(vec![3.0, 0.0, -2.0])
        .push(ScriptedSolve::Unbounded);
    let config = LrConfig::default();
    let mut iterations = lr.iterate(&config).unwrap();

    assert!(iterations.next().unwrap().is_ok());
    assert_eq!(
        iterations.next().unwrap().unwrap_err(),
        RelaxForgeError::RelaxationUnbounded { iteration: 2 }
    );
    assert!(iterations.is_finished());
    assert!(iterations.next().is_none());
    assert!(iterations.next().is_none());
    drop(iterations);

    assert_eq!(lr.status(), LrStatus::Exhausted);
    assert_eq!(lr.inner().objective(), &base());
}

#[test]
fn test_early_drop_restores_objective() {
    let (mut lr, x, _) = xy_model();
    lr.dualize(x.leq(1.0)).unwrap();

    lr.inner_mut().push_solution(vec![3.0, 0.0, -2.0]);
    let config = LrConfig::default();
    let mut iterations = lr.iterate(&config).unwrap();
    iterations.next().unwrap().unwrap();
    assert_eq!(iterations.model().status(), LrStatus::Running);
    drop(iterations);

    assert_eq!(lr.status(), LrStatus::Exhausted);
    assert_eq!(lr.iteration(), 1);
    assert_eq!(lr.inner().objective(), &base());
}

/// Scripted backend whose `set_objective` fails from the given call on.
#[derive(Debug, Default)]
struct FailingObjective {
    inner: ScriptedModel,
    calls: usize,
    fail_from: usize,
}

impl Model for FailingObjective {
    fn add_typed_var(&mut self, bounds: VarBounds, vtype: VarType) -> VarId {
        self.inner.add_typed_var(bounds, vtype)
    }

    fn add_constr(&mut self, constraint: LinearConstraint) -> Result<ConstrId> {
        self.inner.add_constr(constraint)
    }

    fn update(&mut self) -> Result<()> {
        self.inner.update()
    }

    fn set_objective(&mut self, expr: LinearExpr, direction: Direction) -> Result<()> {
        self.calls += 1;
        if self.calls >= self.fail_from {
            return Err(RelaxForgeError::Model("objective rejected".to_string()));
        }
        self.inner.set_objective(expr, direction)
    }

    fn objective(&self) -> &LinearExpr {
        self.inner.objective()
    }

    fn direction(&self) -> Direction {
        self.inner.direction()
    }

    fn optimize(&mut self) -> Result<SolveStatus> {
        self.inner.optimize()
    }

    fn objective_value(&self) -> Option<f64> {
        self.inner.objective_value()
    }

    fn values(&self) -> Option<&[f64]> {
        self.inner.values()
    }

    fn var_bounds(&self) -> &[VarBounds] {
        self.inner.var_bounds()
    }

    fn var_types(&self) -> &[VarType] {
        self.inner.var_types()
    }

    fn constraints(&self) -> &[LinearConstraint] {
        self.inner.constraints()
    }
}

#[test]
fn test_failed_restore_keeps_converged_snapshot() {
    // call 1 sets the penalized objective, call 2 is the restore
    let mut lr = LagrangianModel::new(FailingObjective {
        fail_from: 2,
        ..FailingObjective::default()
    });
    let x = lr.add_var(VarBounds::between(0.0, 8.0));
    lr.update().unwrap();
    lr.dualize(x.leq(4.0)).unwrap();
    lr.set_objective(x, Direction::Maximize);
    lr.inner_mut().inner.push_solution(vec![4.0, 0.0]);

    let config = LrConfig::default();
    let snapshots: Vec<_> = lr.iterate(&config).unwrap().collect();

    assert_eq!(snapshots.len(), 1);
    let snapshot = snapshots[0].as_ref().unwrap();
    assert!(snapshot.is_optimal());
    assert_eq!(snapshot.objective_value, 4.0);
    assert_eq!(lr.status(), LrStatus::Converged);
    assert!(lr.primal_feasible());
}

#[test]
fn test_failed_restore_keeps_solve_error() {
    let mut lr = LagrangianModel::new(FailingObjective {
        fail_from: 2,
        ..FailingObjective::default()
    });
    let x = lr.add_var(VarBounds::free());
    lr.update().unwrap();
    lr.dualize(x.leq(1.0)).unwrap();
    lr.set_objective(x, Direction::Maximize);
    lr.inner_mut().inner.push(ScriptedSolve::Unbounded);

    let err = lr.optimize(&LrConfig::default()).unwrap_err();
    assert!(matches!(
        err,
        RelaxForgeError::RelaxationUnbounded { iteration: 1 }
    ));
    assert_eq!(lr.status(), LrStatus::Exhausted);
}

#[test]
fn test_step_size_follows_update_period() {
    let (mut lr, x, _) = xy_model();
    lr.dualize(x.leq(1.0)).unwrap();

    lr.inner_mut().push_solution(vec![3.0, 0.0, -2.0]);
    let config = LrConfig::new()
        .with_max_iterations(7)
        .with_update_period(3)
        .with_trace();
    let outcome = lr.optimize(&config).unwrap();

    let updated: Vec<u64> = outcome
        .trace
        .iter()
        .filter(|s| s.step_size_updated)
        .map(|s| s.iteration)
        .collect();
    let sizes: Vec<f64> = outcome.trace.iter().map(|s| s.step_size).collect();

    assert_eq!(updated, vec![1, 4, 7]);
    assert_eq!(sizes, vec![1.0, 1.0, 1.0, 0.5, 0.5, 0.5, 1.0 / 3.0]);
    assert_eq!(lr.denominator(), 4.0);
}

#[test]
fn test_trace_only_when_requested() {
    let (mut lr, x, _) = xy_model();
    lr.dualize(x.leq(1.0)).unwrap();
    lr.inner_mut().push_solution(vec![3.0, 0.0, -2.0]);

    let outcome = lr
        .optimize(&LrConfig::new().with_max_iterations(4))
        .unwrap();
    assert!(outcome.trace.is_empty());
    assert_eq!(outcome.final_snapshot.unwrap().iteration, 4);

    let outcome = lr
        .optimize(&LrConfig::new().with_max_iterations(4).with_trace())
        .unwrap();
    assert_eq!(outcome.trace.len(), 4);
    assert_eq!(outcome.trace.last(), outcome.final_snapshot.as_ref());
}

#[test]
fn test_missing_objective_rejected() {
    let mut lr = LagrangianModel::new(ScriptedModel::new());
    let x = lr.add_var(VarBounds::free());
    lr.update().unwrap();
    lr.dualize(x.leq(1.0)).unwrap();

    let err = lr.optimize(&LrConfig::default()).unwrap_err();
    assert!(matches!(err, RelaxForgeError::InvalidState(_)));
    assert_eq!(lr.status(), LrStatus::Idle);
}

#[test]
fn test_invalid_config_rejected_before_start() {
    let (mut lr, x, _) = xy_model();
    lr.dualize(x.leq(1.0)).unwrap();

    let err = lr
        .optimize(&LrConfig::new().with_update_period(0))
        .unwrap_err();
    assert!(matches!(err, RelaxForgeError::Config(_)));
    assert_eq!(lr.status(), LrStatus::Idle);
    assert_eq!(lr.inner().solve_count(), 0);
}

#[test]
fn test_multipliers_reset_between_sessions() {
    let (mut lr, x, y) = xy_model();
    lr.dualize(x.leq(1.0)).unwrap();
    lr.inner_mut().push_solution(vec![3.0, 0.0, -2.0]);

    lr.optimize(&LrConfig::new().with_max_iterations(5))
        .unwrap();
    assert_ne!(lr.multipliers(), vec![2.0]);

    let config = LrConfig::new()
        .with_max_iterations(1)
        .with_default_multiplier(0.5)
        .with_trace();
    let outcome = lr.optimize(&config).unwrap();
    assert_eq!(outcome.trace[0].multipliers, vec![0.5]);
    assert_eq!(lr.iteration(), 1);

    // later dualizations start from the last session's default
    let handle = lr.dualize(y.leq(4.0)).unwrap();
    assert_eq!(lr.multiplier(handle), Some(0.5));
}

#[test]
fn test_sign_constrained_projection_converges() {
    // x = -4 satisfies x <= 1 but the penalty 5 keeps slackness open
    let values = vec![-4.0, 0.0, 5.0];

    let (mut lr, x, _) = xy_model();
    let handle = lr.dualize(x.leq(1.0)).unwrap();
    lr.inner_mut().push_solution(values.clone());
    let config = LrConfig::new()
        .with_max_iterations(10)
        .with_multiplier_projection(MultiplierProjection::SignConstrained);
    let outcome = lr.optimize(&config).unwrap();

    assert_eq!(outcome.status, LrStatus::Converged);
    assert_eq!(outcome.iterations, 2);
    assert_eq!(lr.multiplier(handle), Some(0.0));

    let (mut lr, x, _) = xy_model();
    let handle = lr.dualize(x.leq(1.0)).unwrap();
    lr.inner_mut().push_solution(values);
    let outcome = lr
        .optimize(&LrConfig::new().with_max_iterations(10))
        .unwrap();

    assert_eq!(outcome.status, LrStatus::Exhausted);
    assert!(lr.multiplier(handle).unwrap() < 0.0);
}

#[test]
fn test_queries_before_any_solve() {
    let (mut lr, x, _) = xy_model();
    let handle = lr.dualize(x.leq(1.0)).unwrap();

    assert_eq!(lr.status(), LrStatus::Idle);
    assert!(!lr.primal_feasible());
    assert!(!lr.complementary_slackness());
    assert_eq!(lr.penalty_values(), None);
    assert_eq!(lr.penalty_value(handle), None);
    assert_eq!(lr.iteration(), 0);
    assert_eq!(lr.step_size(), 0.0);
}

#[test]
fn test_queries_are_repeatable() {
    let (mut lr, x, y) = xy_model();
    lr.dualize((x + y).leq(10.0)).unwrap();
    lr.inner_mut().push_solution(vec![4.0, 7.0, -1.0]);
    lr.optimize(&LrConfig::new().with_max_iterations(1))
        .unwrap();
    let solves = lr.inner().solve_count();

    let first = (lr.primal_feasible(), lr.complementary_slackness());
    for _ in 0..3 {
        assert_eq!((lr.primal_feasible(), lr.complementary_slackness()), first);
    }
    assert_eq!(first, (false, false));
    assert_eq!(lr.penalty_values(), Some(vec![-1.0]));
    assert_eq!(lr.inner().solve_count(), solves);
}

#[test]
fn test_unknown_handle_yields_none() {
    let (mut other, x, y) = xy_model();
    other.dualize(x.leq(1.0)).unwrap();
    let foreign = other.dualize(y.leq(1.0)).unwrap();

    let (mut lr, x, _) = xy_model();
    lr.dualize(x.leq(1.0)).unwrap();

    assert_eq!(lr.multiplier(foreign), None);
    assert_eq!(lr.penalty_var(foreign), None);
    assert_eq!(lr.template(foreign), None);
    assert!(lr.record(foreign).is_none());
}
