//! Lagrangian relaxation over a wrapped [`Model`].

mod iterations;

#[cfg(test)]
mod tests;

pub use iterations::Iterations;

use relaxforge_config::LrConfig;
use relaxforge_core::{
    ConstrId, ConstraintTemplate, Direction, LinearExpr, Model, RelaxForgeError, Result,
    SolveStatus, VarBounds, VarId, VarType,
};
use tracing::{debug, info, warn};

use crate::evaluator;
use crate::penalty::synthesize;
use crate::registry::{DualHandle, DualRegistry, DualizedConstraint};
use crate::scope::SessionScope;
use crate::snapshot::{IterationSnapshot, LrOutcome, LrStatus};

/// A model whose selected constraints are relaxed into the objective.
///
/// Wraps a backend [`Model`] and owns everything a relaxation session needs:
/// the dualized constraints with their multipliers, the base objective and
/// the iteration state.
///
/// # Example
///
/// ```
/// use relaxforge_core::{Direction, Model, VarBounds};
/// use relaxforge_solver::{LagrangianModel, LrConfig, LrStatus};
/// use relaxforge_test::ScriptedModel;
///
/// let mut lr = LagrangianModel::new(ScriptedModel::new());
/// let x = lr.add_var(VarBounds::between(0.0, 8.0));
/// let y = lr.add_var(VarBounds::between(0.0, 8.0));
/// lr.update().unwrap();
///
/// let handle = lr.dualize((x + y).leq(10.0)).unwrap();
/// lr.set_objective(x + y, Direction::Maximize);
/// assert_eq!(lr.multiplier(handle), Some(2.0));
///
/// // x = 4, y = 6, penalty = 0
/// lr.inner_mut().push_solution(vec![4.0, 6.0, 0.0]);
/// let outcome = lr.optimize(&LrConfig::default()).unwrap();
///
/// assert_eq!(outcome.status, LrStatus::Converged);
/// assert_eq!(lr.inner().objective(), &(x + y));
/// ```
#[derive(Debug)]
pub struct LagrangianModel<M: Model> {
    model: M,
    registry: DualRegistry,
    base_objective: Option<(LinearExpr, Direction)>,
    default_multiplier: f64,
    scope: SessionScope,
}

impl<M: Model> LagrangianModel<M> {
    pub fn new(model: M) -> Self {
        Self {
            model,
            registry: DualRegistry::new(),
            base_objective: None,
            default_multiplier: LrConfig::default().default_multiplier,
            scope: SessionScope::new(),
        }
    }

    /// The wrapped backend.
    pub fn inner(&self) -> &M {
        &self.model
    }

    /// Mutable access to the wrapped backend.
    ///
    /// Objectives set here are overwritten by the next session.
    pub fn inner_mut(&mut self) -> &mut M {
        &mut self.model
    }

    pub fn into_inner(self) -> M {
        self.model
    }

    pub fn add_var(&mut self, bounds: VarBounds) -> VarId {
        self.model.add_var(bounds)
    }

    /// Adds an integer or binary variable to the wrapped model.
    pub fn add_typed_var(&mut self, bounds: VarBounds, vtype: VarType) -> VarId {
        self.model.add_typed_var(bounds, vtype)
    }

    /// Adds a hard constraint to the wrapped model.
    pub fn add_constr(&mut self, template: ConstraintTemplate) -> Result<ConstrId> {
        let constraint = template.to_constraint()?;
        self.model.add_constr(constraint)
    }

    pub fn update(&mut self) -> Result<()> {
        self.model.update()
    }

    /// Relaxes `template` into the objective.
    ///
    /// Creates its penalty variable and linking constraint in the wrapped
    /// model and registers it with the multiplier of the last session's
    /// configuration, or the default.
    ///
    /// # Errors
    ///
    /// [`RelaxForgeError::UnsupportedConstraintKind`] if the operator is not
    /// recognized; neither the model nor the registry is changed. Backend
    /// errors propagate.
    pub fn dualize(&mut self, template: ConstraintTemplate) -> Result<DualHandle> {
        let link = synthesize(&mut self.model, &template)?;
        self.registry.register(DualizedConstraint::new(
            template,
            link.sense,
            link.penalty,
            link.link,
            self.default_multiplier,
        ))
    }

    /// Records the base objective.
    ///
    /// The wrapped model's active objective is not touched until a session
    /// runs; every session restores it when it ends.
    pub fn set_objective(&mut self, expr: impl Into<LinearExpr>, direction: Direction) {
        self.base_objective = Some((expr.into(), direction));
    }

    pub fn base_objective(&self) -> Option<(&LinearExpr, Direction)> {
        self.base_objective
            .as_ref()
            .map(|(expr, direction)| (expr, *direction))
    }

    /// Starts a session and returns its iterations.
    ///
    /// Every multiplier is reset to `config.default_multiplier`, the step
    /// size to 0 and the denominator to `config.start_denominator`. Each
    /// item is the snapshot of one solve; the iterator ends after a
    /// converged or exhausted round, or after the first error. Dropping it
    /// early ends the session as [`LrStatus::Exhausted`]. The base objective
    /// is restored in every case.
    ///
    /// # Errors
    ///
    /// [`RelaxForgeError::Config`] for an invalid configuration,
    /// [`RelaxForgeError::InvalidState`] if no objective was set.
    pub fn iterate(&mut self, config: &LrConfig) -> Result<Iterations<'_, M>> {
        config.validate()?;
        if self.base_objective.is_none() {
            return Err(RelaxForgeError::InvalidState(
                "no objective set before starting a relaxation session".to_string(),
            ));
        }
        self.model.update()?;

        self.default_multiplier = config.default_multiplier;
        self.registry.reset_multipliers(config.default_multiplier);
        self.scope.start_session(config);

        info!(
            event = "session_start",
            dualized = self.registry.len(),
            max_iterations = config.max_iterations,
            update_period = config.update_period,
            epsilon = config.epsilon,
        );

        Ok(Iterations::new(self, config.clone()))
    }

    /// Runs a session to completion.
    ///
    /// ```
    /// use relaxforge_core::{Direction, VarBounds};
    /// use relaxforge_solver::{LagrangianModel, LrConfig, LrStatus};
    /// use relaxforge_test::ScriptedModel;
    ///
    /// let mut lr = LagrangianModel::new(ScriptedModel::new());
    /// let x = lr.add_var(VarBounds::non_negative());
    /// lr.update().unwrap();
    /// lr.dualize(x.leq(1.0)).unwrap();
    /// lr.set_objective(x, Direction::Maximize);
    ///
    /// // Always violated: x = 3, penalty = -2.
    /// lr.inner_mut().push_solution(vec![3.0, -2.0]);
    /// let config = LrConfig::new().with_max_iterations(5).with_trace();
    /// let outcome = lr.optimize(&config).unwrap();
    ///
    /// assert_eq!(outcome.status, LrStatus::Exhausted);
    /// assert_eq!(outcome.iterations, 5);
    /// assert_eq!(outcome.trace.len(), 5);
    /// ```
    pub fn optimize(&mut self, config: &LrConfig) -> Result<LrOutcome> {
        let mut trace = Vec::new();
        let mut final_snapshot = None;

        for item in self.iterate(config)? {
            let snapshot = item?;
            if config.record_trace {
                trace.push(snapshot.clone());
            }
            final_snapshot = Some(snapshot);
        }

        Ok(LrOutcome {
            status: self.status(),
            iterations: self.iteration(),
            final_snapshot,
            trace,
        })
    }

    /// True if the current solution satisfies every dualized constraint.
    ///
    /// False while no solution is available.
    pub fn primal_feasible(&self) -> bool {
        self.model.values().map_or(false, |values| {
            evaluator::primal_feasible(&self.registry, values, self.scope.epsilon())
        })
    }

    /// True if every dualized constraint has a zero multiplier or a zero
    /// penalty in the current solution.
    ///
    /// False while no solution is available.
    pub fn complementary_slackness(&self) -> bool {
        self.model.values().map_or(false, |values| {
            evaluator::complementary_slackness(&self.registry, values, self.scope.epsilon())
        })
    }

    pub fn record(&self, handle: DualHandle) -> Option<&DualizedConstraint> {
        self.registry.get(handle)
    }

    pub fn multiplier(&self, handle: DualHandle) -> Option<f64> {
        self.registry.get(handle).map(DualizedConstraint::multiplier)
    }

    pub fn penalty_var(&self, handle: DualHandle) -> Option<VarId> {
        self.registry.get(handle).map(DualizedConstraint::penalty)
    }

    /// Penalty value in the current solution.
    pub fn penalty_value(&self, handle: DualHandle) -> Option<f64> {
        self.penalty_var(handle)
            .and_then(|penalty| self.model.value(penalty))
    }

    pub fn template(&self, handle: DualHandle) -> Option<&ConstraintTemplate> {
        self.registry.get(handle).map(DualizedConstraint::template)
    }

    /// Current multipliers, in handle order.
    pub fn multipliers(&self) -> Vec<f64> {
        self.registry.multipliers()
    }

    /// Penalty values of the current solution, in handle order.
    pub fn penalty_values(&self) -> Option<Vec<f64>> {
        let values = self.model.values()?;
        self.registry
            .iter()
            .map(|record| values.get(record.penalty().index()).copied())
            .collect()
    }

    /// Number of completed solves in the current or last session.
    pub fn iteration(&self) -> u64 {
        self.scope.iteration()
    }

    pub fn step_size(&self) -> f64 {
        self.scope.schedule().step_size()
    }

    pub fn denominator(&self) -> f64 {
        self.scope.schedule().denominator()
    }

    pub fn status(&self) -> LrStatus {
        self.scope.status()
    }

    pub fn dualized_count(&self) -> usize {
        self.registry.len()
    }

    pub fn registry(&self) -> &DualRegistry {
        &self.registry
    }

    pub fn scope(&self) -> &SessionScope {
        &self.scope
    }

    /// Performs one round of the subgradient method.
    ///
    /// Leaves the scope `Converged` or `Exhausted` on the last round.
    fn step(&mut self, config: &LrConfig) -> Result<IterationSnapshot> {
        let (base, direction) = self.base_objective.clone().ok_or_else(|| {
            RelaxForgeError::InvalidState("base objective missing during session".to_string())
        })?;
        let index = self.scope.iteration();
        let multipliers = self.registry.multipliers();

        let mut objective = base;
        for record in self.registry.iter() {
            objective += record.multiplier() * record.penalty();
        }
        self.model.set_objective(objective, direction)?;

        let iteration = self.scope.increment_iteration();
        match self.model.optimize()? {
            SolveStatus::Optimal => {}
            SolveStatus::Infeasible => {
                warn!(event = "relaxation_infeasible", iteration = iteration);
                return Err(RelaxForgeError::RelaxationInfeasible { iteration });
            }
            SolveStatus::Unbounded => {
                warn!(event = "relaxation_unbounded", iteration = iteration);
                return Err(RelaxForgeError::RelaxationUnbounded { iteration });
            }
        }

        let step_size_updated = self.scope.schedule_mut().advance(index);
        let step_size = self.scope.schedule().step_size();
        let epsilon = config.epsilon;

        let values = self.model.values().ok_or_else(|| {
            RelaxForgeError::Model("optimal solve returned no variable values".to_string())
        })?;
        let primal_feasible = evaluator::primal_feasible(&self.registry, values, epsilon);
        let complementary_slackness =
            evaluator::complementary_slackness(&self.registry, values, epsilon);
        let penalties = self
            .registry
            .iter()
            .map(|record| {
                values.get(record.penalty().index()).copied().ok_or_else(|| {
                    RelaxForgeError::Model(format!(
                        "no value for penalty variable {}",
                        record.penalty()
                    ))
                })
            })
            .collect::<Result<Vec<f64>>>()?;
        let objective_value = self.model.objective_value().ok_or_else(|| {
            RelaxForgeError::Model("optimal solve returned no objective value".to_string())
        })?;

        let snapshot = IterationSnapshot {
            iteration,
            objective_value,
            multipliers,
            penalties,
            step_size,
            step_size_updated,
            primal_feasible,
            complementary_slackness,
        };

        debug!(
            event = "iteration",
            iteration = iteration,
            objective = objective_value,
            step_size = step_size,
            feasible = primal_feasible,
            slackness = complementary_slackness,
            max_penalty = snapshot.max_abs_penalty(),
        );

        if snapshot.is_optimal() {
            self.scope.end_session(LrStatus::Converged);
            return Ok(snapshot);
        }

        self.registry.apply_subgradient(
            &snapshot.penalties,
            step_size,
            config.multiplier_projection,
            direction,
        );
        if iteration >= config.max_iterations {
            self.scope.end_session(LrStatus::Exhausted);
        }

        Ok(snapshot)
    }

    fn restore_base_objective(&mut self) -> Result<()> {
        match &self.base_objective {
            Some((expr, direction)) => self.model.set_objective(expr.clone(), *direction),
            None => Ok(()),
        }
    }
}
