//! Scripted `Model` backend.
//!
//! [`ScriptedModel`] behaves like a real backend for model building (pending
//! variables, `update` commits, unknown variables are rejected) but does not
//! solve anything: every `optimize` call pops the next scripted result. The
//! last scripted result repeats once the script runs out.

use std::collections::VecDeque;

use relaxforge_core::{
    ConstrId, Direction, LinearConstraint, LinearExpr, Model, RelaxForgeError, Result,
    SolveStatus, VarBounds, VarId, VarType,
};

/// One scripted `optimize` result.
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptedSolve {
    /// Optimal with these variable values. Missing trailing values are 0.
    Optimal(Vec<f64>),
    Infeasible,
    Unbounded,
}

/// Deterministic [`Model`] double.
///
/// # Example
///
/// ```
/// use relaxforge_core::{Direction, Model, SolveStatus, VarBounds};
/// use relaxforge_test::ScriptedModel;
///
/// let mut model = ScriptedModel::new();
/// let x = model.add_var(VarBounds::non_negative());
/// model.update().unwrap();
/// model.set_objective(3.0 * x, Direction::Maximize).unwrap();
///
/// model.push_solution(vec![2.0]);
/// assert_eq!(model.optimize().unwrap(), SolveStatus::Optimal);
/// assert_eq!(model.objective_value(), Some(6.0));
/// assert_eq!(model.value(x), Some(2.0));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ScriptedModel {
    bounds: Vec<VarBounds>,
    types: Vec<VarType>,
    committed_vars: usize,
    constraints: Vec<LinearConstraint>,
    objective: LinearExpr,
    direction: Direction,
    objective_history: Vec<(LinearExpr, Direction)>,
    script: VecDeque<ScriptedSolve>,
    last: Option<ScriptedSolve>,
    values: Option<Vec<f64>>,
    objective_value: Option<f64>,
    solve_count: usize,
    update_count: usize,
}

impl ScriptedModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a scripted result.
    pub fn push(&mut self, solve: ScriptedSolve) -> &mut Self {
        self.script.push_back(solve);
        self
    }

    /// Appends an optimal result with the given values.
    pub fn push_solution(&mut self, values: Vec<f64>) -> &mut Self {
        self.push(ScriptedSolve::Optimal(values))
    }

    /// Builder form of [`ScriptedModel::push`].
    pub fn with_solve(mut self, solve: ScriptedSolve) -> Self {
        self.push(solve);
        self
    }

    /// Every objective passed to `set_objective`, oldest first.
    pub fn objective_history(&self) -> &[(LinearExpr, Direction)] {
        &self.objective_history
    }

    pub fn solve_count(&self) -> usize {
        self.solve_count
    }

    pub fn update_count(&self) -> usize {
        self.update_count
    }

    /// Number of variables committed by `update`.
    pub fn committed_vars(&self) -> usize {
        self.committed_vars
    }

    fn check_vars(&self, expr: &LinearExpr, limit: usize, what: &str) -> Result<()> {
        match expr.vars().find(|v| v.index() >= limit) {
            Some(var) => Err(RelaxForgeError::Model(format!(
                "{what} references {} variable {var}",
                if var.index() < self.bounds.len() {
                    "uncommitted"
                } else {
                    "unknown"
                }
            ))),
            None => Ok(()),
        }
    }
}

impl Model for ScriptedModel {
    fn add_typed_var(&mut self, bounds: VarBounds, vtype: VarType) -> VarId {
        self.bounds.push(bounds);
        self.types.push(vtype);
        VarId::new(self.bounds.len() - 1)
    }

    fn add_constr(&mut self, constraint: LinearConstraint) -> Result<ConstrId> {
        self.check_vars(&constraint.expr, self.committed_vars, "constraint")?;
        self.constraints.push(constraint);
        Ok(ConstrId::new(self.constraints.len() - 1))
    }

    fn update(&mut self) -> Result<()> {
        self.committed_vars = self.bounds.len();
        self.update_count += 1;
        Ok(())
    }

    fn set_objective(&mut self, expr: LinearExpr, direction: Direction) -> Result<()> {
        self.check_vars(&expr, self.bounds.len(), "objective")?;
        self.objective_history.push((expr.clone(), direction));
        self.objective = expr;
        self.direction = direction;
        Ok(())
    }

    fn objective(&self) -> &LinearExpr {
        &self.objective
    }

    fn direction(&self) -> Direction {
        self.direction
    }

    fn optimize(&mut self) -> Result<SolveStatus> {
        self.solve_count += 1;
        let solve = match self.script.pop_front() {
            Some(solve) => {
                self.last = Some(solve.clone());
                solve
            }
            None => self
                .last
                .clone()
                .unwrap_or_else(|| ScriptedSolve::Optimal(Vec::new())),
        };

        match solve {
            ScriptedSolve::Optimal(mut values) => {
                values.resize(self.bounds.len(), 0.0);
                self.objective_value = self.objective.evaluate(&values);
                self.values = Some(values);
                Ok(SolveStatus::Optimal)
            }
            ScriptedSolve::Infeasible => {
                self.values = None;
                self.objective_value = None;
                Ok(SolveStatus::Infeasible)
            }
            ScriptedSolve::Unbounded => {
                self.values = None;
                self.objective_value = None;
                Ok(SolveStatus::Unbounded)
            }
        }
    }

    fn objective_value(&self) -> Option<f64> {
        self.objective_value
    }

    fn values(&self) -> Option<&[f64]> {
        self.values.as_deref()
    }

    fn var_bounds(&self) -> &[VarBounds] {
        &self.bounds
    }

    fn var_types(&self) -> &[VarType] {
        &self.types
    }

    fn constraints(&self) -> &[LinearConstraint] {
        &self.constraints
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uncommitted_variable_rejected() {
        let mut model = ScriptedModel::new();
        let x = model.add_var(VarBounds::free());

        let err = model
            .add_constr(LinearConstraint::new(x.into(), relaxforge_core::Sense::Equal, 0.0))
            .unwrap_err();
        assert!(matches!(err, RelaxForgeError::Model(_)));

        model.update().unwrap();
        assert!(model
            .add_constr(LinearConstraint::new(x.into(), relaxforge_core::Sense::Equal, 0.0))
            .is_ok());
    }

    #[test]
    fn test_last_result_repeats() {
        let mut model = ScriptedModel::new();
        let x = model.add_var(VarBounds::free());
        model.update().unwrap();
        model
            .push_solution(vec![1.0])
            .push(ScriptedSolve::Infeasible);

        assert_eq!(model.optimize().unwrap(), SolveStatus::Optimal);
        assert_eq!(model.value(x), Some(1.0));
        assert_eq!(model.optimize().unwrap(), SolveStatus::Infeasible);
        assert_eq!(model.optimize().unwrap(), SolveStatus::Infeasible);
        assert_eq!(model.values(), None);
        assert_eq!(model.solve_count(), 3);
    }

    #[test]
    fn test_values_padded_to_var_count() {
        let mut model = ScriptedModel::new();
        model.add_var(VarBounds::free());
        model.add_var(VarBounds::free());
        model.update().unwrap();

        model.optimize().unwrap();
        assert_eq!(model.values(), Some(&[0.0, 0.0][..]));
    }

    #[test]
    fn test_var_types_recorded() {
        let mut model = ScriptedModel::new();
        let x = model.add_var(VarBounds::free());
        let b = model.add_typed_var(VarBounds::between(0.0, 1.0), VarType::Binary);

        assert_eq!(model.var_type(x), Some(VarType::Continuous));
        assert_eq!(model.var_type(b), Some(VarType::Binary));
        assert_eq!(model.var_type(VarId::new(2)), None);
    }

    #[test]
    fn test_objective_history() {
        let mut model = ScriptedModel::new();
        let x = model.add_var(VarBounds::free());
        model.set_objective(x.into(), Direction::Minimize).unwrap();
        model.set_objective(2.0 * x, Direction::Maximize).unwrap();

        assert_eq!(model.objective_history().len(), 2);
        assert_eq!(model.objective(), &(2.0 * x));
        assert_eq!(model.direction(), Direction::Maximize);
    }
}
