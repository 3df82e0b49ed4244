//! [`Model`] backend over the `microlp` solver.
//!
//! `microlp` solves linear programs with the simplex method and switches to
//! branch and bound as soon as a problem has integer or binary variables.
//! Continuous-only models stay plain LPs.
//!
//! The backend keeps the model in RelaxForge form and rebuilds the `microlp`
//! problem on every [`Model::optimize`] call, so objectives can be swapped
//! freely between solves.
//!
//! # Example
//!
//! ```
//! use relaxforge_core::{Direction, Model, SolveStatus, VarBounds};
//! use relaxforge_microlp::MicrolpModel;
//!
//! let mut model = MicrolpModel::new();
//! let x = model.add_var(VarBounds::non_negative());
//! let y = model.add_var(VarBounds::non_negative());
//! model.update().unwrap();
//! model.add_constr((x + y).leq(4.0).to_constraint().unwrap()).unwrap();
//! model.set_objective(2.0 * x + y, Direction::Maximize).unwrap();
//!
//! assert_eq!(model.optimize().unwrap(), SolveStatus::Optimal);
//! assert!((model.objective_value().unwrap() - 8.0).abs() < 1e-9);
//! ```

use microlp::{ComparisonOp, OptimizationDirection, Problem, Variable};
use relaxforge_core::{
    ConstrId, Direction, LinearConstraint, LinearExpr, Model, RelaxForgeError, Result, Sense,
    SolveStatus, VarBounds, VarId, VarType,
};
use tracing::trace;

/// Tolerance for constraints without variable terms.
const CONSTANT_TOLERANCE: f64 = 1e-9;

/// Integral values closer than this to an integer are snapped to it.
const INTEGRALITY_TOLERANCE: f64 = 1e-6;

/// LP/MIP model solved by `microlp`.
#[derive(Debug, Clone, Default)]
pub struct MicrolpModel {
    bounds: Vec<VarBounds>,
    types: Vec<VarType>,
    committed: usize,
    constraints: Vec<LinearConstraint>,
    objective: LinearExpr,
    direction: Direction,
    values: Option<Vec<f64>>,
    objective_value: Option<f64>,
}

impl MicrolpModel {
    pub fn new() -> Self {
        Self::default()
    }

    fn check_vars(&self, expr: &LinearExpr, limit: usize) -> Result<()> {
        match expr.vars().find(|v| v.index() >= limit) {
            Some(var) if var.index() < self.bounds.len() => Err(RelaxForgeError::Model(format!(
                "variable {var} is not committed; call update() first"
            ))),
            Some(var) => Err(RelaxForgeError::Model(format!("unknown variable {var}"))),
            None => Ok(()),
        }
    }

    fn clear_solution(&mut self) {
        self.values = None;
        self.objective_value = None;
    }

    fn build(&self) -> Result<Option<(Problem, Vec<Variable>)>> {
        let mut coeffs = vec![0.0; self.bounds.len()];
        for &(var, coeff) in self.objective.terms() {
            *coeffs.get_mut(var.index()).ok_or_else(|| unknown(var))? += coeff;
        }

        let mut problem = Problem::new(match self.direction {
            Direction::Minimize => OptimizationDirection::Minimize,
            Direction::Maximize => OptimizationDirection::Maximize,
        });
        let mut vars = Vec::with_capacity(self.bounds.len());
        for ((bounds, &vtype), coeff) in self.bounds.iter().zip(&self.types).zip(coeffs) {
            let var = if vtype.is_integral() {
                let (lower, upper) = integral_range(bounds, vtype);
                if lower > upper {
                    return Ok(None);
                }
                problem.add_integer_var(coeff, (lower, upper))
            } else {
                problem.add_var(
                    coeff,
                    (
                        bounds.lower.unwrap_or(f64::NEG_INFINITY),
                        bounds.upper.unwrap_or(f64::INFINITY),
                    ),
                )
            };
            vars.push(var);
        }

        for constraint in &self.constraints {
            let expr = constraint.expr.collapsed();
            if expr.is_constant() {
                if constraint.sense.holds(0.0, constraint.rhs, CONSTANT_TOLERANCE) {
                    continue;
                }
                return Ok(None);
            }

            let mut lp_expr = microlp::LinearExpr::empty();
            for &(var, coeff) in expr.terms() {
                let lp_var = vars.get(var.index()).ok_or_else(|| unknown(var))?;
                lp_expr.add(*lp_var, coeff);
            }
            problem.add_constraint(lp_expr, comparison(constraint.sense), constraint.rhs);
        }

        Ok(Some((problem, vars)))
    }
}

/// Integer range of an integral variable. Binary variables are clipped to
/// `[0, 1]`; open sides of integer variables saturate to the `i32` range.
fn integral_range(bounds: &VarBounds, vtype: VarType) -> (i32, i32) {
    let (lower, upper) = match vtype {
        VarType::Binary => (
            bounds.lower.map_or(0.0, |lo| lo.max(0.0)),
            bounds.upper.map_or(1.0, |hi| hi.min(1.0)),
        ),
        _ => (
            bounds.lower.unwrap_or(f64::NEG_INFINITY),
            bounds.upper.unwrap_or(f64::INFINITY),
        ),
    };
    // float-to-int casts saturate
    (
        (lower - INTEGRALITY_TOLERANCE).ceil() as i32,
        (upper + INTEGRALITY_TOLERANCE).floor() as i32,
    )
}

fn snap(value: f64, vtype: VarType) -> f64 {
    let rounded = value.round();
    if vtype.is_integral() && (value - rounded).abs() < INTEGRALITY_TOLERANCE {
        rounded
    } else {
        value
    }
}

fn unknown(var: VarId) -> RelaxForgeError {
    RelaxForgeError::Model(format!("unknown variable {var}"))
}

fn comparison(sense: Sense) -> ComparisonOp {
    match sense {
        Sense::LessEqual => ComparisonOp::Le,
        Sense::Equal => ComparisonOp::Eq,
        Sense::GreaterEqual => ComparisonOp::Ge,
    }
}

impl Model for MicrolpModel {
    fn add_typed_var(&mut self, bounds: VarBounds, vtype: VarType) -> VarId {
        self.bounds.push(bounds);
        self.types.push(vtype);
        VarId::new(self.bounds.len() - 1)
    }

    fn add_constr(&mut self, constraint: LinearConstraint) -> Result<ConstrId> {
        self.check_vars(&constraint.expr, self.committed)?;
        self.constraints.push(constraint);
        Ok(ConstrId::new(self.constraints.len() - 1))
    }

    fn update(&mut self) -> Result<()> {
        self.committed = self.bounds.len();
        Ok(())
    }

    fn set_objective(&mut self, expr: LinearExpr, direction: Direction) -> Result<()> {
        self.check_vars(&expr, self.bounds.len())?;
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
        self.update()?;
        self.clear_solution();

        let Some((problem, vars)) = self.build()? else {
            trace!(event = "lp_solve", status = "infeasible", reason = "empty domain");
            return Ok(SolveStatus::Infeasible);
        };

        let status = match problem.solve() {
            Ok(solution) => {
                self.values = Some(
                    vars.iter()
                        .zip(&self.types)
                        .map(|(&var, &vtype)| snap(solution[var], vtype))
                        .collect(),
                );
                self.objective_value = Some(solution.objective() + self.objective.constant());
                SolveStatus::Optimal
            }
            Err(microlp::Error::Infeasible) => SolveStatus::Infeasible,
            Err(microlp::Error::Unbounded) => SolveStatus::Unbounded,
            Err(e) => return Err(RelaxForgeError::Model(format!("microlp: {e}"))),
        };

        trace!(
            event = "lp_solve",
            vars = self.bounds.len(),
            integral = self.types.iter().filter(|t| t.is_integral()).count(),
            constraints = self.constraints.len(),
            status = ?status,
            objective = ?self.objective_value,
        );
        Ok(status)
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
