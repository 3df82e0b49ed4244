//! Session status and per-iteration snapshots.

use std::fmt;

/// Lifecycle of a relaxation session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LrStatus {
    /// No session has run yet.
    #[default]
    Idle,
    Running,
    /// The relaxed solution is primal feasible and complementary slack.
    Converged,
    /// The session stopped without converging: iteration limit, early stop,
    /// or a failed subproblem solve.
    Exhausted,
}

impl LrStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, LrStatus::Converged | LrStatus::Exhausted)
    }
}

impl fmt::Display for LrStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LrStatus::Idle => "idle",
            LrStatus::Running => "running",
            LrStatus::Converged => "converged",
            LrStatus::Exhausted => "exhausted",
        };
        f.write_str(name)
    }
}

/// State observed after one subgradient iteration.
///
/// `multipliers` are the values used to build that iteration's objective,
/// `penalties` the penalty variable values of its solution. Both are in
/// dual-handle order.
#[derive(Debug, Clone, PartialEq)]
pub struct IterationSnapshot {
    /// 1-based iteration number.
    pub iteration: u64,
    pub objective_value: f64,
    pub multipliers: Vec<f64>,
    pub penalties: Vec<f64>,
    pub step_size: f64,
    /// Whether the step size was recomputed on this iteration.
    pub step_size_updated: bool,
    pub primal_feasible: bool,
    pub complementary_slackness: bool,
}

impl IterationSnapshot {
    /// Both termination tests hold.
    pub fn is_optimal(&self) -> bool {
        self.primal_feasible && self.complementary_slackness
    }

    /// Largest absolute penalty value, 0 without dualized constraints.
    pub fn max_abs_penalty(&self) -> f64 {
        self.penalties.iter().fold(0.0, |acc: f64, p| acc.max(p.abs()))
    }
}

/// Result of a session run to completion.
#[derive(Debug, Clone, PartialEq)]
pub struct LrOutcome {
    pub status: LrStatus,
    /// Number of iterations performed.
    pub iterations: u64,
    /// Snapshot of the last iteration.
    pub final_snapshot: Option<IterationSnapshot>,
    /// Every snapshot, if the configuration asked for a trace.
    pub trace: Vec<IterationSnapshot>,
}

impl LrOutcome {
    pub fn is_converged(&self) -> bool {
        self.status == LrStatus::Converged
    }

    /// Penalized objective value of the last iteration.
    pub fn objective_value(&self) -> Option<f64> {
        self.final_snapshot.as_ref().map(|s| s.objective_value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(feasible: bool, slack: bool) -> IterationSnapshot {
        IterationSnapshot {
            iteration: 1,
            objective_value: 12.0,
            multipliers: vec![2.0, 2.0],
            penalties: vec![-3.0, 1.5],
            step_size: 1.0,
            step_size_updated: true,
            primal_feasible: feasible,
            complementary_slackness: slack,
        }
    }

    #[test]
    fn test_optimal_needs_both_tests() {
        assert!(snapshot(true, true).is_optimal());
        assert!(!snapshot(true, false).is_optimal());
        assert!(!snapshot(false, true).is_optimal());
    }

    #[test]
    fn test_max_abs_penalty() {
        assert_eq!(snapshot(true, true).max_abs_penalty(), 3.0);
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(!LrStatus::Idle.is_terminal());
        assert!(!LrStatus::Running.is_terminal());
        assert!(LrStatus::Converged.is_terminal());
        assert!(LrStatus::Exhausted.is_terminal());
        assert_eq!(LrStatus::Converged.to_string(), "converged");
    }
}
