//! Lazy iteration over a relaxation session.

use std::iter::FusedIterator;

use relaxforge_config::LrConfig;
use relaxforge_core::{Model, RelaxForgeError, Result};
use tracing::{info, warn};

use super::LagrangianModel;
use crate::snapshot::{IterationSnapshot, LrStatus};

/// A running relaxation session, one solve per item.
///
/// Returned by [`LagrangianModel::iterate`]. Holds the model mutably for the
/// whole session. When the session ends, by convergence, exhaustion, error
/// or drop, the base objective is set back on the wrapped model. A failed
/// restore is logged as a warning; it never replaces the last snapshot or
/// the error that ended the session.
pub struct Iterations<'a, M: Model> {
    model: &'a mut LagrangianModel<M>,
    config: LrConfig,
    finished: bool,
}

impl<'a, M: Model> Iterations<'a, M> {
    pub(super) fn new(model: &'a mut LagrangianModel<M>, config: LrConfig) -> Self {
        Self {
            model,
            config,
            finished: false,
        }
    }

    /// The relaxed model, as of the last yielded snapshot.
    pub fn model(&self) -> &LagrangianModel<M> {
        &*self.model
    }

    pub fn config(&self) -> &LrConfig {
        &self.config
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    fn finish(&mut self, status: LrStatus, reason: EndReason) {
        self.finished = true;
        self.model.scope.end_session(status);
        if let Err(e) = self.model.restore_base_objective() {
            warn!(event = "restore_failed", error = %e);
        }

        let scope = &self.model.scope;
        info!(
            event = "session_end",
            status = %status,
            reason = reason.as_str(),
            iterations = scope.iteration(),
            step_size = scope.schedule().step_size(),
            duration_ms = scope.elapsed().map_or(0, |d| d.as_millis() as u64),
            objective = self.model.inner().objective_value().unwrap_or(f64::NAN),
        );
    }
}

/// Why a session ended, as reported on the `session_end` event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EndReason {
    Converged,
    IterationLimit,
    Infeasible,
    Unbounded,
    Error,
    Dropped,
}

impl EndReason {
    fn from_error(error: &RelaxForgeError) -> Self {
        match error {
            RelaxForgeError::RelaxationInfeasible { .. } => EndReason::Infeasible,
            RelaxForgeError::RelaxationUnbounded { .. } => EndReason::Unbounded,
            _ => EndReason::Error,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            EndReason::Converged => "converged",
            EndReason::IterationLimit => "iteration_limit",
            EndReason::Infeasible => "relaxation_infeasible",
            EndReason::Unbounded => "relaxation_unbounded",
            EndReason::Error => "error",
            EndReason::Dropped => "dropped",
        }
    }
}

impl<M: Model> Iterator for Iterations<'_, M> {
    type Item = Result<IterationSnapshot>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        match self.model.step(&self.config) {
            Ok(snapshot) => {
                match self.model.status() {
                    LrStatus::Converged => self.finish(LrStatus::Converged, EndReason::Converged),
                    LrStatus::Exhausted => {
                        self.finish(LrStatus::Exhausted, EndReason::IterationLimit)
                    }
                    LrStatus::Idle | LrStatus::Running => {}
                }
                Some(Ok(snapshot))
            }
            Err(e) => {
                self.finish(LrStatus::Exhausted, EndReason::from_error(&e));
                Some(Err(e))
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.finished {
            return (0, Some(0));
        }
        let remaining = self
            .config
            .max_iterations
            .saturating_sub(self.model.iteration());
        (1, usize::try_from(remaining).ok())
    }
}

impl<M: Model> FusedIterator for Iterations<'_, M> {}

impl<M: Model> Drop for Iterations<'_, M> {
    fn drop(&mut self) {
        if !self.finished {
            self.finish(LrStatus::Exhausted, EndReason::Dropped);
        }
    }
}
