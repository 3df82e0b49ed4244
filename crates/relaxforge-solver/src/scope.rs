//! Session-level scope.

use std::time::{Duration, Instant};

use relaxforge_config::LrConfig;

use crate::snapshot::LrStatus;
use crate::step::StepSchedule;

/// Iteration state of one relaxation session.
///
/// Reset at the start of every session; kept after the session ends so the
/// final iteration, step size and denominator stay observable.
#[derive(Debug, Clone)]
pub struct SessionScope {
    status: LrStatus,
    iteration: u64,
    schedule: StepSchedule,
    epsilon: f64,
    start_time: Option<Instant>,
}

impl SessionScope {
    pub fn new() -> Self {
        Self {
            status: LrStatus::Idle,
            iteration: 0,
            schedule: StepSchedule::default(),
            epsilon: LrConfig::default().epsilon,
            start_time: None,
        }
    }

    pub fn start_session(&mut self, config: &LrConfig) {
        self.status = LrStatus::Running;
        self.iteration = 0;
        self.schedule = StepSchedule::new(config.update_period, config.start_denominator);
        self.epsilon = config.epsilon;
        self.start_time = Some(Instant::now());
    }

    pub fn end_session(&mut self, status: LrStatus) {
        self.status = status;
    }

    pub fn elapsed(&self) -> Option<Duration> {
        self.start_time.map(|t| t.elapsed())
    }

    pub fn status(&self) -> LrStatus {
        self.status
    }

    pub fn increment_iteration(&mut self) -> u64 {
        self.iteration += 1;
        self.iteration
    }

    pub fn iteration(&self) -> u64 {
        self.iteration
    }

    pub fn schedule(&self) -> &StepSchedule {
        &self.schedule
    }

    pub fn schedule_mut(&mut self) -> &mut StepSchedule {
        &mut self.schedule
    }

    /// Tolerance of the last started session, or the default.
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }
}

impl Default for SessionScope {
    fn default() -> Self {
        Self::new()
    }
}
