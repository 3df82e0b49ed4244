//! Harmonic step-size schedule.

/// Step size shared by all multipliers.
///
/// Every `update_period` iterations (starting with the first) the step size
/// becomes `1 / denominator` and the denominator grows by one. Between
/// recomputations the step size is constant.
///
/// # Example
///
/// ```
/// use relaxforge_solver::StepSchedule;
///
/// let mut schedule = StepSchedule::new(2, 1.0);
/// assert!(schedule.advance(0));
/// assert_eq!(schedule.step_size(), 1.0);
/// assert!(!schedule.advance(1));
/// assert_eq!(schedule.step_size(), 1.0);
/// assert!(schedule.advance(2));
/// assert_eq!(schedule.step_size(), 0.5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepSchedule {
    update_period: u64,
    denominator: f64,
    step_size: f64,
}

impl StepSchedule {
    /// Creates a schedule. `update_period` must be positive.
    pub fn new(update_period: u64, start_denominator: f64) -> Self {
        Self {
            update_period: update_period.max(1),
            denominator: start_denominator,
            step_size: 0.0,
        }
    }

    /// Advances to the 0-based iteration `index`.
    ///
    /// Returns true if the step size was recomputed.
    pub fn advance(&mut self, index: u64) -> bool {
        if index % self.update_period != 0 {
            return false;
        }
        self.step_size = 1.0 / self.denominator;
        self.denominator += 1.0;
        true
    }

    pub fn step_size(&self) -> f64 {
        self.step_size
    }

    /// Denominator of the next recomputation.
    pub fn denominator(&self) -> f64 {
        self.denominator
    }

    pub fn update_period(&self) -> u64 {
        self.update_period
    }
}

impl Default for StepSchedule {
    fn default() -> Self {
        Self::new(10, 1.0)
    }
}
