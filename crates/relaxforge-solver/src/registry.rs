//! Registry of dualized constraints.

use relaxforge_config::MultiplierProjection;
use relaxforge_core::{
    ConstrId, ConstraintTemplate, Direction, RelaxForgeError, Result, Sense, VarId,
};
use tracing::trace;

/// Stable handle to a dualized constraint.
///
/// Handles are issued in registration order and stay valid for the lifetime
/// of the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DualHandle(usize);

impl DualHandle {
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

/// A constraint moved from the hard constraint set into the objective.
#[derive(Debug, Clone, PartialEq)]
pub struct DualizedConstraint {
    template: ConstraintTemplate,
    sense: Sense,
    penalty: VarId,
    link: ConstrId,
    multiplier: f64,
}

impl DualizedConstraint {
    pub fn new(
        template: ConstraintTemplate,
        sense: Sense,
        penalty: VarId,
        link: ConstrId,
        multiplier: f64,
    ) -> Self {
        Self {
            template,
            sense,
            penalty,
            link,
            multiplier,
        }
    }

    /// The relation as the caller wrote it.
    pub fn template(&self) -> &ConstraintTemplate {
        &self.template
    }

    pub fn sense(&self) -> Sense {
        self.sense
    }

    /// Variable measuring `rhs - lhs`.
    pub fn penalty(&self) -> VarId {
        self.penalty
    }

    /// Model constraint `penalty == rhs - lhs`.
    pub fn link(&self) -> ConstrId {
        self.link
    }

    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }

    pub fn set_multiplier(&mut self, multiplier: f64) {
        self.multiplier = multiplier;
    }
}

/// All constraints dualized in one model, in registration order.
///
/// # Example
///
/// ```
/// use relaxforge_core::{ConstrId, ConstraintTemplate, Sense, VarId};
/// use relaxforge_solver::{DualRegistry, DualizedConstraint};
///
/// let x = VarId::new(0);
/// let mut registry = DualRegistry::new();
/// let handle = registry
///     .register(DualizedConstraint::new(
///         ConstraintTemplate::le(x, 10.0),
///         Sense::LessEqual,
///         VarId::new(1),
///         ConstrId::new(0),
///         2.0,
///     ))
///     .unwrap();
///
/// assert_eq!(registry.len(), 1);
/// assert_eq!(registry.get(handle).unwrap().multiplier(), 2.0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct DualRegistry {
    records: Vec<DualizedConstraint>,
}

impl DualRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a record.
    ///
    /// # Errors
    ///
    /// Returns [`RelaxForgeError::InvalidState`] if another record already
    /// uses the same penalty variable.
    pub fn register(&mut self, record: DualizedConstraint) -> Result<DualHandle> {
        if self.records.iter().any(|r| r.penalty == record.penalty) {
            return Err(RelaxForgeError::InvalidState(format!(
                "penalty variable {} is already registered",
                record.penalty
            )));
        }
        self.records.push(record);
        Ok(DualHandle(self.records.len() - 1))
    }

    pub fn get(&self, handle: DualHandle) -> Option<&DualizedConstraint> {
        self.records.get(handle.0)
    }

    pub fn get_mut(&mut self, handle: DualHandle) -> Option<&mut DualizedConstraint> {
        self.records.get_mut(handle.0)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DualizedConstraint> {
        self.records.iter()
    }

    pub fn handles(&self) -> impl Iterator<Item = DualHandle> {
        (0..self.records.len()).map(DualHandle)
    }

    /// Current multipliers, in handle order.
    pub fn multipliers(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.multiplier).collect()
    }

    /// Sets every multiplier to `value`.
    pub fn reset_multipliers(&mut self, value: f64) {
        for record in &mut self.records {
            record.multiplier = value;
        }
    }

    /// Applies `multiplier -= step_size * penalty` to every record.
    ///
    /// `penalties` holds the penalty variable values in handle order. With
    /// [`MultiplierProjection::SignConstrained`], inequality multipliers are
    /// then clamped at zero on the side that keeps the penalty term a valid
    /// bound for `direction`.
    pub fn apply_subgradient(
        &mut self,
        penalties: &[f64],
        step_size: f64,
        projection: MultiplierProjection,
        direction: Direction,
    ) {
        for (index, (record, &penalty)) in self.records.iter_mut().zip(penalties).enumerate() {
            let mut updated = record.multiplier - step_size * penalty;
            if projection == MultiplierProjection::SignConstrained {
                updated = project(record.sense, direction, updated);
            }
            trace!(
                event = "multiplier_update",
                constraint = index,
                penalty = penalty,
                before = record.multiplier,
                after = updated,
            );
            record.multiplier = updated;
        }
    }
}

fn project(sense: Sense, direction: Direction, multiplier: f64) -> f64 {
    match (sense, direction) {
        (Sense::Equal, _) => multiplier,
        (Sense::LessEqual, Direction::Maximize) | (Sense::GreaterEqual, Direction::Minimize) => {
            multiplier.max(0.0)
        }
        (Sense::GreaterEqual, Direction::Maximize) | (Sense::LessEqual, Direction::Minimize) => {
            multiplier.min(0.0)
        }
    }
}
