//! The pluggable-force extension point.

use crowd_core::Vec2;

/// A named, independently toggleable force contribution.
///
/// Implementations are registered on an agent's
/// [`ForceModel`][crate::ForceModel] and summed into the total via
/// `sum_of_extra_forces`.  A force whose name is in the disabled set is
/// skipped (and reported as zero) without being removed, so re-enabling is
/// idempotent and order-preserving.
///
/// Outputs are validated by the model: any non-finite component causes the
/// whole vector to be discarded as zero, with the force's name logged.
pub trait Force: Send + Sync {
    /// Stable name used for enable/disable lookups and logging.
    fn name(&self) -> &str;

    /// Compute this force's contribution given the agent's current desired
    /// direction (a unit vector toward the destination, or zero when the
    /// agent has none).
    fn compute_force(&self, desired_direction: Vec2) -> Vec2;
}
