//! Per-tick force observability.

use crowd_core::Vec2;

/// The force components computed for one agent on one tick.
///
/// Each component is exposed individually so observers and debugging tools
/// can see what pushed the agent where; `total` is what the integrator uses.
/// A disabled force appears here as the zero vector.
#[derive(Copy, Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ForceReport {
    pub desired: Vec2,
    pub social: Vec2,
    pub obstacle: Vec2,
    pub keep_distance: Vec2,
    /// Sum of all pluggable extra forces (invalid outputs already discarded).
    pub extra: Vec2,
    pub total: Vec2,
}
