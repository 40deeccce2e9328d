//! Named target regions used as destinations and interaction anchors.

use crowd_core::{Vec2, WaypointId};

/// Type tag used for proximity-based interaction lookup
/// ("is there a shelf within my interaction radius?").
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WaypointType {
    /// A plain circular destination area.
    #[default]
    Area,
    /// A storage shelf a forklift can interact with.
    Shelf,
    /// A loading dock.
    Dock,
    /// An area that can divert passing groups (window shopping etc.).
    Attraction,
}

/// A registered target region: point, interaction radius, and type tag.
///
/// Waypoints are created and owned by the [`Scene`][crate::Scene]; agents
/// hold `WaypointId`s, never references.  Service-request waypoints are
/// created dynamically by agents and registered at request time.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Waypoint {
    pub id: WaypointId,
    pub name: String,
    pub position: Vec2,
    /// Radius within which the waypoint counts as reached / interactable.
    pub interaction_radius: f64,
    pub waypoint_type: WaypointType,
    /// Fixed heading agents adopt while working this waypoint (shelves and
    /// docks; plain areas have none).
    pub static_obstacle_angle: Option<f64>,
}

impl Waypoint {
    /// A plain circular destination area.  The id is assigned by the scene
    /// on registration.
    pub fn area(name: impl Into<String>, position: Vec2, interaction_radius: f64) -> Self {
        Self {
            id: WaypointId::INVALID,
            name: name.into(),
            position,
            interaction_radius,
            waypoint_type: WaypointType::Area,
            static_obstacle_angle: None,
        }
    }

    pub fn with_type(mut self, waypoint_type: WaypointType) -> Self {
        self.waypoint_type = waypoint_type;
        self
    }

    pub fn with_obstacle_angle(mut self, angle: f64) -> Self {
        self.static_obstacle_angle = Some(angle);
        self
    }

    /// Is `pos` within the interaction radius?
    #[inline]
    pub fn is_within_range(&self, pos: Vec2) -> bool {
        (self.position - pos).length_squared() <= self.interaction_radius * self.interaction_radius
    }
}
