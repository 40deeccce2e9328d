//! The environment registry all agents query each tick.
//!
//! # Spatial index
//!
//! Waypoints are indexed in an R-tree (via `rstar`) keyed on their position.
//! Interaction-range queries (`interactive_waypoint_in_range`) search the
//! tree within the largest registered interaction radius and then apply each
//! candidate's own radius, so per-waypoint radii stay exact.  Dynamically
//! registered waypoints (service requests) are inserted into the tree
//! immediately.
//!
//! Agent proximity queries scan the published snapshot list linearly — the
//! snapshot buffer is rebuilt every tick anyway, and agent counts in this
//! simulator are small enough that a per-tick tree rebuild would cost more
//! than it saves.

use rstar::{PointDistance, RTree, RTreeObject, AABB};
use rustc_hash::FxHashMap;

use crowd_core::{AgentId, GroupId, SimClock, SimTime, Vec2, WaypointId};

use crate::{AgentGroup, AgentSnapshot, Obstacle, Waypoint, WaypointType};

// ── R-tree waypoint entry ─────────────────────────────────────────────────────

/// Entry stored in the R-tree spatial index: a 2-D point with the associated
/// `WaypointId`.
#[derive(Clone)]
struct WaypointEntry {
    point: [f64; 2],
    id: WaypointId,
}

impl RTreeObject for WaypointEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for WaypointEntry {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.point[0] - point[0];
        let dy = self.point[1] - point[1];
        dx * dx + dy * dy
    }
}

// ── Scene ─────────────────────────────────────────────────────────────────────

/// The shared environment: waypoints, obstacles, groups, the simulation
/// clock, and the tick-stable agent snapshots.
pub struct Scene {
    clock: SimClock,

    waypoints: Vec<Waypoint>,
    waypoint_index: RTree<WaypointEntry>,
    waypoints_by_name: FxHashMap<String, WaypointId>,
    /// Largest interaction radius seen so far; bounds range queries.
    max_interaction_radius: f64,

    obstacles: Vec<Obstacle>,
    groups: Vec<AgentGroup>,

    /// Published views of all agents, ordered by id.  Read-only during a
    /// tick; replaced wholesale by [`Scene::publish`].
    snapshots: Vec<AgentSnapshot>,
}

impl Scene {
    pub fn new(clock: SimClock) -> Self {
        Self {
            clock,
            waypoints: Vec::new(),
            waypoint_index: RTree::new(),
            waypoints_by_name: FxHashMap::default(),
            max_interaction_radius: 0.0,
            obstacles: Vec::new(),
            groups: Vec::new(),
            snapshots: Vec::new(),
        }
    }

    // ── Clock ─────────────────────────────────────────────────────────────

    /// Current simulated timestamp.
    #[inline]
    pub fn now(&self) -> SimTime {
        self.clock.now()
    }

    #[inline]
    pub fn clock(&self) -> &SimClock {
        &self.clock
    }

    /// Advance the clock by one tick.  Called by the runner only.
    pub fn advance_clock(&mut self) {
        self.clock.advance();
    }

    // ── Waypoints ─────────────────────────────────────────────────────────

    /// Register a waypoint and return its assigned id.
    ///
    /// The id in `w` is overwritten; callers construct waypoints with
    /// `WaypointId::INVALID` and let the scene number them.
    pub fn add_waypoint(&mut self, mut w: Waypoint) -> WaypointId {
        let id = WaypointId(self.waypoints.len() as u32);
        w.id = id;
        self.max_interaction_radius = self.max_interaction_radius.max(w.interaction_radius);
        self.waypoint_index.insert(WaypointEntry {
            point: [w.position.x, w.position.y],
            id,
        });
        self.waypoints_by_name.insert(w.name.clone(), id);
        self.waypoints.push(w);
        id
    }

    #[inline]
    pub fn waypoint(&self, id: WaypointId) -> Option<&Waypoint> {
        self.waypoints.get(id.index())
    }

    pub fn waypoint_by_name(&self, name: &str) -> Option<&Waypoint> {
        self.waypoints_by_name
            .get(name)
            .and_then(|&id| self.waypoint(id))
    }

    /// All waypoints carrying the given type tag.
    pub fn waypoints_by_type(
        &self,
        waypoint_type: WaypointType,
    ) -> impl Iterator<Item = &Waypoint> {
        self.waypoints
            .iter()
            .filter(move |w| w.waypoint_type == waypoint_type)
    }

    /// The closest waypoint of `waypoint_type` whose own interaction radius
    /// covers `pos`, if any.
    pub fn interactive_waypoint_in_range(
        &self,
        pos: Vec2,
        waypoint_type: WaypointType,
    ) -> Option<&Waypoint> {
        let r = self.max_interaction_radius;
        if r <= 0.0 {
            return None;
        }
        self.waypoint_index
            .locate_within_distance([pos.x, pos.y], r * r)
            .filter_map(|entry| self.waypoint(entry.id))
            .filter(|w| w.waypoint_type == waypoint_type && w.is_within_range(pos))
            .min_by(|a, b| {
                let da = (a.position - pos).length_squared();
                let db = (b.position - pos).length_squared();
                da.total_cmp(&db)
            })
    }

    // ── Obstacles ─────────────────────────────────────────────────────────

    pub fn add_obstacle(&mut self, obstacle: Obstacle) {
        self.obstacles.push(obstacle);
    }

    #[inline]
    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    // ── Groups ────────────────────────────────────────────────────────────

    /// Register a group and return its assigned id.
    pub fn add_group(&mut self, members: Vec<AgentId>) -> GroupId {
        let id = GroupId(self.groups.len() as u32);
        self.groups.push(AgentGroup::new(id, members));
        id
    }

    #[inline]
    pub fn group(&self, id: GroupId) -> Option<&AgentGroup> {
        self.groups.get(id.index())
    }

    /// Set or clear a group's shared attraction.  No-op for unknown groups.
    pub fn set_group_attraction(&mut self, id: GroupId, attraction: Option<WaypointId>) {
        if let Some(group) = self.groups.get_mut(id.index()) {
            group.attraction = attraction;
        }
    }

    // ── Agents (tick-stable snapshots) ────────────────────────────────────

    /// All published agent views, ordered by id.
    #[inline]
    pub fn agents(&self) -> &[AgentSnapshot] {
        &self.snapshots
    }

    #[inline]
    pub fn agent_by_id(&self, id: AgentId) -> Option<&AgentSnapshot> {
        self.snapshots.get(id.index())
    }

    /// All *other* agents within `radius` of `pos`.
    pub fn neighbors_in_range(
        &self,
        of: AgentId,
        pos: Vec2,
        radius: f64,
    ) -> impl Iterator<Item = &AgentSnapshot> {
        let r_sq = radius * radius;
        self.snapshots
            .iter()
            .filter(move |s| s.id != of && (s.position - pos).length_squared() < r_sq)
    }

    /// Swap in the snapshot buffer for the next tick.
    pub fn publish(&mut self, snapshots: Vec<AgentSnapshot>) {
        self.snapshots = snapshots;
    }
}
