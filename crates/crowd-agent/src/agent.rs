//! The `Agent` — identity, pose, interaction fields, and owned components.

use crowd_core::{
    AgentId, AgentKind, GroupId, SimConfig, Vec2, WaypointId, WaypointMode,
};
use crowd_force::model::KEEP_DISTANCE;
use crowd_force::{ForceModel, ForceReport};
use crowd_scene::AgentSnapshot;

use crate::destinations::WaypointPlanner;
use crate::machine::StateMachine;
use crate::social::Cooldowns;
use crate::trajectory::MoveList;

/// A simulated pedestrian-like entity.
///
/// Owns exactly one [`StateMachine`] and one [`ForceModel`]; everything
/// cross-agent (partner ids, focal points) is stored as plain ids/values and
/// re-resolved against the scene at point of use, so a removed agent can
/// never leave a dangling reference behind.
pub struct Agent {
    pub id: AgentId,
    pub name: String,
    pub kind: AgentKind,

    // ── Pose ──────────────────────────────────────────────────────────────
    pub position: Vec2,
    pub velocity: Vec2,
    pub acceleration: Vec2,
    /// Facing direction in radians, `[0, 2π)`.
    pub heading: f64,

    // ── Speed ─────────────────────────────────────────────────────────────
    /// Current speed cap (changes while `Running`, for elders, etc.).
    pub vmax: f64,
    /// The cap to restore when a temporary boost ends.
    pub(crate) base_vmax: f64,

    // ── Destinations ──────────────────────────────────────────────────────
    pub destinations: Vec<WaypointId>,
    pub destination_index: usize,
    pub previous_destination_index: usize,
    pub next_destination_index: usize,
    pub waypoint_mode: WaypointMode,
    pub current_destination: Option<WaypointId>,
    /// The interactive waypoint (shelf/dock) this agent last worked.
    pub last_interacted_waypoint: Option<WaypointId>,
    /// Waypoint-planning strategy for the active state, if attached.
    pub planner: Option<Box<dyn WaypointPlanner>>,

    // ── Components ────────────────────────────────────────────────────────
    pub forces: ForceModel,
    pub machine: StateMachine,
    /// Force components computed this tick (for the integrator and observers).
    pub last_report: ForceReport,

    // ── Grouping ──────────────────────────────────────────────────────────
    pub group: Option<GroupId>,

    // ── Transient interaction fields ──────────────────────────────────────
    pub talking_to: Option<AgentId>,
    pub listening_to: Option<AgentId>,
    /// Shared focal point listeners orient and space themselves around.
    pub keep_distance_to: Option<Vec2>,
    /// Current orbit radius around the focal point, metres.
    pub keep_distance: f64,
    /// Agent currently being serviced (service robots only).
    pub servicing_agent: Option<AgentId>,
    /// Dynamically registered destination of the current service run.
    pub servicing_waypoint: Option<WaypointId>,
    /// The robot currently serving this agent (requesters only).
    pub current_service_robot: Option<AgentId>,
    pub(crate) cooldowns: Cooldowns,

    // ── Micro-trajectory ──────────────────────────────────────────────────
    /// Active canned maneuver; consumed to exhaustion before its owning
    /// state normally exits.
    pub move_list: Option<MoveList>,
    /// Absolute heading the reached-shelf maneuver rotates to.
    pub angle_target: f64,
}

impl Agent {
    pub fn new(id: AgentId, kind: AgentKind, position: Vec2, cfg: &SimConfig) -> Self {
        let mut forces = ForceModel::new(cfg);
        // KeepDistance only participates while listening/group-talking.
        forces.disable(KEEP_DISTANCE);

        let vmax = match kind {
            AgentKind::Elder => cfg.elder_vmax,
            _ => cfg.vmax_default,
        };

        Self {
            id,
            name: format!("agent-{}", id.0),
            kind,
            position,
            velocity: Vec2::ZERO,
            acceleration: Vec2::ZERO,
            heading: 0.0,
            vmax,
            base_vmax: vmax,
            destinations: Vec::new(),
            destination_index: 0,
            previous_destination_index: 0,
            next_destination_index: 0,
            waypoint_mode: WaypointMode::Sequential,
            current_destination: None,
            last_interacted_waypoint: None,
            planner: None,
            forces,
            machine: StateMachine::new(),
            last_report: ForceReport::default(),
            group: None,
            talking_to: None,
            listening_to: None,
            keep_distance_to: None,
            keep_distance: cfg.keep_distance_default,
            servicing_agent: None,
            servicing_waypoint: None,
            current_service_robot: None,
            cooldowns: Cooldowns::default(),
            move_list: None,
            angle_target: 0.0,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    // ── Movement gating ───────────────────────────────────────────────────

    /// Enable normal locomotion forces (everything except KeepDistance).
    pub fn resume_movement(&mut self) {
        self.forces.enable_all();
        self.forces.disable(KEEP_DISTANCE);
    }

    /// Disable all forces and zero velocity/acceleration.
    pub fn stop_movement(&mut self) {
        self.forces.disable_all();
        self.velocity = Vec2::ZERO;
        self.acceleration = Vec2::ZERO;
    }

    // ── Publishing ────────────────────────────────────────────────────────

    /// The tick-stable view other agents will read next tick.
    pub fn snapshot(&self) -> AgentSnapshot {
        AgentSnapshot {
            id: self.id,
            kind: self.kind,
            position: self.position,
            velocity: self.velocity,
            state: self.machine.state(),
            talking_to: self.talking_to,
            listening_to: self.listening_to,
            keep_distance_to: self.keep_distance_to,
            group: self.group,
        }
    }
}
