//! Destination cycling and the waypoint-planning strategy seam.

use crowd_core::{AgentRng, Vec2, WaypointId, WaypointMode};
use crowd_scene::Scene;

use crate::Agent;

// ── WaypointPlanner ───────────────────────────────────────────────────────────

/// Per-state waypoint-planning strategy.
///
/// The state machine swaps strategies as states change (queueing, shopping,
/// group formation, …); the agent only ever asks the three questions below.
/// Operations that need a planner degrade to a safe default when none is
/// attached rather than failing the tick.
pub trait WaypointPlanner: Send {
    /// Has the agent finished with the destination this planner is steering
    /// toward?
    fn has_completed_destination(&self, scene: &Scene, position: Vec2) -> bool;

    /// The concrete waypoint currently being steered toward, if any.
    fn current_waypoint(&self) -> Option<WaypointId>;

    /// Point the planner at a new destination.
    fn set_destination(&mut self, waypoint: WaypointId);
}

/// The simplest strategy: a destination is complete once the agent stands
/// inside its interaction radius.
#[derive(Default)]
pub struct AreaPlanner {
    destination: Option<WaypointId>,
}

impl AreaPlanner {
    pub fn new() -> Self {
        Self::default()
    }
}

impl WaypointPlanner for AreaPlanner {
    fn has_completed_destination(&self, scene: &Scene, position: Vec2) -> bool {
        match self.destination.and_then(|id| scene.waypoint(id)) {
            Some(w) => w.is_within_range(position),
            None => false,
        }
    }

    fn current_waypoint(&self) -> Option<WaypointId> {
        self.destination
    }

    fn set_destination(&mut self, waypoint: WaypointId) {
        self.destination = Some(waypoint);
    }
}

// ── Cycling ───────────────────────────────────────────────────────────────────

impl Agent {
    /// Advance to the next destination and pre-draw the one after it.
    ///
    /// Sequential mode cycles through the list by modular increment; random
    /// mode resamples uniformly, rejecting the just-used index whenever more
    /// than one destination exists.  Returns the new current destination.
    pub fn update_destination(&mut self, rng: &mut AgentRng) -> Option<WaypointId> {
        if self.destinations.is_empty() {
            return self.current_destination;
        }

        self.previous_destination_index = self.destination_index;
        self.destination_index = self.next_destination_index % self.destinations.len();
        let current = self.destinations[self.destination_index];
        self.current_destination = Some(current);

        match self.waypoint_mode {
            WaypointMode::Random => {
                while self.next_destination_index == self.destination_index
                    && self.destinations.len() > 1
                {
                    self.next_destination_index = rng.gen_range(0..self.destinations.len());
                }
            }
            WaypointMode::Sequential => {
                self.next_destination_index =
                    (self.next_destination_index + 1) % self.destinations.len();
            }
        }

        if let Some(planner) = self.planner.as_mut() {
            planner.set_destination(current);
        }
        self.current_destination
    }

    /// Does the agent need a destination change this tick?
    ///
    /// Delegates to the attached planner; without one, any non-empty
    /// destination list counts as "need one".
    pub fn need_new_destination(&self, scene: &Scene) -> bool {
        match self.planner.as_ref() {
            Some(planner) => planner.has_completed_destination(scene, self.position),
            None => !self.destinations.is_empty(),
        }
    }

    /// Has the attached planner finished with the current destination?
    /// `false` when no planner is attached.
    pub fn has_completed_destination(&self, scene: &Scene) -> bool {
        match self.planner.as_ref() {
            Some(planner) => planner.has_completed_destination(scene, self.position),
            None => false,
        }
    }

    /// The waypoint currently steered toward (planner view).
    pub fn current_waypoint(&self) -> Option<WaypointId> {
        self.planner.as_ref().and_then(|p| p.current_waypoint())
    }

    /// Append a destination to the cycling list.
    pub fn add_destination(&mut self, waypoint: WaypointId) {
        self.destinations.push(waypoint);
    }

    /// Remove a destination by identity; reports whether anything was removed.
    pub fn remove_destination(&mut self, waypoint: WaypointId) -> bool {
        let before = self.destinations.len();
        self.destinations.retain(|&w| w != waypoint);
        let removed = self.destinations.len() < before;
        if removed && !self.destinations.is_empty() {
            // keep the cursor valid after the list shrank
            self.destination_index %= self.destinations.len();
            self.next_destination_index %= self.destinations.len();
            self.previous_destination_index %= self.destinations.len();
        }
        removed
    }

    /// Position of the destination the force model should steer toward:
    /// the planner's target if one is attached, else the cycling list's
    /// current entry.
    pub fn destination_position(&self, scene: &Scene) -> Option<Vec2> {
        let id = self.current_waypoint().or(self.current_destination)?;
        scene.waypoint(id).map(|w| w.position)
    }
}
