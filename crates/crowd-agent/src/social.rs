//! Probabilistic social-interaction triggers and proximity queries.
//!
//! Every trigger shares one shape: a per-behavior cooldown (no re-evaluation
//! within `trigger_cooldown` seconds), one uniform[0,1) draw against a
//! configured probability, and a behavior-specific precondition.  All
//! neighbor reads go through the scene's tick-stable snapshots.

use std::f64::consts::TAU;

use crowd_core::{AgentKind, AgentRng, AgentState, SimConfig, SimTime};
use crowd_scene::{AgentSnapshot, Scene, Waypoint, WaypointType};

use crate::Agent;

/// Last evaluation timestamp per probabilistic behavior.
#[derive(Clone, Debug, Default)]
pub(crate) struct Cooldowns {
    tell_story: SimTime,
    group_talking: SimTime,
    talking: SimTime,
    talking_and_walking: SimTime,
    requesting_service: SimTime,
    switch_running_walking: SimTime,
    pub(crate) group_attraction: SimTime,
}

/// One cooldown gate: `true` (and the timestamp reset) when the behavior may
/// be evaluated again.
pub(crate) fn cooldown_elapsed(last: &mut SimTime, now: SimTime, cooldown: f64) -> bool {
    if now.since(*last) > cooldown {
        *last = now;
        true
    } else {
        false
    }
}

impl Agent {
    // ── Proximity queries ─────────────────────────────────────────────────

    /// All other agents within `radius`.
    pub fn agents_in_range<'a>(&self, scene: &'a Scene, radius: f64) -> Vec<&'a AgentSnapshot> {
        scene
            .neighbors_in_range(self.id, self.position, radius)
            .collect()
    }

    /// Nearby agents in a state that leaves them free to be recruited as
    /// listeners (Walking or Running).
    pub fn potential_listeners<'a>(
        &self,
        scene: &'a Scene,
        radius: f64,
    ) -> Vec<&'a AgentSnapshot> {
        scene
            .neighbors_in_range(self.id, self.position, radius)
            .filter(|a| a.state.is_free_to_listen())
            .collect()
    }

    // ── Probabilistic triggers ────────────────────────────────────────────

    /// Start telling a story?  Needs more than two agents in earshot and no
    /// story already in progress among them.
    pub fn tell_story(&mut self, scene: &Scene, cfg: &SimConfig, rng: &mut AgentRng) -> bool {
        if !cooldown_elapsed(&mut self.cooldowns.tell_story, scene.now(), cfg.trigger_cooldown) {
            return false;
        }
        let chatters = self.agents_in_range(scene, cfg.max_talking_distance);
        if chatters.len() <= 2 {
            return false;
        }
        if chatters.iter().any(|a| a.state == AgentState::TellStory) {
            return false;
        }
        rng.uniform() < cfg.tell_story_probability
    }

    /// Start hosting a group talk?  Needs more than two free-to-listen
    /// agents nearby and no group talk already in progress among them.  On
    /// success the agent's own position becomes the shared focal point.
    pub fn start_group_talking(
        &mut self,
        scene: &Scene,
        cfg: &SimConfig,
        rng: &mut AgentRng,
    ) -> bool {
        if !cooldown_elapsed(&mut self.cooldowns.group_talking, scene.now(), cfg.trigger_cooldown)
        {
            return false;
        }
        let listeners = self.potential_listeners(scene, cfg.max_talking_distance);
        if listeners.len() <= 2 {
            return false;
        }
        if listeners.iter().any(|a| a.state == AgentState::GroupTalking) {
            return false;
        }
        if rng.uniform() < cfg.group_talking_probability {
            self.keep_distance_to = Some(self.position);
            true
        } else {
            false
        }
    }

    /// Start a one-to-one conversation?  Picks a random free-to-listen
    /// neighbor as the partner.
    pub fn start_talking(&mut self, scene: &Scene, cfg: &SimConfig, rng: &mut AgentRng) -> bool {
        if !cooldown_elapsed(&mut self.cooldowns.talking, scene.now(), cfg.trigger_cooldown) {
            return false;
        }
        let listeners = self.potential_listeners(scene, cfg.max_talking_distance);
        if listeners.is_empty() {
            return false;
        }
        if rng.uniform() < cfg.talking_probability {
            let partner = listeners[rng.gen_range(0..listeners.len())];
            self.talking_to = Some(partner.id);
            true
        } else {
            false
        }
    }

    /// Start talking while continuing to walk?  Same precondition as
    /// [`start_talking`][Self::start_talking]; only the partner id is set
    /// (resolution is by id lookup at point of use either way).
    pub fn start_talking_and_walking(
        &mut self,
        scene: &Scene,
        cfg: &SimConfig,
        rng: &mut AgentRng,
    ) -> bool {
        if !cooldown_elapsed(
            &mut self.cooldowns.talking_and_walking,
            scene.now(),
            cfg.trigger_cooldown,
        ) {
            return false;
        }
        let listeners = self.potential_listeners(scene, cfg.max_talking_distance);
        if listeners.is_empty() {
            return false;
        }
        if rng.uniform() < cfg.talking_and_walking_probability {
            let partner = listeners[rng.gen_range(0..listeners.len())];
            self.talking_to = Some(partner.id);
            true
        } else {
            false
        }
    }

    /// Stop and wait for a service robot?  Unconditional probability roll.
    pub fn start_requesting_service(
        &mut self,
        now: SimTime,
        cfg: &SimConfig,
        rng: &mut AgentRng,
    ) -> bool {
        if !cooldown_elapsed(&mut self.cooldowns.requesting_service, now, cfg.trigger_cooldown) {
            return false;
        }
        rng.uniform() < cfg.requesting_service_probability
    }

    /// Switch gait between walking and running?  Unconditional roll.
    pub fn switch_running_walking(
        &mut self,
        now: SimTime,
        cfg: &SimConfig,
        rng: &mut AgentRng,
    ) -> bool {
        if !cooldown_elapsed(
            &mut self.cooldowns.switch_running_walking,
            now,
            cfg.trigger_cooldown,
        ) {
            return false;
        }
        rng.uniform() < cfg.switch_running_walking_probability
    }

    // ── Listener resolution ───────────────────────────────────────────────

    /// Is a neighbor addressing this agent?  On a match the listening
    /// target (and, where applicable, the focal point) is adopted.
    ///
    /// Priority order: a story teller or someone Talking specifically to
    /// this agent (focal point = their position), then a group-talk host
    /// (focal point copied from them), then someone TalkingAndWalking to
    /// this agent (no positional constraint).  First match wins.
    pub fn someone_talking_to_me(&mut self, scene: &Scene, cfg: &SimConfig) -> bool {
        let neighbors: Vec<&AgentSnapshot> = self.agents_in_range(scene, cfg.max_talking_distance);
        for neighbor in neighbors {
            match neighbor.state {
                AgentState::TellStory => {
                    self.listening_to = Some(neighbor.id);
                    self.keep_distance_to = Some(neighbor.position);
                    self.keep_distance = cfg.keep_distance_default;
                    return true;
                }
                AgentState::Talking if neighbor.talking_to == Some(self.id) => {
                    self.listening_to = Some(neighbor.id);
                    self.keep_distance_to = Some(neighbor.position);
                    self.keep_distance = cfg.keep_distance_default;
                    return true;
                }
                AgentState::GroupTalking => {
                    self.listening_to = Some(neighbor.id);
                    // orbit the group's shared center, not the host
                    self.keep_distance_to = neighbor.keep_distance_to;
                    self.keep_distance = cfg.keep_distance_default;
                    return true;
                }
                AgentState::TalkingAndWalking if neighbor.talking_to == Some(self.id) => {
                    self.listening_to = Some(neighbor.id);
                    return true;
                }
                _ => {}
            }
        }
        false
    }

    /// Is the current listening target an individual (not a story/group)
    /// still talking?
    pub fn is_listening_to_individual(&self, scene: &Scene) -> bool {
        self.listening_to
            .and_then(|id| scene.agent_by_id(id))
            .is_some_and(|a| a.state == AgentState::Talking)
    }

    // ── Service flow ──────────────────────────────────────────────────────

    /// Has a service robot come within range?  Remembers it as the current
    /// server on success.
    pub fn service_robot_is_near(&mut self, scene: &Scene, cfg: &SimConfig) -> bool {
        for agent in self.agents_in_range(scene, cfg.service_robot_range) {
            if agent.kind == AgentKind::ServiceRobot {
                self.current_service_robot = Some(agent.id);
                return true;
            }
        }
        false
    }

    /// Is any agent in servicing range requesting service?  On a match the
    /// requester's position is registered with the scene as a fresh
    /// `service_destination` waypoint and the planner is pointed at it.
    pub fn someone_is_requesting_service(&mut self, scene: &mut Scene, cfg: &SimConfig) -> bool {
        let request = self
            .agents_in_range(scene, cfg.max_servicing_radius)
            .iter()
            .find(|a| a.state == AgentState::RequestingService)
            .map(|a| (a.id, a.position));
        let Some((requester, position)) = request else {
            return false;
        };

        let waypoint = scene.add_waypoint(Waypoint::area(
            "service_destination",
            position,
            cfg.service_robot_range,
        ));
        self.servicing_agent = Some(requester);
        self.servicing_waypoint = Some(waypoint);
        self.current_destination = Some(waypoint);
        if let Some(planner) = self.planner.as_mut() {
            planner.set_destination(waypoint);
        }
        true
    }

    // ── Group spacing ─────────────────────────────────────────────────────

    /// Re-derive the keep-distance radius from the audience size.
    ///
    /// Counts agents sharing this agent's listening target (or listening to
    /// *this* agent when it hosts the group talk) and spaces them evenly on
    /// a circle: radius = count × spacing / 2π, floored at the configured
    /// minimum.
    pub fn adjust_keep_distance(&mut self, scene: &Scene, cfg: &SimConfig) {
        let check_for = if self.machine.state() == AgentState::GroupTalking {
            Some(self.id)
        } else {
            self.listening_to
        };
        let count = scene
            .agents()
            .iter()
            .filter(|a| a.listening_to.is_some() && a.listening_to == check_for)
            .count();

        self.keep_distance =
            (count as f64 * cfg.listener_spacing / TAU).max(cfg.min_keep_distance);
    }

    /// The type tag used when scanning for an interactive obstacle near the
    /// agent (shelves for vehicles, docks for loading).
    pub fn interactive_waypoint_nearby<'a>(
        &self,
        scene: &'a Scene,
        waypoint_type: WaypointType,
    ) -> Option<&'a Waypoint> {
        scene.interactive_waypoint_in_range(self.position, waypoint_type)
    }
}
