//! The behavioral state machine and its per-state handler table.
//!
//! Every state owns three hooks: `on_enter` (runs once, after the state
//! field is updated), `on_tick` (the transition guard pass, returning the
//! next state when one fires), and `on_exit` (runs before the state field
//! changes away).  The hooks are plain fn pointers looked up through one
//! exhaustive `match`, so adding a state without wiring its handlers is a
//! compile error, not a silent no-op.
//!
//! Guard order inside a handler is priority order: the first satisfied
//! guard wins the tick, and at most one transition happens per tick.

use crowd_core::{AgentKind, AgentRng, AgentState, SimConfig, SimTime};
use crowd_scene::{Scene, WaypointType};

use crate::trajectory::{back_up_moves, reached_shelf_moves, MoveList};
use crate::Agent;

// ── StateMachine ──────────────────────────────────────────────────────────────

/// Per-agent state-machine bookkeeping.
///
/// Pure data; the transition logic lives on [`Agent`] so hooks can reach the
/// agent's pose, planner, and force model without self-referential borrows.
#[derive(Clone, Debug)]
pub struct StateMachine {
    state: AgentState,
    /// The locomotion state to fall back to when a social episode ends
    /// (`Walking`, `Running`, `GroupWalking`, or `Driving`).
    normal_state: AgentState,
    /// When the current state was entered.
    start_timestamp: SimTime,
    /// Randomized duration of the current timed state, seconds.
    state_max_duration: Option<f64>,
    /// Set when a shopping agent has rolled to abandon the attraction.
    shall_lose_attraction: bool,
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl StateMachine {
    pub fn new() -> Self {
        Self {
            state: AgentState::None,
            normal_state: AgentState::Walking,
            start_timestamp: SimTime::default(),
            state_max_duration: None,
            shall_lose_attraction: false,
        }
    }

    #[inline]
    pub fn state(&self) -> AgentState {
        self.state
    }

    #[inline]
    pub fn normal_state(&self) -> AgentState {
        self.normal_state
    }

    #[inline]
    pub fn set_normal_state(&mut self, state: AgentState) {
        self.normal_state = state;
    }

    /// When the current state was entered.
    #[inline]
    pub fn since(&self) -> SimTime {
        self.start_timestamp
    }

    /// Arm the state timer.  `on_enter` hooks of timed states call this.
    pub fn set_timer(&mut self, duration: f64) {
        self.state_max_duration = Some(duration);
    }

    /// Has the armed timer run out?  Always `false` for untimed states.
    pub fn timer_expired(&self, now: SimTime) -> bool {
        self.state_max_duration
            .is_some_and(|d| now.since(self.start_timestamp) > d)
    }

    #[inline]
    pub fn shall_lose_attraction(&self) -> bool {
        self.shall_lose_attraction
    }

    pub fn set_shall_lose_attraction(&mut self, v: bool) {
        self.shall_lose_attraction = v;
    }
}

// ── Handler table ─────────────────────────────────────────────────────────────

type EnterFn = fn(&mut Agent, &mut Scene, &SimConfig, &mut AgentRng);
type TickFn = fn(&mut Agent, &mut Scene, &SimConfig, &mut AgentRng) -> Option<AgentState>;
type ExitFn = fn(&mut Agent, &SimConfig);

/// The three hooks of one state.
pub(crate) struct StateHandlers {
    pub on_enter: EnterFn,
    pub on_tick: TickFn,
    pub on_exit: ExitFn,
}

fn enter_noop(_: &mut Agent, _: &mut Scene, _: &SimConfig, _: &mut AgentRng) {}
fn exit_noop(_: &mut Agent, _: &SimConfig) {}

/// Handler lookup.  Exhaustive over [`AgentState`].
pub(crate) fn handlers(state: AgentState) -> StateHandlers {
    use AgentState::*;
    match state {
        None => StateHandlers {
            on_enter: enter_noop,
            on_tick: tick_none,
            on_exit: exit_noop,
        },
        Waiting => StateHandlers {
            on_enter: enter_waiting,
            on_tick: tick_waiting,
            on_exit: exit_noop,
        },
        Queueing => StateHandlers {
            on_enter: enter_walking_like,
            on_tick: tick_queueing,
            on_exit: exit_noop,
        },
        Walking => StateHandlers {
            on_enter: enter_walking,
            on_tick: tick_walking,
            on_exit: exit_noop,
        },
        Running => StateHandlers {
            on_enter: enter_running,
            on_tick: tick_running,
            on_exit: exit_running,
        },
        GroupWalking => StateHandlers {
            on_enter: enter_group_walking,
            on_tick: tick_group_walking,
            on_exit: exit_noop,
        },
        Shopping => StateHandlers {
            on_enter: enter_shopping,
            on_tick: tick_shopping,
            on_exit: exit_shopping,
        },
        Working => StateHandlers {
            on_enter: enter_working,
            on_tick: tick_working,
            on_exit: exit_noop,
        },
        Driving => StateHandlers {
            on_enter: enter_driving,
            on_tick: tick_driving,
            on_exit: exit_noop,
        },
        DrivingToInteraction => StateHandlers {
            on_enter: enter_noop,
            on_tick: tick_driving_to_interaction,
            on_exit: exit_noop,
        },
        ReachedShelf => StateHandlers {
            on_enter: enter_reached_shelf,
            on_tick: tick_reached_shelf,
            on_exit: exit_clear_move_list,
        },
        LiftingForks => StateHandlers {
            on_enter: enter_lifting_forks,
            on_tick: tick_timed_to_loading,
            on_exit: exit_noop,
        },
        Loading => StateHandlers {
            on_enter: enter_loading,
            on_tick: tick_timed_to_lowering,
            on_exit: exit_noop,
        },
        LoweringForks => StateHandlers {
            on_enter: enter_lowering_forks,
            on_tick: tick_timed_to_back_up,
            on_exit: exit_noop,
        },
        BackUp => StateHandlers {
            on_enter: enter_back_up,
            on_tick: tick_back_up,
            on_exit: exit_clear_move_list,
        },
        TellStory => StateHandlers {
            on_enter: enter_tell_story,
            on_tick: tick_timed_to_normal,
            on_exit: exit_tell_story,
        },
        GroupTalking => StateHandlers {
            on_enter: enter_group_talking,
            on_tick: tick_group_talking_state,
            on_exit: exit_group_talking,
        },
        Talking => StateHandlers {
            on_enter: enter_talking,
            on_tick: tick_timed_to_normal,
            on_exit: exit_talking,
        },
        Listening => StateHandlers {
            on_enter: enter_listening,
            on_tick: tick_listening,
            on_exit: exit_listening,
        },
        TalkingAndWalking => StateHandlers {
            on_enter: enter_talking_and_walking,
            on_tick: tick_talking_and_walking,
            on_exit: exit_talking,
        },
        ListeningAndWalking => StateHandlers {
            on_enter: enter_noop,
            on_tick: tick_listening_and_walking,
            on_exit: exit_listening,
        },
        RequestingService => StateHandlers {
            on_enter: enter_requesting_service,
            on_tick: tick_requesting_service,
            on_exit: exit_noop,
        },
        ReceivingService => StateHandlers {
            on_enter: enter_receiving_service,
            on_tick: tick_timed_to_normal,
            on_exit: exit_receiving_service,
        },
        ProvidingService => StateHandlers {
            on_enter: enter_providing_service,
            on_tick: tick_providing_service,
            on_exit: exit_providing_service,
        },
    }
}

// ── Agent transition driver ───────────────────────────────────────────────────

impl Agent {
    /// Run the current state's guard pass; switch states if a guard fires.
    ///
    /// Returns `Some((old, new))` when a transition happened this tick.
    pub fn do_state_transition(
        &mut self,
        scene: &mut Scene,
        cfg: &SimConfig,
        rng: &mut AgentRng,
    ) -> Option<(AgentState, AgentState)> {
        let current = self.machine.state();
        let next = (handlers(current).on_tick)(self, scene, cfg, rng)?;
        if next == current {
            return Option::None;
        }
        Some(self.activate_state(next, scene, cfg, rng))
    }

    /// Force a transition to `next`, running exit and enter hooks.
    pub fn activate_state(
        &mut self,
        next: AgentState,
        scene: &mut Scene,
        cfg: &SimConfig,
        rng: &mut AgentRng,
    ) -> (AgentState, AgentState) {
        let old = self.machine.state();
        (handlers(old).on_exit)(self, cfg);

        self.machine.state = next;
        self.machine.start_timestamp = scene.now();
        self.machine.state_max_duration = Option::None;

        (handlers(next).on_enter)(self, scene, cfg, rng);
        tracing::debug!(agent = %self.id, from = old.name(), to = next.name(), "state change");
        (old, next)
    }

    /// Has the whole group claimed (or does it now claim) an attraction?
    ///
    /// When the group already holds one, this just reports `true` so every
    /// member diverts.  Otherwise, on cooldown, one probability roll may
    /// claim the closest attraction area covering the group's centroid.
    pub fn check_group_for_attractions(
        &mut self,
        scene: &mut Scene,
        cfg: &SimConfig,
        rng: &mut AgentRng,
    ) -> bool {
        let Some(group_id) = self.group else {
            return false;
        };
        let Some(group) = scene.group(group_id) else {
            return false;
        };
        if group.attraction.is_some() {
            return true;
        }
        if !crate::social::cooldown_elapsed(
            &mut self.cooldowns.group_attraction,
            scene.now(),
            cfg.trigger_cooldown,
        ) {
            return false;
        }
        if rng.uniform() >= cfg.group_attraction_probability {
            return false;
        }
        let Some(center) = group.center(scene.agents()) else {
            return false;
        };
        let attraction = scene
            .interactive_waypoint_in_range(center, WaypointType::Attraction)
            .map(|w| w.id);
        let Some(waypoint) = attraction else {
            return false;
        };
        scene.set_group_attraction(group_id, Some(waypoint));
        true
    }
}

/// Randomize a timed-state duration: uniform in `[0.5·base, 1.5·base)`.
pub(crate) fn random_duration(base: f64, rng: &mut AgentRng) -> f64 {
    rng.gen_range(0.5..1.5) * base
}

// ── Per-state hooks ───────────────────────────────────────────────────────────

fn tick_none(
    agent: &mut Agent,
    _scene: &mut Scene,
    _cfg: &SimConfig,
    _rng: &mut AgentRng,
) -> Option<AgentState> {
    if agent.destinations.is_empty() && agent.current_destination.is_none() {
        return Some(AgentState::Waiting);
    }
    Some(match agent.kind {
        AgentKind::Vehicle | AgentKind::Robot | AgentKind::ServiceRobot => AgentState::Driving,
        AgentKind::Ordinary | AgentKind::Elder => {
            if agent.group.is_some() {
                AgentState::GroupWalking
            } else {
                AgentState::Walking
            }
        }
    })
}

// Waiting

fn enter_waiting(agent: &mut Agent, _scene: &mut Scene, _cfg: &SimConfig, _rng: &mut AgentRng) {
    agent.stop_movement();
}

fn tick_waiting(
    agent: &mut Agent,
    scene: &mut Scene,
    _cfg: &SimConfig,
    rng: &mut AgentRng,
) -> Option<AgentState> {
    if agent.need_new_destination(scene) {
        agent.update_destination(rng);
        return Some(AgentState::Walking);
    }
    Option::None
}

// Queueing

fn tick_queueing(
    agent: &mut Agent,
    scene: &mut Scene,
    _cfg: &SimConfig,
    rng: &mut AgentRng,
) -> Option<AgentState> {
    if agent.has_completed_destination(scene) {
        agent.update_destination(rng);
        return Some(AgentState::Walking);
    }
    Option::None
}

// Walking / Running

fn enter_walking_like(agent: &mut Agent, _scene: &mut Scene, _cfg: &SimConfig, _rng: &mut AgentRng) {
    agent.resume_movement();
}

fn enter_walking(agent: &mut Agent, scene: &mut Scene, cfg: &SimConfig, rng: &mut AgentRng) {
    enter_walking_like(agent, scene, cfg, rng);
    agent.machine.set_normal_state(AgentState::Walking);
}

fn tick_walking(
    agent: &mut Agent,
    scene: &mut Scene,
    cfg: &SimConfig,
    rng: &mut AgentRng,
) -> Option<AgentState> {
    if agent.someone_talking_to_me(scene, cfg) {
        let walking_partner = agent
            .listening_to
            .and_then(|id| scene.agent_by_id(id))
            .is_some_and(|a| a.state == AgentState::TalkingAndWalking);
        return Some(if walking_partner {
            AgentState::ListeningAndWalking
        } else {
            AgentState::Listening
        });
    }
    if agent.need_new_destination(scene) {
        agent.update_destination(rng);
        return Option::None;
    }
    if agent.tell_story(scene, cfg, rng) {
        return Some(AgentState::TellStory);
    }
    if agent.start_group_talking(scene, cfg, rng) {
        return Some(AgentState::GroupTalking);
    }
    if agent.start_talking(scene, cfg, rng) {
        return Some(AgentState::Talking);
    }
    if agent.start_talking_and_walking(scene, cfg, rng) {
        return Some(AgentState::TalkingAndWalking);
    }
    if matches!(agent.kind, AgentKind::Ordinary | AgentKind::Elder)
        && agent.start_requesting_service(scene.now(), cfg, rng)
    {
        return Some(AgentState::RequestingService);
    }
    if agent.switch_running_walking(scene.now(), cfg, rng) {
        return Some(AgentState::Running);
    }
    if agent.group.is_some() && agent.check_group_for_attractions(scene, cfg, rng) {
        return Some(AgentState::Shopping);
    }
    Option::None
}

fn enter_running(agent: &mut Agent, _scene: &mut Scene, cfg: &SimConfig, _rng: &mut AgentRng) {
    agent.resume_movement();
    agent.vmax = agent.base_vmax * cfg.running_vmax_factor;
    agent.machine.set_normal_state(AgentState::Running);
}

fn exit_running(agent: &mut Agent, _cfg: &SimConfig) {
    agent.vmax = agent.base_vmax;
}

fn tick_running(
    agent: &mut Agent,
    scene: &mut Scene,
    cfg: &SimConfig,
    rng: &mut AgentRng,
) -> Option<AgentState> {
    if agent.someone_talking_to_me(scene, cfg) {
        let walking_partner = agent
            .listening_to
            .and_then(|id| scene.agent_by_id(id))
            .is_some_and(|a| a.state == AgentState::TalkingAndWalking);
        return Some(if walking_partner {
            AgentState::ListeningAndWalking
        } else {
            AgentState::Listening
        });
    }
    if agent.need_new_destination(scene) {
        agent.update_destination(rng);
        return Option::None;
    }
    if agent.switch_running_walking(scene.now(), cfg, rng) {
        return Some(AgentState::Walking);
    }
    Option::None
}

// GroupWalking / Shopping

fn enter_group_walking(agent: &mut Agent, _scene: &mut Scene, _cfg: &SimConfig, _rng: &mut AgentRng) {
    agent.resume_movement();
    agent.machine.set_normal_state(AgentState::GroupWalking);
}

fn tick_group_walking(
    agent: &mut Agent,
    scene: &mut Scene,
    cfg: &SimConfig,
    rng: &mut AgentRng,
) -> Option<AgentState> {
    if agent.need_new_destination(scene) {
        agent.update_destination(rng);
        return Option::None;
    }
    if agent.check_group_for_attractions(scene, cfg, rng) {
        return Some(AgentState::Shopping);
    }
    Option::None
}

fn enter_shopping(agent: &mut Agent, scene: &mut Scene, cfg: &SimConfig, rng: &mut AgentRng) {
    agent.machine.set_shall_lose_attraction(false);
    agent.machine.set_timer(random_duration(cfg.shopping_base_time, rng));
    // steer toward the claimed attraction; the cycling list is untouched
    let attraction = agent
        .group
        .and_then(|g| scene.group(g))
        .and_then(|g| g.attraction);
    if let Some(waypoint) = attraction {
        agent.current_destination = Some(waypoint);
        if let Some(planner) = agent.planner.as_mut() {
            planner.set_destination(waypoint);
        }
    }
}

fn tick_shopping(
    agent: &mut Agent,
    scene: &mut Scene,
    cfg: &SimConfig,
    rng: &mut AgentRng,
) -> Option<AgentState> {
    let group_attraction = agent
        .group
        .and_then(|g| scene.group(g))
        .and_then(|g| g.attraction);
    // another member may already have dropped the shared attraction
    if group_attraction.is_none() {
        return Some(agent.machine.normal_state());
    }
    if !agent.machine.shall_lose_attraction()
        && crate::social::cooldown_elapsed(
            &mut agent.cooldowns.group_attraction,
            scene.now(),
            cfg.trigger_cooldown,
        )
        && rng.uniform() < cfg.group_attraction_probability
    {
        agent.machine.set_shall_lose_attraction(true);
    }
    if agent.machine.shall_lose_attraction() || agent.machine.timer_expired(scene.now()) {
        if let Some(group) = agent.group {
            scene.set_group_attraction(group, Option::None);
        }
        return Some(agent.machine.normal_state());
    }
    Option::None
}

fn exit_shopping(agent: &mut Agent, _cfg: &SimConfig) {
    agent.machine.set_shall_lose_attraction(false);
}

// Working

fn enter_working(agent: &mut Agent, _scene: &mut Scene, cfg: &SimConfig, rng: &mut AgentRng) {
    agent.stop_movement();
    agent.machine.set_timer(random_duration(cfg.working_base_time, rng));
}

fn tick_working(
    agent: &mut Agent,
    scene: &mut Scene,
    _cfg: &SimConfig,
    rng: &mut AgentRng,
) -> Option<AgentState> {
    if agent.machine.timer_expired(scene.now()) {
        agent.update_destination(rng);
        return Some(AgentState::Walking);
    }
    Option::None
}

// Driving and the forklift flow

fn enter_driving(agent: &mut Agent, _scene: &mut Scene, _cfg: &SimConfig, _rng: &mut AgentRng) {
    agent.resume_movement();
    agent.machine.set_normal_state(AgentState::Driving);
}

fn tick_driving(
    agent: &mut Agent,
    scene: &mut Scene,
    cfg: &SimConfig,
    rng: &mut AgentRng,
) -> Option<AgentState> {
    if agent.kind == AgentKind::ServiceRobot && agent.someone_is_requesting_service(scene, cfg) {
        return Some(AgentState::DrivingToInteraction);
    }
    if agent.kind == AgentKind::Vehicle {
        let shelf = agent
            .interactive_waypoint_nearby(scene, WaypointType::Shelf)
            .map(|w| w.id);
        if let Some(shelf) = shelf {
            // skip the shelf just serviced; pick it up again next lap
            if agent.last_interacted_waypoint != Some(shelf) {
                agent.last_interacted_waypoint = Some(shelf);
                if let Some(planner) = agent.planner.as_mut() {
                    planner.set_destination(shelf);
                }
                return Some(AgentState::DrivingToInteraction);
            }
        }
    }
    if agent.need_new_destination(scene) {
        agent.update_destination(rng);
    }
    Option::None
}

fn tick_driving_to_interaction(
    agent: &mut Agent,
    scene: &mut Scene,
    cfg: &SimConfig,
    _rng: &mut AgentRng,
) -> Option<AgentState> {
    match agent.kind {
        AgentKind::ServiceRobot => {
            if agent.has_completed_destination(scene) {
                return Some(AgentState::ProvidingService);
            }
        }
        _ => {
            // close enough once the canned pull-in maneuver can cover the rest
            let arrived = agent
                .last_interacted_waypoint
                .and_then(|id| scene.waypoint(id))
                .is_some_and(|w| {
                    (w.position - agent.position).length() <= cfg.maneuver_travel_distance
                });
            if arrived {
                return Some(AgentState::ReachedShelf);
            }
        }
    }
    Option::None
}

fn enter_reached_shelf(agent: &mut Agent, scene: &mut Scene, cfg: &SimConfig, _rng: &mut AgentRng) {
    agent.stop_movement();
    agent.angle_target = agent
        .last_interacted_waypoint
        .and_then(|id| scene.waypoint(id))
        .and_then(|w| w.static_obstacle_angle)
        .unwrap_or(agent.heading);
    agent.move_list = Some(MoveList::new(reached_shelf_moves(
        agent.position,
        agent.heading,
        agent.angle_target,
        scene.now(),
        cfg,
    )));
}

fn tick_reached_shelf(
    agent: &mut Agent,
    scene: &mut Scene,
    _cfg: &SimConfig,
    _rng: &mut AgentRng,
) -> Option<AgentState> {
    let done = agent
        .move_list
        .as_ref()
        .is_none_or(|m| m.completed(scene.now()));
    if done {
        return Some(AgentState::LiftingForks);
    }
    Option::None
}

fn exit_clear_move_list(agent: &mut Agent, _cfg: &SimConfig) {
    agent.move_list = Option::None;
}

fn enter_lifting_forks(agent: &mut Agent, _scene: &mut Scene, cfg: &SimConfig, rng: &mut AgentRng) {
    agent
        .machine
        .set_timer(random_duration(cfg.lifting_forks_base_time, rng));
}

fn enter_loading(agent: &mut Agent, _scene: &mut Scene, cfg: &SimConfig, rng: &mut AgentRng) {
    agent.machine.set_timer(random_duration(cfg.loading_base_time, rng));
}

fn enter_lowering_forks(agent: &mut Agent, _scene: &mut Scene, cfg: &SimConfig, rng: &mut AgentRng) {
    agent
        .machine
        .set_timer(random_duration(cfg.lowering_forks_base_time, rng));
}

fn tick_timed_to_loading(
    agent: &mut Agent,
    scene: &mut Scene,
    _cfg: &SimConfig,
    _rng: &mut AgentRng,
) -> Option<AgentState> {
    agent
        .machine
        .timer_expired(scene.now())
        .then_some(AgentState::Loading)
}

fn tick_timed_to_lowering(
    agent: &mut Agent,
    scene: &mut Scene,
    _cfg: &SimConfig,
    _rng: &mut AgentRng,
) -> Option<AgentState> {
    agent
        .machine
        .timer_expired(scene.now())
        .then_some(AgentState::LoweringForks)
}

fn tick_timed_to_back_up(
    agent: &mut Agent,
    scene: &mut Scene,
    _cfg: &SimConfig,
    _rng: &mut AgentRng,
) -> Option<AgentState> {
    agent
        .machine
        .timer_expired(scene.now())
        .then_some(AgentState::BackUp)
}

fn enter_back_up(agent: &mut Agent, scene: &mut Scene, cfg: &SimConfig, rng: &mut AgentRng) {
    agent.update_destination(rng);
    let destination = agent
        .destination_position(scene)
        .unwrap_or(agent.position);
    agent.move_list = Some(MoveList::new(back_up_moves(
        agent.position,
        agent.heading,
        destination,
        scene.now(),
        cfg,
    )));
}

fn tick_back_up(
    agent: &mut Agent,
    scene: &mut Scene,
    _cfg: &SimConfig,
    _rng: &mut AgentRng,
) -> Option<AgentState> {
    let done = agent
        .move_list
        .as_ref()
        .is_none_or(|m| m.completed(scene.now()));
    if done {
        return Some(AgentState::Driving);
    }
    Option::None
}

// Talking states

fn enter_tell_story(agent: &mut Agent, _scene: &mut Scene, cfg: &SimConfig, rng: &mut AgentRng) {
    agent.stop_movement();
    // listeners form their circle around the teller
    agent.keep_distance_to = Some(agent.position);
    agent
        .machine
        .set_timer(random_duration(cfg.tell_story_base_time, rng));
}

fn exit_tell_story(agent: &mut Agent, _cfg: &SimConfig) {
    agent.keep_distance_to = Option::None;
}

fn enter_group_talking(agent: &mut Agent, _scene: &mut Scene, cfg: &SimConfig, rng: &mut AgentRng) {
    use crowd_force::model::KEEP_DISTANCE;
    // the host holds the circle the same way its listeners do
    agent.stop_movement();
    agent.forces.enable(KEEP_DISTANCE);
    agent
        .machine
        .set_timer(random_duration(cfg.group_talking_base_time, rng));
}

fn tick_group_talking_state(
    agent: &mut Agent,
    scene: &mut Scene,
    cfg: &SimConfig,
    _rng: &mut AgentRng,
) -> Option<AgentState> {
    agent.adjust_keep_distance(scene, cfg);
    if agent.machine.timer_expired(scene.now()) {
        return Some(agent.machine.normal_state());
    }
    Option::None
}

fn exit_group_talking(agent: &mut Agent, cfg: &SimConfig) {
    agent.keep_distance_to = Option::None;
    agent.keep_distance = cfg.keep_distance_default;
}

fn enter_talking(agent: &mut Agent, _scene: &mut Scene, cfg: &SimConfig, rng: &mut AgentRng) {
    agent.stop_movement();
    agent.machine.set_timer(random_duration(cfg.talking_base_time, rng));
}

fn exit_talking(agent: &mut Agent, _cfg: &SimConfig) {
    agent.talking_to = Option::None;
}

fn enter_talking_and_walking(
    agent: &mut Agent,
    _scene: &mut Scene,
    cfg: &SimConfig,
    rng: &mut AgentRng,
) {
    agent
        .machine
        .set_timer(random_duration(cfg.talking_and_walking_base_time, rng));
}

fn tick_talking_and_walking(
    agent: &mut Agent,
    scene: &mut Scene,
    _cfg: &SimConfig,
    rng: &mut AgentRng,
) -> Option<AgentState> {
    if agent.need_new_destination(scene) {
        agent.update_destination(rng);
    }
    if agent.machine.timer_expired(scene.now()) {
        return Some(agent.machine.normal_state());
    }
    Option::None
}

fn tick_timed_to_normal(
    agent: &mut Agent,
    scene: &mut Scene,
    _cfg: &SimConfig,
    _rng: &mut AgentRng,
) -> Option<AgentState> {
    if agent.machine.timer_expired(scene.now()) {
        return Some(agent.machine.normal_state());
    }
    Option::None
}

// Listening states

fn enter_listening(agent: &mut Agent, _scene: &mut Scene, _cfg: &SimConfig, _rng: &mut AgentRng) {
    use crowd_force::model::KEEP_DISTANCE;
    // stop goal-seeking, but let the keep-distance spring pull the agent
    // onto the listener circle
    agent.stop_movement();
    agent.forces.enable(KEEP_DISTANCE);
}

fn tick_listening(
    agent: &mut Agent,
    scene: &mut Scene,
    cfg: &SimConfig,
    _rng: &mut AgentRng,
) -> Option<AgentState> {
    let target = agent.listening_to.and_then(|id| scene.agent_by_id(id));
    let still_talking = match target {
        Some(t) => match t.state {
            AgentState::TellStory => {
                agent.keep_distance_to = Some(t.position);
                true
            }
            AgentState::GroupTalking => {
                agent.keep_distance_to = t.keep_distance_to;
                true
            }
            AgentState::Talking => t.talking_to == Some(agent.id),
            _ => false,
        },
        Option::None => false,
    };
    if !still_talking {
        return Some(agent.machine.normal_state());
    }
    agent.adjust_keep_distance(scene, cfg);
    Option::None
}

fn exit_listening(agent: &mut Agent, cfg: &SimConfig) {
    agent.listening_to = Option::None;
    agent.keep_distance_to = Option::None;
    agent.keep_distance = cfg.keep_distance_default;
}

fn tick_listening_and_walking(
    agent: &mut Agent,
    scene: &mut Scene,
    _cfg: &SimConfig,
    _rng: &mut AgentRng,
) -> Option<AgentState> {
    let still_talking = agent
        .listening_to
        .and_then(|id| scene.agent_by_id(id))
        .is_some_and(|t| {
            t.state == AgentState::TalkingAndWalking && t.talking_to == Some(agent.id)
        });
    if !still_talking {
        return Some(agent.machine.normal_state());
    }
    Option::None
}

// Service flow

fn enter_requesting_service(
    agent: &mut Agent,
    _scene: &mut Scene,
    cfg: &SimConfig,
    rng: &mut AgentRng,
) {
    agent.stop_movement();
    agent
        .machine
        .set_timer(random_duration(cfg.requesting_service_base_time, rng));
}

fn tick_requesting_service(
    agent: &mut Agent,
    scene: &mut Scene,
    cfg: &SimConfig,
    _rng: &mut AgentRng,
) -> Option<AgentState> {
    if agent.service_robot_is_near(scene, cfg) {
        return Some(AgentState::ReceivingService);
    }
    if agent.machine.timer_expired(scene.now()) {
        // give up; nobody came
        return Some(agent.machine.normal_state());
    }
    Option::None
}

fn enter_receiving_service(
    agent: &mut Agent,
    _scene: &mut Scene,
    cfg: &SimConfig,
    rng: &mut AgentRng,
) {
    agent
        .machine
        .set_timer(random_duration(cfg.receiving_service_base_time, rng));
}

fn exit_receiving_service(agent: &mut Agent, _cfg: &SimConfig) {
    agent.current_service_robot = Option::None;
}

fn enter_providing_service(
    agent: &mut Agent,
    _scene: &mut Scene,
    cfg: &SimConfig,
    rng: &mut AgentRng,
) {
    agent.stop_movement();
    agent
        .machine
        .set_timer(random_duration(cfg.providing_service_base_time, rng));
}

fn tick_providing_service(
    agent: &mut Agent,
    scene: &mut Scene,
    _cfg: &SimConfig,
    _rng: &mut AgentRng,
) -> Option<AgentState> {
    agent
        .machine
        .timer_expired(scene.now())
        .then_some(AgentState::Driving)
}

fn exit_providing_service(agent: &mut Agent, _cfg: &SimConfig) {
    agent.servicing_agent = Option::None;
    agent.servicing_waypoint = Option::None;
    agent.current_destination = Option::None;
}
