//! Behavioral state and agent kind enums.
//!
//! `AgentState` is the discrete behavioral mode of an agent.  Exactly one
//! variant is current at any time; it is created as `None` at agent
//! construction and mutated only through the state machine's transition
//! function.

use std::fmt;

/// The discrete behavioral mode of an agent.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AgentState {
    /// Freshly constructed; the first transition pass leaves this state.
    #[default]
    None,
    /// Standing still, waiting for a destination to become relevant.
    Waiting,
    /// Standing in a queue behind other agents.
    Queueing,
    /// Normal pedestrian locomotion toward the current destination.
    Walking,
    /// Like `Walking`, at elevated speed.
    Running,
    /// Walking as part of a group, keeping formation.
    GroupWalking,
    /// Dwelling inside an attraction area.
    Shopping,
    /// Stationary task at a work waypoint (timed).
    Working,
    /// Vehicle locomotion toward the current destination.
    Driving,
    /// Vehicle heading to an interactive waypoint (e.g. a shelf).
    DrivingToInteraction,
    /// Canned maneuver: reverse away from a shelf, then turn to the
    /// next destination.
    BackUp,
    /// Canned maneuver: align with a shelf and pull in close.
    ReachedShelf,
    /// Forklift raising its forks at a shelf (timed).
    LiftingForks,
    /// Forklift exchanging a load at a shelf (timed).
    Loading,
    /// Forklift lowering its forks at a shelf (timed).
    LoweringForks,
    /// Telling a story to everyone in earshot (timed).
    TellStory,
    /// Hosting a group conversation; own position is the focal point (timed).
    GroupTalking,
    /// One-to-one conversation with a specific partner (timed).
    Talking,
    /// Standing in an audience, oriented toward a focal point.
    Listening,
    /// Talking to a partner while both keep walking (timed).
    TalkingAndWalking,
    /// Walking alongside a talking partner, rigidly keeping station.
    ListeningAndWalking,
    /// Standing still until a service robot arrives (timed).
    RequestingService,
    /// Being attended by a service robot (timed).
    ReceivingService,
    /// Service robot attending a requesting agent (timed).
    ProvidingService,
}

impl AgentState {
    /// States in which an agent can be recruited as a conversation partner.
    #[inline]
    pub fn is_free_to_listen(self) -> bool {
        matches!(self, AgentState::Walking | AgentState::Running)
    }

    /// Stable name used for force toggling logs and observers.
    pub fn name(self) -> &'static str {
        match self {
            AgentState::None => "None",
            AgentState::Waiting => "Waiting",
            AgentState::Queueing => "Queueing",
            AgentState::Walking => "Walking",
            AgentState::Running => "Running",
            AgentState::GroupWalking => "GroupWalking",
            AgentState::Shopping => "Shopping",
            AgentState::Working => "Working",
            AgentState::Driving => "Driving",
            AgentState::DrivingToInteraction => "DrivingToInteraction",
            AgentState::BackUp => "BackUp",
            AgentState::ReachedShelf => "ReachedShelf",
            AgentState::LiftingForks => "LiftingForks",
            AgentState::Loading => "Loading",
            AgentState::LoweringForks => "LoweringForks",
            AgentState::TellStory => "TellStory",
            AgentState::GroupTalking => "GroupTalking",
            AgentState::Talking => "Talking",
            AgentState::Listening => "Listening",
            AgentState::TalkingAndWalking => "TalkingAndWalking",
            AgentState::ListeningAndWalking => "ListeningAndWalking",
            AgentState::RequestingService => "RequestingService",
            AgentState::ReceivingService => "ReceivingService",
            AgentState::ProvidingService => "ProvidingService",
        }
    }
}

impl fmt::Display for AgentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ── AgentKind ─────────────────────────────────────────────────────────────────

/// What kind of entity the agent simulates.
///
/// The kind never changes after construction; it selects the base state the
/// machine settles into (`Walking` for pedestrians, `Driving` for vehicles
/// and service robots) and kind-specific motion rules.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AgentKind {
    /// An ordinary adult pedestrian.
    #[default]
    Ordinary,
    /// Slower pedestrian: speed and desired-force weight permanently capped.
    Elder,
    /// A forklift-style vehicle that services shelves.
    Vehicle,
    /// The externally controllable robot.
    Robot,
    /// A robot that answers service requests from pedestrians.
    ServiceRobot,
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AgentKind::Ordinary => "ordinary",
            AgentKind::Elder => "elder",
            AgentKind::Vehicle => "vehicle",
            AgentKind::Robot => "robot",
            AgentKind::ServiceRobot => "service-robot",
        };
        f.write_str(name)
    }
}

// ── RobotMode ─────────────────────────────────────────────────────────────────

/// How the controllable robot is driven.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RobotMode {
    /// Position is set externally; velocity is kept only so other agents'
    /// social forces see the robot moving.
    #[default]
    Teleoperation,
    /// Scripted: the robot holds still until `robot_wait_time`, then moves
    /// under the normal force model.
    Controlled,
    /// Autonomous: force coefficients and speed cap are retuned, then the
    /// robot integrates like a pedestrian.
    SocialDrive,
}
