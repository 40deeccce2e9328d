//! Top-level simulation configuration.
//!
//! All tunables of the behavior core live in one immutable [`SimConfig`]
//! supplied at construction time: force coefficients, trigger probabilities,
//! interaction radii, base durations for the timed states, and the robot
//! control mode.  The struct is plain data; loading it from a file is the
//! application's concern.

use crate::error::{CrowdError, CrowdResult};
use crate::state::RobotMode;

/// How an agent's destination list is traversed.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WaypointMode {
    /// Modular increment through the list.
    #[default]
    Sequential,
    /// Uniform resampling that never repeats the current index when more
    /// than one destination exists.
    Random,
}

/// Immutable configuration for one simulation run.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimConfig {
    // ── Time ──────────────────────────────────────────────────────────────
    /// Simulated seconds per tick.
    pub time_step: f64,
    /// Master RNG seed.  The same seed always produces identical runs.
    pub seed: u64,

    // ── Force coefficients ────────────────────────────────────────────────
    pub force_factor_desired: f64,
    pub force_factor_social: f64,
    pub force_factor_obstacle: f64,
    pub force_factor_keep_distance: f64,
    /// Decay length of the obstacle repulsion, metres.
    pub sigma_obstacle: f64,
    /// Relaxation time of the desired force, seconds.
    pub relaxation_time: f64,
    /// Neighbors beyond this distance contribute no social force, metres.
    pub social_force_cutoff: f64,

    // ── Speeds ────────────────────────────────────────────────────────────
    /// Default walking speed cap, m/s.
    pub vmax_default: f64,
    /// Multiplier applied to `vmax` while `Running`.
    pub running_vmax_factor: f64,
    /// Permanent speed cap for `Elder` agents, m/s.
    pub elder_vmax: f64,
    /// Permanent desired-force weight for `Elder` agents.
    pub elder_force_factor_desired: f64,

    // ── Interaction radii ─────────────────────────────────────────────────
    /// Conversation triggers consider neighbors within this radius, metres.
    pub max_talking_distance: f64,
    /// Service robots notice requests within this radius, metres.
    pub max_servicing_radius: f64,
    /// A requester is "being served" once a service robot is this close, metres.
    pub service_robot_range: f64,
    /// Default orbit radius around a focal point, metres.
    pub keep_distance_default: f64,
    /// Lower bound for the adaptive listener-circle radius, metres.
    pub min_keep_distance: f64,
    /// Target spacing between listeners on the circle, metres.
    pub listener_spacing: f64,

    // ── Probabilistic triggers ────────────────────────────────────────────
    /// Seconds between successive evaluations of any one trigger.
    pub trigger_cooldown: f64,
    pub tell_story_probability: f64,
    pub group_talking_probability: f64,
    pub talking_probability: f64,
    pub talking_and_walking_probability: f64,
    pub switch_running_walking_probability: f64,
    pub requesting_service_probability: f64,
    pub group_attraction_probability: f64,

    // ── Base durations for timed states, seconds ──────────────────────────
    pub working_base_time: f64,
    pub lifting_forks_base_time: f64,
    pub loading_base_time: f64,
    pub lowering_forks_base_time: f64,
    pub shopping_base_time: f64,
    pub talking_base_time: f64,
    pub tell_story_base_time: f64,
    pub group_talking_base_time: f64,
    pub talking_and_walking_base_time: f64,
    pub requesting_service_base_time: f64,
    pub receiving_service_base_time: f64,
    pub providing_service_base_time: f64,

    // ── Micro-trajectory generation ───────────────────────────────────────
    /// Constant linear rate of canned maneuvers, m/s.
    pub maneuver_linear_rate: f64,
    /// Constant angular rate of canned maneuvers, rad/s.
    pub maneuver_angular_rate: f64,
    /// Rotation phase ends within this angle of the target, rad.
    pub maneuver_angular_tolerance: f64,
    /// Translation phase ends within this distance of the target, metres.
    pub maneuver_position_tolerance: f64,
    /// All samples are stamped this far into the future, seconds.
    pub maneuver_lead_in: f64,
    /// Forward/backward travel distance of the canned maneuvers, metres.
    pub maneuver_travel_distance: f64,
    /// The translation aborts once the remaining distance exceeds the
    /// original distance by this much, metres.
    pub maneuver_overshoot_slack: f64,

    // ── Robot control ─────────────────────────────────────────────────────
    pub robot_mode: RobotMode,
    /// In `Controlled` mode the robot holds still until this timestamp, seconds.
    pub robot_wait_time: f64,
    pub social_drive_vmax: f64,
    pub social_drive_force_factor_desired: f64,
    pub social_drive_force_factor_obstacle: f64,
    /// Multiplier on the social force factor in `SocialDrive` mode.
    pub social_drive_social_scale: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            time_step: 0.02,
            seed: 0,

            force_factor_desired: 1.0,
            force_factor_social: 2.1,
            force_factor_obstacle: 10.0,
            force_factor_keep_distance: 1.0,
            sigma_obstacle: 0.8,
            relaxation_time: 0.5,
            social_force_cutoff: 10.0,

            vmax_default: 1.4,
            running_vmax_factor: 2.0,
            elder_vmax: 0.9,
            elder_force_factor_desired: 0.5,

            max_talking_distance: 1.5,
            max_servicing_radius: 10.0,
            service_robot_range: 1.0,
            keep_distance_default: 0.5,
            min_keep_distance: 0.3,
            listener_spacing: 1.5,

            trigger_cooldown: 0.5,
            tell_story_probability: 0.01,
            group_talking_probability: 0.01,
            talking_probability: 0.01,
            talking_and_walking_probability: 0.01,
            switch_running_walking_probability: 0.1,
            requesting_service_probability: 0.1,
            group_attraction_probability: 0.01,

            working_base_time: 20.0,
            lifting_forks_base_time: 5.0,
            loading_base_time: 8.0,
            lowering_forks_base_time: 5.0,
            shopping_base_time: 30.0,
            talking_base_time: 12.0,
            tell_story_base_time: 30.0,
            group_talking_base_time: 20.0,
            talking_and_walking_base_time: 12.0,
            requesting_service_base_time: 30.0,
            receiving_service_base_time: 15.0,
            providing_service_base_time: 10.0,

            maneuver_linear_rate: 0.5,
            maneuver_angular_rate: 0.5,
            maneuver_angular_tolerance: 0.1,
            maneuver_position_tolerance: 0.1,
            maneuver_lead_in: 1.0,
            maneuver_travel_distance: 1.0,
            maneuver_overshoot_slack: 1.0,

            robot_mode: RobotMode::Teleoperation,
            robot_wait_time: 0.0,
            social_drive_vmax: 1.6,
            social_drive_force_factor_desired: 4.2,
            social_drive_force_factor_obstacle: 35.0,
            social_drive_social_scale: 0.7,
        }
    }
}

impl SimConfig {
    /// Check that the configuration is internally consistent.
    ///
    /// Call once at construction; the rest of the framework assumes a valid
    /// config and does not re-check.
    pub fn validate(&self) -> CrowdResult<()> {
        if !(self.time_step > 0.0 && self.time_step.is_finite()) {
            return Err(CrowdError::Config(format!(
                "time_step must be positive and finite, got {}",
                self.time_step
            )));
        }
        let probabilities = [
            ("tell_story_probability", self.tell_story_probability),
            ("group_talking_probability", self.group_talking_probability),
            ("talking_probability", self.talking_probability),
            (
                "talking_and_walking_probability",
                self.talking_and_walking_probability,
            ),
            (
                "switch_running_walking_probability",
                self.switch_running_walking_probability,
            ),
            (
                "requesting_service_probability",
                self.requesting_service_probability,
            ),
            (
                "group_attraction_probability",
                self.group_attraction_probability,
            ),
        ];
        for (name, p) in probabilities {
            if !(0.0..=1.0).contains(&p) {
                return Err(CrowdError::Config(format!(
                    "{name} must be within [0, 1], got {p}"
                )));
            }
        }
        for (name, v) in [
            ("maneuver_linear_rate", self.maneuver_linear_rate),
            ("maneuver_angular_rate", self.maneuver_angular_rate),
            ("vmax_default", self.vmax_default),
            ("max_talking_distance", self.max_talking_distance),
            ("relaxation_time", self.relaxation_time),
        ] {
            if !(v > 0.0 && v.is_finite()) {
                return Err(CrowdError::Config(format!(
                    "{name} must be positive and finite, got {v}"
                )));
            }
        }
        if self.trigger_cooldown < 0.0 {
            return Err(CrowdError::Config(format!(
                "trigger_cooldown must not be negative, got {}",
                self.trigger_cooldown
            )));
        }
        Ok(())
    }
}
