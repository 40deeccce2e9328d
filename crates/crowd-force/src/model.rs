//! The four built-in forces, the pluggable extras, and the disabled set.

use rustc_hash::FxHashSet;

use crowd_core::{AgentId, SimConfig, Vec2};
use crowd_scene::Scene;

use crate::{Force, ForceReport};

/// Name of the built-in desired (goal-seeking) force.
pub const DESIRED: &str = "Desired";
/// Name of the built-in social (agent repulsion) force.
pub const SOCIAL: &str = "Social";
/// Name of the built-in obstacle repulsion force.
pub const OBSTACLE: &str = "Obstacle";
/// Name of the built-in keep-distance (focal-point orbit) force.
pub const KEEP_DISTANCE: &str = "KeepDistance";

/// Interaction range constant of the social repulsion (Helbing's B), metres.
const SOCIAL_RANGE: f64 = 0.3;
/// Combined body radii of two agents (Helbing's r_ij), metres.
const COMBINED_RADIUS: f64 = 0.6;

/// Everything the force model reads for one agent on one tick.
///
/// Assembled by the caller from the agent's live state plus the scene's
/// tick-stable snapshots; the model itself holds no per-tick state.
pub struct ForceInputs<'a> {
    pub agent: AgentId,
    pub position: Vec2,
    pub velocity: Vec2,
    /// Current speed cap; the desired force steers toward `vmax` along the
    /// direction to the destination.
    pub vmax: f64,
    /// Current destination position, if the agent has one.
    pub destination: Option<Vec2>,
    /// Shared focal point for the keep-distance force, if set.
    pub focal_point: Option<Vec2>,
    /// Target orbit radius around the focal point, metres.
    pub keep_distance: f64,
    pub scene: &'a Scene,
}

/// Per-agent force model: coefficients, extra forces, and the disabled set.
///
/// Enabling/disabling is by name lookup in the disabled set, never by
/// removing the force, so toggling preserves registration order and
/// re-enabling is idempotent.
pub struct ForceModel {
    pub factor_desired: f64,
    pub factor_social: f64,
    pub factor_obstacle: f64,
    pub factor_keep_distance: f64,
    pub sigma_obstacle: f64,
    pub relaxation_time: f64,
    social_cutoff: f64,

    extra: Vec<Box<dyn Force>>,
    disabled: FxHashSet<String>,
}

impl ForceModel {
    pub fn new(cfg: &SimConfig) -> Self {
        Self {
            factor_desired: cfg.force_factor_desired,
            factor_social: cfg.force_factor_social,
            factor_obstacle: cfg.force_factor_obstacle,
            factor_keep_distance: cfg.force_factor_keep_distance,
            sigma_obstacle: cfg.sigma_obstacle,
            relaxation_time: cfg.relaxation_time,
            social_cutoff: cfg.social_force_cutoff,
            extra: Vec::new(),
            disabled: FxHashSet::default(),
        }
    }

    // ── Toggling ──────────────────────────────────────────────────────────

    pub fn disable(&mut self, name: &str) {
        self.disabled.insert(name.to_owned());
    }

    pub fn enable(&mut self, name: &str) {
        self.disabled.remove(name);
    }

    #[inline]
    pub fn is_disabled(&self, name: &str) -> bool {
        self.disabled.contains(name)
    }

    pub fn enable_all(&mut self) {
        self.disabled.clear();
    }

    pub fn disable_all(&mut self) {
        self.disable(DESIRED);
        self.disable(SOCIAL);
        self.disable(OBSTACLE);
        self.disable(KEEP_DISTANCE);
        let extra_names: Vec<String> = self.extra.iter().map(|f| f.name().to_owned()).collect();
        for name in extra_names {
            self.disable(&name);
        }
    }

    // ── Extra forces ──────────────────────────────────────────────────────

    /// Register a pluggable force.  Registration order is the summation
    /// order in [`sum_of_extra_forces`][Self::sum_of_extra_forces].
    pub fn add_force(&mut self, force: Box<dyn Force>) {
        self.extra.push(force);
    }

    /// Remove a pluggable force by name; reports whether anything was removed.
    pub fn remove_force(&mut self, name: &str) -> bool {
        let before = self.extra.len();
        self.extra.retain(|f| f.name() != name);
        self.extra.len() < before
    }

    // ── The four built-in forces ──────────────────────────────────────────

    /// Steer toward the destination at `vmax`, relaxing the current
    /// velocity toward the desired one.  With no destination the force
    /// brakes the agent to a stop.
    pub fn desired_force(&self, inputs: &ForceInputs<'_>) -> Vec2 {
        if self.is_disabled(DESIRED) {
            return Vec2::ZERO;
        }
        let desired_velocity = match inputs.destination {
            Some(dest) => (dest - inputs.position).normalized() * inputs.vmax,
            None => Vec2::ZERO,
        };
        (desired_velocity - inputs.velocity) * (self.factor_desired / self.relaxation_time)
    }

    /// Exponential repulsion from every neighbor within the cutoff.
    pub fn social_force(&self, inputs: &ForceInputs<'_>) -> Vec2 {
        if self.is_disabled(SOCIAL) {
            return Vec2::ZERO;
        }
        let mut force = Vec2::ZERO;
        for neighbor in
            inputs
                .scene
                .neighbors_in_range(inputs.agent, inputs.position, self.social_cutoff)
        {
            let diff = inputs.position - neighbor.position;
            let distance = diff.length();
            if distance < 1e-9 {
                // coincident agents: no defined direction to push along
                continue;
            }
            let strength = self.factor_social * ((COMBINED_RADIUS - distance) / SOCIAL_RANGE).exp();
            force += diff.normalized() * strength;
        }
        force
    }

    /// Repulsion from the closest point of the closest obstacle.
    pub fn obstacle_force(&self, inputs: &ForceInputs<'_>) -> Vec2 {
        if self.is_disabled(OBSTACLE) {
            return Vec2::ZERO;
        }
        let closest = inputs
            .scene
            .obstacles()
            .iter()
            .map(|o| o.closest_point(inputs.position))
            .min_by(|a, b| {
                let da = (*a - inputs.position).length_squared();
                let db = (*b - inputs.position).length_squared();
                da.total_cmp(&db)
            });
        let Some(point) = closest else {
            return Vec2::ZERO;
        };
        let away = inputs.position - point;
        let distance = away.length();
        if distance < 1e-9 {
            return Vec2::ZERO;
        }
        away.normalized() * (self.factor_obstacle * (-distance / self.sigma_obstacle).exp())
    }

    /// Radial spring holding the agent on a circle of radius
    /// `inputs.keep_distance` around the focal point.
    pub fn keep_distance_force(&self, inputs: &ForceInputs<'_>) -> Vec2 {
        if self.is_disabled(KEEP_DISTANCE) {
            return Vec2::ZERO;
        }
        let Some(focal) = inputs.focal_point else {
            return Vec2::ZERO;
        };
        let outward = inputs.position - focal;
        let distance = outward.length();
        if distance < 1e-9 {
            // standing exactly on the focal point: push out along x
            return Vec2::new(inputs.keep_distance * self.factor_keep_distance, 0.0);
        }
        let error = inputs.keep_distance - distance;
        outward.normalized() * (error * self.factor_keep_distance)
    }

    /// Sum of all registered extra forces.
    ///
    /// Disabled forces contribute (and are reported as) zero.  A force that
    /// returns a vector with any non-finite component is discarded as zero
    /// and its name logged — bad plugins cannot poison the integration.
    pub fn sum_of_extra_forces(&self, desired_direction: Vec2) -> Vec2 {
        let mut total = Vec2::ZERO;
        for force in &self.extra {
            if self.is_disabled(force.name()) {
                continue;
            }
            let value = force.compute_force(desired_direction);
            if !value.is_finite() {
                tracing::warn!(force = force.name(), "discarding non-finite force output");
                continue;
            }
            total += value;
        }
        total
    }

    // ── Assembly ──────────────────────────────────────────────────────────

    /// Compute every component and their sum for this tick.  Pure: no
    /// integration, no mutation.
    pub fn compute(&self, inputs: &ForceInputs<'_>) -> ForceReport {
        let desired = self.desired_force(inputs);
        let social = self.social_force(inputs);
        let obstacle = self.obstacle_force(inputs);
        let keep_distance = self.keep_distance_force(inputs);

        let desired_direction = inputs
            .destination
            .map(|d| (d - inputs.position).normalized())
            .unwrap_or(Vec2::ZERO);
        let extra = self.sum_of_extra_forces(desired_direction);

        ForceReport {
            desired,
            social,
            obstacle,
            keep_distance,
            extra,
            total: desired + social + obstacle + keep_distance + extra,
        }
    }
}
