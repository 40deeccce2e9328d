//! Per-tick movement: force assembly, integration, canned-maneuver replay,
//! rigid following, and the heading update.

use std::f64::consts::FRAC_PI_2;

use crowd_core::{AgentKind, AgentState, RobotMode, SimConfig, Vec2};
use crowd_force::ForceInputs;
use crowd_scene::Scene;

use crate::Agent;

impl Agent {
    // ── Force assembly ────────────────────────────────────────────────────

    /// Rebuild this tick's force report from the scene snapshots.
    ///
    /// Pure with respect to the pose; the report is stored for the
    /// integrator and for observers.
    pub fn compute_forces(&mut self, scene: &Scene, _cfg: &SimConfig) {
        let inputs = ForceInputs {
            agent: self.id,
            position: self.position,
            velocity: self.velocity,
            vmax: self.vmax,
            destination: self.destination_position(scene),
            focal_point: self.keep_distance_to,
            keep_distance: self.keep_distance,
            scene,
        };
        self.last_report = self.forces.compute(&inputs);
    }

    // ── Movement dispatch ─────────────────────────────────────────────────

    /// Advance the pose by one tick according to the current state and kind.
    pub fn tick_movement(&mut self, scene: &Scene, cfg: &SimConfig) {
        let dt = cfg.time_step;

        if self.kind == AgentKind::Robot {
            self.tick_robot_movement(dt, scene, cfg);
        } else {
            match self.machine.state() {
                AgentState::ListeningAndWalking => self.follow_walking_partner(scene, cfg),
                AgentState::ReachedShelf | AgentState::BackUp => self.move_by_move_list(scene),
                _ => self.integrate(dt),
            }
        }

        if self.kind == AgentKind::Elder {
            // elders never speed up, whatever state they pass through
            self.vmax = cfg.elder_vmax;
            self.forces.factor_desired = cfg.elder_force_factor_desired;
        }

        // a robot's heading is part of its externally driven pose
        if self.kind != AgentKind::Robot {
            self.update_heading(scene);
        }
    }

    /// Euler step: accelerate by the summed force, cap speed, translate.
    fn integrate(&mut self, dt: f64) {
        let total = self.last_report.total;
        self.acceleration = total;
        self.velocity += total * dt;
        let speed = self.velocity.length();
        if speed > self.vmax {
            self.velocity = self.velocity.normalized() * self.vmax;
        }
        self.position += self.velocity * dt;
    }

    /// Robot movement depends on the configured control mode.
    fn tick_robot_movement(&mut self, dt: f64, scene: &Scene, cfg: &SimConfig) {
        match cfg.robot_mode {
            RobotMode::Teleoperation => {
                // position is set externally; keep the reported velocity so
                // other agents' social forces still see the robot moving
                let v = self.velocity;
                self.velocity = Vec2::ZERO;
                self.integrate(dt);
                self.velocity = v;
            }
            RobotMode::Controlled => {
                if scene.now().0 >= cfg.robot_wait_time {
                    self.integrate(dt);
                }
            }
            RobotMode::SocialDrive => {
                self.forces.factor_social =
                    cfg.force_factor_social * cfg.social_drive_social_scale;
                self.forces.factor_obstacle = cfg.social_drive_force_factor_obstacle;
                self.forces.factor_desired = cfg.social_drive_force_factor_desired;
                self.vmax = cfg.social_drive_vmax;
                self.integrate(dt);
            }
        }
    }

    /// Rigid station-keeping beside a talking-and-walking partner: position
    /// is held `keep_distance_default` metres to the partner's left, and the
    /// partner's velocity is copied verbatim.
    fn follow_walking_partner(&mut self, scene: &Scene, cfg: &SimConfig) {
        let Some(partner) = self.listening_to.and_then(|id| scene.agent_by_id(id)) else {
            // transition pass drops the state next tick; hold position
            debug_assert!(false, "ListeningAndWalking without a resolvable partner");
            tracing::debug!(agent = %self.id, "listening target vanished, holding position");
            return;
        };
        let sideways = partner.velocity.rotated(FRAC_PI_2).normalized();
        self.position = partner.position + sideways * cfg.keep_distance_default;
        self.velocity = partner.velocity;
        self.acceleration = Vec2::ZERO;
    }

    /// Replay the active canned maneuver: snap the pose to the sample whose
    /// timestamp is closest to now.
    fn move_by_move_list(&mut self, scene: &Scene) {
        let Some(pose) = self
            .move_list
            .as_ref()
            .and_then(|m| m.sample_at(scene.now()))
            .copied()
        else {
            return;
        };
        self.position = pose.position;
        self.heading = pose.heading;
        self.velocity = Vec2::ZERO;
        self.acceleration = Vec2::ZERO;
    }

    // ── Heading ───────────────────────────────────────────────────────────

    /// Derive the facing direction for the state just ticked.
    ///
    /// Locomotion states face the velocity (above a small threshold, so a
    /// braking agent does not spin); audiences face their focal point;
    /// conversations face the partner; fork work faces the shelf; canned
    /// maneuvers have already set the heading from the replayed sample.
    fn update_heading(&mut self, scene: &Scene) {
        match self.machine.state() {
            AgentState::ReachedShelf | AgentState::BackUp => {}
            AgentState::Listening | AgentState::GroupTalking => {
                if let Some(focal) = self.keep_distance_to {
                    let to_focal = focal - self.position;
                    if to_focal.length() > 1e-9 {
                        self.heading = to_focal.polar_angle();
                    }
                }
            }
            AgentState::Talking => {
                if let Some(partner) = self.talking_to.and_then(|id| scene.agent_by_id(id)) {
                    self.heading = (partner.position - self.position).polar_angle();
                }
            }
            AgentState::ReceivingService => {
                if let Some(robot) = self
                    .current_service_robot
                    .and_then(|id| scene.agent_by_id(id))
                {
                    self.heading = (robot.position - self.position).polar_angle();
                }
            }
            AgentState::LiftingForks | AgentState::Loading | AgentState::LoweringForks => {
                if let Some(shelf) = self
                    .last_interacted_waypoint
                    .and_then(|id| scene.waypoint(id))
                {
                    if let Some(angle) = shelf.static_obstacle_angle {
                        self.heading = angle;
                    }
                }
            }
            _ => {
                if self.velocity.length() > 1e-3 {
                    self.heading = self.velocity.polar_angle();
                }
            }
        }
    }
}
