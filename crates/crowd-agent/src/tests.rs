//! Unit tests for the behavior engine.

#[cfg(test)]
mod trajectory {
    use std::f64::consts::{FRAC_PI_2, PI, TAU};

    use crowd_core::{SimConfig, SimTime, Vec2};

    use crate::trajectory::{back_up_moves, reached_shelf_moves, rotate, MoveList, TimestampedPose};

    #[test]
    fn rotate_is_identity_when_aligned() {
        assert_eq!(rotate(1.0, 1.0, 0.02, 0.5), 1.0);
        // un-normalized input settles onto the normalized target
        assert_eq!(rotate(1.0 + TAU, 1.0, 0.02, 0.5), 1.0);
    }

    #[test]
    fn rotate_snaps_within_one_step() {
        // step = 0.01 rad, delta = 0.005: land exactly on the target
        assert_eq!(rotate(0.0, 0.005, 0.02, 0.5), 0.005);
    }

    #[test]
    fn rotate_takes_the_short_way_round() {
        // target just below 2π: the short way is clockwise through zero
        let next = rotate(0.1, TAU - 0.1, 0.02, 0.5);
        assert!((next - 0.09).abs() < 1e-12, "got {next}");
    }

    #[test]
    fn rotate_converges_within_the_step_bound() {
        let (dt, w) = (0.02, 0.5);
        let target = PI;
        let mut current = 0.0;
        let bound = (PI / (dt * w)).ceil() as usize;
        let mut steps = 0;
        while current != target {
            current = rotate(current, target, dt, w);
            steps += 1;
            assert!(steps <= bound, "no convergence after {steps} steps");
        }
    }

    #[test]
    fn move_list_samples_nearest_stamp() {
        let list = MoveList::new(vec![
            TimestampedPose { stamp: SimTime(1.0), position: Vec2::new(1.0, 0.0), heading: 0.0 },
            TimestampedPose { stamp: SimTime(2.0), position: Vec2::new(2.0, 0.0), heading: 0.0 },
        ]);
        assert_eq!(list.sample_at(SimTime(1.4)).unwrap().position.x, 1.0);
        assert_eq!(list.sample_at(SimTime(1.6)).unwrap().position.x, 2.0);
        // before the first and after the last stamp: clamp to the ends
        assert_eq!(list.sample_at(SimTime(0.0)).unwrap().position.x, 1.0);
        assert_eq!(list.sample_at(SimTime(9.0)).unwrap().position.x, 2.0);
    }

    #[test]
    fn move_list_completion() {
        let list = MoveList::new(vec![TimestampedPose {
            stamp: SimTime(1.0),
            position: Vec2::ZERO,
            heading: 0.0,
        }]);
        assert!(!list.completed(SimTime(0.5)));
        assert!(!list.completed(SimTime(1.0)));
        assert!(list.completed(SimTime(1.01)));

        let empty = MoveList::default();
        assert!(empty.completed(SimTime(0.0)));
        assert!(empty.sample_at(SimTime(0.0)).is_none());
    }

    #[test]
    fn reached_shelf_moves_rotate_then_pull_in() {
        let cfg = SimConfig::default();
        let moves = reached_shelf_moves(Vec2::ZERO, 0.0, FRAC_PI_2, SimTime(0.0), &cfg);
        assert!(!moves.is_empty());

        // stamps start one lead-in into the future and step uniformly
        assert!((moves[0].stamp.0 - cfg.maneuver_lead_in).abs() < 1e-12);
        for pair in moves.windows(2) {
            assert!((pair[1].stamp - pair[0].stamp - cfg.time_step).abs() < 1e-9);
        }

        // ends aligned with the shelf and roughly a travel distance away
        let last = moves.last().unwrap();
        let angular_error = (last.heading - FRAC_PI_2).abs();
        assert!(
            angular_error < cfg.maneuver_angular_tolerance + cfg.time_step * cfg.maneuver_angular_rate,
            "final heading off by {angular_error}"
        );
        assert!(last.position.length() > cfg.maneuver_travel_distance * 0.8);
    }

    #[test]
    fn back_up_moves_reverse_before_turning() {
        let cfg = SimConfig::default();
        let moves = back_up_moves(Vec2::ZERO, 0.0, Vec2::new(0.0, 5.0), SimTime(0.0), &cfg);
        // facing +x, so reversing means travelling toward -x
        assert!(moves.iter().any(|p| p.position.x < -0.8));
        // while reversing the heading stays forward
        assert!((moves[0].heading - 0.0).abs() < 1e-12);
    }

    #[test]
    fn degenerate_maneuver_produces_no_samples() {
        // travel distance below the position tolerance and already aligned:
        // nothing to rehearse, and generation must still terminate
        let cfg = SimConfig {
            maneuver_travel_distance: 0.05,
            ..SimConfig::default()
        };
        let moves = reached_shelf_moves(Vec2::ZERO, 1.0, 1.0, SimTime(0.0), &cfg);
        assert!(moves.is_empty());
        assert!(MoveList::new(moves).completed(SimTime(0.0)));
    }
}

#[cfg(test)]
mod destinations {
    use crowd_core::{AgentId, AgentKind, AgentRng, SimConfig, Vec2, WaypointId, WaypointMode};

    use crate::Agent;

    fn agent_with_destinations(n: u32) -> Agent {
        let cfg = SimConfig::default();
        let mut agent = Agent::new(AgentId(0), AgentKind::Ordinary, Vec2::ZERO, &cfg);
        for i in 0..n {
            agent.add_destination(WaypointId(i));
        }
        agent
    }

    #[test]
    fn sequential_mode_cycles_in_order() {
        let mut agent = agent_with_destinations(3);
        let mut rng = AgentRng::new(0, AgentId(0));

        let visited: Vec<_> = (0..4).map(|_| agent.update_destination(&mut rng)).collect();
        assert_eq!(
            visited,
            vec![
                Some(WaypointId(0)),
                Some(WaypointId(1)),
                Some(WaypointId(2)),
                Some(WaypointId(0)),
            ]
        );
    }

    #[test]
    fn random_mode_never_repeats_consecutively() {
        let mut agent = agent_with_destinations(2);
        agent.waypoint_mode = WaypointMode::Random;
        let mut rng = AgentRng::new(42, AgentId(0));

        let mut previous = agent.update_destination(&mut rng);
        for _ in 0..20 {
            let current = agent.update_destination(&mut rng);
            assert_ne!(current, previous);
            previous = current;
        }
    }

    #[test]
    fn single_destination_cycles_onto_itself() {
        let mut agent = agent_with_destinations(1);
        agent.waypoint_mode = WaypointMode::Random;
        let mut rng = AgentRng::new(0, AgentId(0));
        assert_eq!(agent.update_destination(&mut rng), Some(WaypointId(0)));
        assert_eq!(agent.update_destination(&mut rng), Some(WaypointId(0)));
    }

    #[test]
    fn remove_destination_keeps_cursors_valid() {
        let mut agent = agent_with_destinations(3);
        let mut rng = AgentRng::new(0, AgentId(0));
        agent.update_destination(&mut rng);
        agent.update_destination(&mut rng);
        agent.update_destination(&mut rng); // cursor at index 2

        assert!(agent.remove_destination(WaypointId(2)));
        assert!(agent.destination_index < agent.destinations.len());
        assert!(!agent.remove_destination(WaypointId(2)));
    }

    #[test]
    fn empty_list_keeps_current_destination() {
        let cfg = SimConfig::default();
        let mut agent = Agent::new(AgentId(0), AgentKind::Ordinary, Vec2::ZERO, &cfg);
        let mut rng = AgentRng::new(0, AgentId(0));
        assert_eq!(agent.update_destination(&mut rng), None);
    }
}

#[cfg(test)]
mod social {
    use std::f64::consts::TAU;

    use crowd_core::{AgentId, AgentKind, AgentRng, AgentState, SimClock, SimConfig, Vec2};
    use crowd_scene::{AgentSnapshot, Scene};

    use crate::Agent;

    fn scene_past_cooldown(cfg: &SimConfig) -> Scene {
        let mut scene = Scene::new(SimClock::new(cfg.time_step));
        let ticks = (cfg.trigger_cooldown / cfg.time_step).ceil() as u64 + 1;
        for _ in 0..ticks {
            scene.advance_clock();
        }
        scene
    }

    fn walking_snapshot(id: u32, position: Vec2) -> AgentSnapshot {
        let mut snap = AgentSnapshot::empty(AgentId(id), AgentKind::Ordinary, position);
        snap.state = AgentState::Walking;
        snap
    }

    #[test]
    fn start_talking_picks_a_nearby_listener() {
        let cfg = SimConfig {
            talking_probability: 1.0,
            ..SimConfig::default()
        };
        let mut scene = scene_past_cooldown(&cfg);
        scene.publish(vec![
            walking_snapshot(0, Vec2::ZERO),
            walking_snapshot(1, Vec2::new(1.0, 0.0)),
        ]);
        let mut agent = Agent::new(AgentId(0), AgentKind::Ordinary, Vec2::ZERO, &cfg);
        let mut rng = AgentRng::new(0, AgentId(0));

        assert!(agent.start_talking(&scene, &cfg, &mut rng));
        assert_eq!(agent.talking_to, Some(AgentId(1)));
    }

    #[test]
    fn zero_probability_never_triggers() {
        let cfg = SimConfig {
            talking_probability: 0.0,
            ..SimConfig::default()
        };
        let mut scene = scene_past_cooldown(&cfg);
        scene.publish(vec![
            walking_snapshot(0, Vec2::ZERO),
            walking_snapshot(1, Vec2::new(1.0, 0.0)),
        ]);
        let mut agent = Agent::new(AgentId(0), AgentKind::Ordinary, Vec2::ZERO, &cfg);
        let mut rng = AgentRng::new(0, AgentId(0));

        assert!(!agent.start_talking(&scene, &cfg, &mut rng));
        assert_eq!(agent.talking_to, None);
    }

    #[test]
    fn cooldown_blocks_immediate_reevaluation() {
        let cfg = SimConfig {
            switch_running_walking_probability: 1.0,
            ..SimConfig::default()
        };
        let scene = scene_past_cooldown(&cfg);
        let mut agent = Agent::new(AgentId(0), AgentKind::Ordinary, Vec2::ZERO, &cfg);
        let mut rng = AgentRng::new(0, AgentId(0));

        assert!(agent.switch_running_walking(scene.now(), &cfg, &mut rng));
        // same timestamp: the cooldown was just reset
        assert!(!agent.switch_running_walking(scene.now(), &cfg, &mut rng));
    }

    #[test]
    fn tell_story_needs_an_audience() {
        let cfg = SimConfig {
            tell_story_probability: 1.0,
            ..SimConfig::default()
        };
        let mut scene = scene_past_cooldown(&cfg);
        // only two neighbors: not enough
        scene.publish(vec![
            walking_snapshot(0, Vec2::ZERO),
            walking_snapshot(1, Vec2::new(0.5, 0.0)),
            walking_snapshot(2, Vec2::new(0.0, 0.5)),
        ]);
        let mut agent = Agent::new(AgentId(0), AgentKind::Ordinary, Vec2::ZERO, &cfg);
        let mut rng = AgentRng::new(0, AgentId(0));
        assert!(!agent.tell_story(&scene, &cfg, &mut rng));
    }

    #[test]
    fn tell_story_yields_to_a_running_story() {
        let cfg = SimConfig {
            tell_story_probability: 1.0,
            ..SimConfig::default()
        };
        let mut scene = scene_past_cooldown(&cfg);
        let mut teller = walking_snapshot(3, Vec2::new(0.0, -0.5));
        teller.state = AgentState::TellStory;
        scene.publish(vec![
            walking_snapshot(0, Vec2::ZERO),
            walking_snapshot(1, Vec2::new(0.5, 0.0)),
            walking_snapshot(2, Vec2::new(0.0, 0.5)),
            teller,
        ]);
        let mut agent = Agent::new(AgentId(0), AgentKind::Ordinary, Vec2::ZERO, &cfg);
        let mut rng = AgentRng::new(0, AgentId(0));
        assert!(!agent.tell_story(&scene, &cfg, &mut rng));
    }

    #[test]
    fn listener_adopts_a_story_teller() {
        let cfg = SimConfig::default();
        let mut scene = scene_past_cooldown(&cfg);
        let mut teller = walking_snapshot(1, Vec2::new(1.0, 0.0));
        teller.state = AgentState::TellStory;
        scene.publish(vec![walking_snapshot(0, Vec2::ZERO), teller]);

        let mut agent = Agent::new(AgentId(0), AgentKind::Ordinary, Vec2::ZERO, &cfg);
        assert!(agent.someone_talking_to_me(&scene, &cfg));
        assert_eq!(agent.listening_to, Some(AgentId(1)));
        assert_eq!(agent.keep_distance_to, Some(Vec2::new(1.0, 0.0)));
    }

    #[test]
    fn one_to_one_talk_only_recruits_its_addressee() {
        let cfg = SimConfig::default();
        let mut scene = scene_past_cooldown(&cfg);
        let mut talker = walking_snapshot(1, Vec2::new(1.0, 0.0));
        talker.state = AgentState::Talking;
        talker.talking_to = Some(AgentId(2)); // someone else
        scene.publish(vec![walking_snapshot(0, Vec2::ZERO), talker]);

        let mut agent = Agent::new(AgentId(0), AgentKind::Ordinary, Vec2::ZERO, &cfg);
        assert!(!agent.someone_talking_to_me(&scene, &cfg));
    }

    #[test]
    fn keep_distance_grows_with_the_audience() {
        let cfg = SimConfig::default();
        let mut scene = scene_past_cooldown(&cfg);

        let mut snapshots = vec![walking_snapshot(0, Vec2::ZERO)];
        for i in 1..=8 {
            let mut s = walking_snapshot(i, Vec2::new(i as f64 * 0.1, 0.0));
            s.state = AgentState::Listening;
            s.listening_to = Some(AgentId(0));
            snapshots.push(s);
        }
        scene.publish(snapshots);

        let mut host = Agent::new(AgentId(0), AgentKind::Ordinary, Vec2::ZERO, &cfg);
        let mut rng = AgentRng::new(0, AgentId(0));
        host.activate_state(AgentState::GroupTalking, &mut scene, &cfg, &mut rng);
        host.adjust_keep_distance(&scene, &cfg);

        let expected = 8.0 * cfg.listener_spacing / TAU;
        assert!((host.keep_distance - expected).abs() < 1e-9, "got {}", host.keep_distance);
    }

    #[test]
    fn keep_distance_is_floored_for_tiny_audiences() {
        let cfg = SimConfig::default();
        let mut scene = scene_past_cooldown(&cfg);
        let mut listener = walking_snapshot(1, Vec2::new(0.5, 0.0));
        listener.state = AgentState::Listening;
        listener.listening_to = Some(AgentId(0));
        scene.publish(vec![walking_snapshot(0, Vec2::ZERO), listener]);

        let mut host = Agent::new(AgentId(0), AgentKind::Ordinary, Vec2::ZERO, &cfg);
        let mut rng = AgentRng::new(0, AgentId(0));
        host.activate_state(AgentState::GroupTalking, &mut scene, &cfg, &mut rng);
        host.adjust_keep_distance(&scene, &cfg);

        // one listener wants ~0.24 m; the floor holds it at the minimum
        assert_eq!(host.keep_distance, cfg.min_keep_distance);
    }

    #[test]
    fn service_robot_detection_remembers_the_robot() {
        let cfg = SimConfig::default();
        let mut scene = scene_past_cooldown(&cfg);
        let robot = AgentSnapshot::empty(AgentId(1), AgentKind::ServiceRobot, Vec2::new(0.5, 0.0));
        scene.publish(vec![walking_snapshot(0, Vec2::ZERO), robot]);

        let mut agent = Agent::new(AgentId(0), AgentKind::Ordinary, Vec2::ZERO, &cfg);
        assert!(agent.service_robot_is_near(&scene, &cfg));
        assert_eq!(agent.current_service_robot, Some(AgentId(1)));
    }

    #[test]
    fn service_request_registers_a_dynamic_waypoint() {
        let cfg = SimConfig::default();
        let mut scene = scene_past_cooldown(&cfg);
        let mut requester = walking_snapshot(1, Vec2::new(4.0, 0.0));
        requester.state = AgentState::RequestingService;
        scene.publish(vec![
            AgentSnapshot::empty(AgentId(0), AgentKind::ServiceRobot, Vec2::ZERO),
            requester,
        ]);

        let mut robot = Agent::new(AgentId(0), AgentKind::ServiceRobot, Vec2::ZERO, &cfg);
        assert!(robot.someone_is_requesting_service(&mut scene, &cfg));
        assert_eq!(robot.servicing_agent, Some(AgentId(1)));

        let waypoint = robot.servicing_waypoint.expect("waypoint registered");
        let w = scene.waypoint(waypoint).expect("resolvable");
        assert_eq!(w.name, "service_destination");
        assert_eq!(w.position, Vec2::new(4.0, 0.0));
    }
}

#[cfg(test)]
mod machine {
    use std::f64::consts::FRAC_PI_2;

    use crowd_core::{AgentId, AgentKind, AgentRng, AgentState, SimClock, SimConfig, Vec2};
    use crowd_scene::{AgentSnapshot, Scene, Waypoint, WaypointType};

    use crate::{Agent, AreaPlanner};

    fn advance(scene: &mut Scene, secs: f64, cfg: &SimConfig) {
        let ticks = (secs / cfg.time_step).ceil() as u64;
        for _ in 0..ticks {
            scene.advance_clock();
        }
    }

    fn quiet_config() -> SimConfig {
        // all probabilistic triggers off so tests drive transitions directly
        SimConfig {
            tell_story_probability: 0.0,
            group_talking_probability: 0.0,
            talking_probability: 0.0,
            talking_and_walking_probability: 0.0,
            switch_running_walking_probability: 0.0,
            requesting_service_probability: 0.0,
            group_attraction_probability: 0.0,
            ..SimConfig::default()
        }
    }

    fn setup(kind: AgentKind, cfg: &SimConfig) -> (Scene, Agent, AgentRng) {
        let mut scene = Scene::new(SimClock::new(cfg.time_step));
        let far = scene.add_waypoint(Waypoint::area("far", Vec2::new(100.0, 0.0), 1.0));
        let mut agent = Agent::new(AgentId(0), kind, Vec2::ZERO, cfg);
        agent.add_destination(far);
        agent.planner = Some(Box::new(AreaPlanner::new()));
        let rng = AgentRng::new(0, AgentId(0));
        scene.publish(vec![agent.snapshot()]);
        (scene, agent, rng)
    }

    #[test]
    fn initial_state_follows_the_kind() {
        let cfg = quiet_config();
        for (kind, expected) in [
            (AgentKind::Ordinary, AgentState::Walking),
            (AgentKind::Elder, AgentState::Walking),
            (AgentKind::Vehicle, AgentState::Driving),
            (AgentKind::ServiceRobot, AgentState::Driving),
        ] {
            let (mut scene, mut agent, mut rng) = setup(kind, &cfg);
            let change = agent.do_state_transition(&mut scene, &cfg, &mut rng);
            assert_eq!(change, Some((AgentState::None, expected)), "kind {kind}");
        }
    }

    #[test]
    fn agents_without_destinations_wait() {
        let cfg = quiet_config();
        let mut scene = Scene::new(SimClock::new(cfg.time_step));
        let mut agent = Agent::new(AgentId(0), AgentKind::Ordinary, Vec2::ZERO, &cfg);
        let mut rng = AgentRng::new(0, AgentId(0));

        let change = agent.do_state_transition(&mut scene, &cfg, &mut rng);
        assert_eq!(change, Some((AgentState::None, AgentState::Waiting)));
        // still no destination: stays put
        assert_eq!(agent.do_state_transition(&mut scene, &cfg, &mut rng), None);
    }

    #[test]
    fn running_boosts_and_restores_the_speed_cap() {
        let cfg = SimConfig {
            switch_running_walking_probability: 1.0,
            ..quiet_config()
        };
        let (mut scene, mut agent, mut rng) = setup(AgentKind::Ordinary, &cfg);
        agent.do_state_transition(&mut scene, &cfg, &mut rng); // None -> Walking

        advance(&mut scene, cfg.trigger_cooldown + 0.1, &cfg);
        let change = agent.do_state_transition(&mut scene, &cfg, &mut rng);
        assert_eq!(change, Some((AgentState::Walking, AgentState::Running)));
        assert_eq!(agent.vmax, cfg.vmax_default * cfg.running_vmax_factor);

        advance(&mut scene, cfg.trigger_cooldown + 0.1, &cfg);
        let change = agent.do_state_transition(&mut scene, &cfg, &mut rng);
        assert_eq!(change, Some((AgentState::Running, AgentState::Walking)));
        assert_eq!(agent.vmax, cfg.vmax_default);
    }

    #[test]
    fn talking_expires_back_to_the_normal_state() {
        let cfg = quiet_config();
        let (mut scene, mut agent, mut rng) = setup(AgentKind::Ordinary, &cfg);
        agent.do_state_transition(&mut scene, &cfg, &mut rng); // None -> Walking
        agent.talking_to = Some(AgentId(7));
        agent.activate_state(AgentState::Talking, &mut scene, &cfg, &mut rng);

        // duration is randomized in [0.5, 1.5) x base; past 1.5x it must end
        advance(&mut scene, cfg.talking_base_time * 1.5 + 0.1, &cfg);
        let change = agent.do_state_transition(&mut scene, &cfg, &mut rng);
        assert_eq!(change, Some((AgentState::Talking, AgentState::Walking)));
        assert_eq!(agent.talking_to, None, "partner cleared on exit");
    }

    #[test]
    fn group_talking_host_holds_the_listener_circle() {
        use crowd_force::model::{DESIRED, KEEP_DISTANCE};

        let cfg = quiet_config();
        let (mut scene, mut agent, mut rng) = setup(AgentKind::Ordinary, &cfg);
        agent.do_state_transition(&mut scene, &cfg, &mut rng); // None -> Walking
        agent.keep_distance_to = Some(agent.position);
        agent.activate_state(AgentState::GroupTalking, &mut scene, &cfg, &mut rng);

        // the host spaces itself by the same spring its listeners use
        assert!(!agent.forces.is_disabled(KEEP_DISTANCE));
        assert!(agent.forces.is_disabled(DESIRED), "goal seeking is off while hosting");

        advance(&mut scene, cfg.group_talking_base_time * 1.5 + 0.1, &cfg);
        let change = agent.do_state_transition(&mut scene, &cfg, &mut rng);
        assert_eq!(change, Some((AgentState::GroupTalking, AgentState::Walking)));
        assert!(
            agent.forces.is_disabled(KEEP_DISTANCE),
            "normal locomotion turns the spring back off"
        );
    }

    #[test]
    fn listener_stays_while_the_story_lasts() {
        let cfg = quiet_config();
        let (mut scene, mut agent, mut rng) = setup(AgentKind::Ordinary, &cfg);
        agent.do_state_transition(&mut scene, &cfg, &mut rng); // None -> Walking

        let mut teller = AgentSnapshot::empty(AgentId(1), AgentKind::Ordinary, Vec2::new(1.0, 0.0));
        teller.state = AgentState::TellStory;
        scene.publish(vec![agent.snapshot(), teller.clone()]);

        let change = agent.do_state_transition(&mut scene, &cfg, &mut rng);
        assert_eq!(change, Some((AgentState::Walking, AgentState::Listening)));

        // story still running: no transition
        assert_eq!(agent.do_state_transition(&mut scene, &cfg, &mut rng), None);

        // teller finishes: listener returns to its normal state
        teller.state = AgentState::Walking;
        scene.publish(vec![agent.snapshot(), teller]);
        let change = agent.do_state_transition(&mut scene, &cfg, &mut rng);
        assert_eq!(change, Some((AgentState::Listening, AgentState::Walking)));
        assert_eq!(agent.listening_to, None);
        assert_eq!(agent.keep_distance_to, None);
    }

    #[test]
    fn walking_partner_recruits_into_listening_and_walking() {
        let cfg = quiet_config();
        let (mut scene, mut agent, mut rng) = setup(AgentKind::Ordinary, &cfg);
        agent.do_state_transition(&mut scene, &cfg, &mut rng); // None -> Walking

        let mut talker = AgentSnapshot::empty(AgentId(1), AgentKind::Ordinary, Vec2::new(1.0, 0.0));
        talker.state = AgentState::TalkingAndWalking;
        talker.talking_to = Some(AgentId(0));
        scene.publish(vec![agent.snapshot(), talker]);

        let change = agent.do_state_transition(&mut scene, &cfg, &mut rng);
        assert_eq!(
            change,
            Some((AgentState::Walking, AgentState::ListeningAndWalking))
        );
    }

    #[test]
    fn forklift_services_a_shelf_end_to_end() {
        let cfg = quiet_config();
        let mut scene = Scene::new(SimClock::new(cfg.time_step));
        let shelf = scene.add_waypoint(
            Waypoint::area("shelf-a", Vec2::new(0.5, 0.0), 2.0)
                .with_type(WaypointType::Shelf)
                .with_obstacle_angle(FRAC_PI_2),
        );
        let dock = scene.add_waypoint(Waypoint::area("dock", Vec2::new(10.0, 0.0), 1.0));

        let mut lift = Agent::new(AgentId(0), AgentKind::Vehicle, Vec2::ZERO, &cfg);
        lift.add_destination(dock);
        lift.planner = Some(Box::new(AreaPlanner::new()));
        let mut rng = AgentRng::new(0, AgentId(0));
        scene.publish(vec![lift.snapshot()]);

        lift.do_state_transition(&mut scene, &cfg, &mut rng); // None -> Driving
        let change = lift.do_state_transition(&mut scene, &cfg, &mut rng);
        assert_eq!(
            change,
            Some((AgentState::Driving, AgentState::DrivingToInteraction))
        );
        assert_eq!(lift.last_interacted_waypoint, Some(shelf));

        // already within pull-in range of the shelf
        let change = lift.do_state_transition(&mut scene, &cfg, &mut rng);
        assert_eq!(
            change,
            Some((AgentState::DrivingToInteraction, AgentState::ReachedShelf))
        );
        assert!(lift.move_list.as_ref().is_some_and(|m| !m.is_empty()));

        // rotation + pull-in takes a bounded, known amount of simulated time
        advance(&mut scene, 10.0, &cfg);
        let change = lift.do_state_transition(&mut scene, &cfg, &mut rng);
        assert_eq!(change, Some((AgentState::ReachedShelf, AgentState::LiftingForks)));
        assert!(lift.move_list.is_none(), "move list cleared on exit");

        advance(&mut scene, cfg.lifting_forks_base_time * 1.5 + 0.1, &cfg);
        assert_eq!(
            lift.do_state_transition(&mut scene, &cfg, &mut rng),
            Some((AgentState::LiftingForks, AgentState::Loading))
        );
        advance(&mut scene, cfg.loading_base_time * 1.5 + 0.1, &cfg);
        assert_eq!(
            lift.do_state_transition(&mut scene, &cfg, &mut rng),
            Some((AgentState::Loading, AgentState::LoweringForks))
        );
        advance(&mut scene, cfg.lowering_forks_base_time * 1.5 + 0.1, &cfg);
        assert_eq!(
            lift.do_state_transition(&mut scene, &cfg, &mut rng),
            Some((AgentState::LoweringForks, AgentState::BackUp))
        );
        assert!(lift.move_list.as_ref().is_some_and(|m| !m.is_empty()));

        advance(&mut scene, 15.0, &cfg);
        assert_eq!(
            lift.do_state_transition(&mut scene, &cfg, &mut rng),
            Some((AgentState::BackUp, AgentState::Driving))
        );

        // the just-serviced shelf is skipped, so the forklift keeps driving
        assert_eq!(lift.do_state_transition(&mut scene, &cfg, &mut rng), None);
        assert_eq!(lift.machine.state(), AgentState::Driving);
    }

    #[test]
    fn service_request_flow_times_out_without_a_robot() {
        let cfg = SimConfig {
            requesting_service_probability: 1.0,
            ..quiet_config()
        };
        let (mut scene, mut agent, mut rng) = setup(AgentKind::Ordinary, &cfg);
        agent.do_state_transition(&mut scene, &cfg, &mut rng); // None -> Walking

        advance(&mut scene, cfg.trigger_cooldown + 0.1, &cfg);
        let change = agent.do_state_transition(&mut scene, &cfg, &mut rng);
        assert_eq!(
            change,
            Some((AgentState::Walking, AgentState::RequestingService))
        );

        advance(&mut scene, cfg.requesting_service_base_time * 1.5 + 0.1, &cfg);
        let change = agent.do_state_transition(&mut scene, &cfg, &mut rng);
        assert_eq!(
            change,
            Some((AgentState::RequestingService, AgentState::Walking))
        );
    }

    #[test]
    fn driving_agents_never_request_service() {
        let cfg = SimConfig {
            requesting_service_probability: 1.0,
            ..quiet_config()
        };
        let (mut scene, mut agent, mut rng) = setup(AgentKind::ServiceRobot, &cfg);
        agent.do_state_transition(&mut scene, &cfg, &mut rng); // None -> Driving
        advance(&mut scene, cfg.trigger_cooldown + 0.1, &cfg);
        assert_eq!(agent.do_state_transition(&mut scene, &cfg, &mut rng), None);
        assert_eq!(agent.machine.state(), AgentState::Driving);
    }

    #[test]
    fn requester_is_served_when_a_robot_arrives() {
        let cfg = quiet_config();
        let (mut scene, mut agent, mut rng) = setup(AgentKind::Ordinary, &cfg);
        agent.do_state_transition(&mut scene, &cfg, &mut rng); // None -> Walking
        agent.activate_state(AgentState::RequestingService, &mut scene, &cfg, &mut rng);

        let robot =
            AgentSnapshot::empty(AgentId(1), AgentKind::ServiceRobot, Vec2::new(0.5, 0.0));
        scene.publish(vec![agent.snapshot(), robot]);

        let change = agent.do_state_transition(&mut scene, &cfg, &mut rng);
        assert_eq!(
            change,
            Some((AgentState::RequestingService, AgentState::ReceivingService))
        );
        assert_eq!(agent.current_service_robot, Some(AgentId(1)));

        advance(&mut scene, cfg.receiving_service_base_time * 1.5 + 0.1, &cfg);
        let change = agent.do_state_transition(&mut scene, &cfg, &mut rng);
        assert_eq!(
            change,
            Some((AgentState::ReceivingService, AgentState::Walking))
        );
        assert_eq!(agent.current_service_robot, None);
    }

    #[test]
    fn group_attraction_diverts_and_releases_the_group() {
        let cfg = SimConfig {
            group_attraction_probability: 1.0,
            ..quiet_config()
        };
        let mut scene = Scene::new(SimClock::new(cfg.time_step));
        let attraction = scene.add_waypoint(
            Waypoint::area("window", Vec2::new(0.5, 0.0), 3.0).with_type(WaypointType::Attraction),
        );
        let group = scene.add_group(vec![AgentId(0)]);

        let mut agent = Agent::new(AgentId(0), AgentKind::Ordinary, Vec2::ZERO, &cfg);
        agent.group = Some(group);
        let mut rng = AgentRng::new(0, AgentId(0));
        scene.publish(vec![agent.snapshot()]);
        agent.activate_state(AgentState::GroupWalking, &mut scene, &cfg, &mut rng);

        advance(&mut scene, cfg.trigger_cooldown + 0.1, &cfg);
        let change = agent.do_state_transition(&mut scene, &cfg, &mut rng);
        assert_eq!(change, Some((AgentState::GroupWalking, AgentState::Shopping)));
        assert_eq!(scene.group(group).unwrap().attraction, Some(attraction));
        assert_eq!(agent.current_destination, Some(attraction));

        // with probability 1.0 the next evaluation drops the attraction
        advance(&mut scene, cfg.trigger_cooldown + 0.1, &cfg);
        let change = agent.do_state_transition(&mut scene, &cfg, &mut rng);
        assert_eq!(change, Some((AgentState::Shopping, AgentState::GroupWalking)));
        assert_eq!(scene.group(group).unwrap().attraction, None);
    }
}

#[cfg(test)]
mod motion {
    use crowd_core::{AgentId, AgentKind, AgentRng, AgentState, RobotMode, SimClock, SimConfig, Vec2};
    use crowd_scene::{AgentSnapshot, Scene, Waypoint};

    use crate::{Agent, AreaPlanner};

    fn walking_agent(cfg: &SimConfig) -> (Scene, Agent, AgentRng) {
        let mut scene = Scene::new(SimClock::new(cfg.time_step));
        let goal = scene.add_waypoint(Waypoint::area("goal", Vec2::new(50.0, 0.0), 1.0));
        let mut agent = Agent::new(AgentId(0), AgentKind::Ordinary, Vec2::ZERO, cfg);
        agent.add_destination(goal);
        agent.planner = Some(Box::new(AreaPlanner::new()));
        let mut rng = AgentRng::new(0, AgentId(0));
        scene.publish(vec![agent.snapshot()]);
        agent.do_state_transition(&mut scene, cfg, &mut rng); // None -> Walking
        agent.update_destination(&mut rng);
        (scene, agent, rng)
    }

    #[test]
    fn integration_caps_speed_and_faces_the_velocity() {
        let cfg = SimConfig::default();
        let (scene, mut agent, _rng) = walking_agent(&cfg);

        for _ in 0..500 {
            agent.compute_forces(&scene, &cfg);
            agent.tick_movement(&scene, &cfg);
        }
        assert!(agent.velocity.length() <= agent.vmax + 1e-9);
        assert!(agent.position.x > 0.0, "moved toward the goal");
        assert!(agent.heading.abs() < 1e-6 || (agent.heading - std::f64::consts::TAU).abs() < 1e-6);
    }

    #[test]
    fn elder_caps_are_reapplied_every_tick() {
        let cfg = SimConfig::default();
        let mut scene = Scene::new(SimClock::new(cfg.time_step));
        scene.publish(Vec::new());
        let mut elder = Agent::new(AgentId(0), AgentKind::Elder, Vec2::ZERO, &cfg);

        elder.vmax = 99.0; // whatever a state hook did
        elder.tick_movement(&scene, &cfg);
        assert_eq!(elder.vmax, cfg.elder_vmax);
        assert_eq!(elder.forces.factor_desired, cfg.elder_force_factor_desired);
    }

    #[test]
    fn listening_and_walking_keeps_station_beside_the_partner() {
        let cfg = SimConfig::default();
        let mut scene = Scene::new(SimClock::new(cfg.time_step));
        let mut partner =
            AgentSnapshot::empty(AgentId(1), AgentKind::Ordinary, Vec2::new(3.0, 0.0));
        partner.velocity = Vec2::new(1.0, 0.0);
        partner.state = AgentState::TalkingAndWalking;
        partner.talking_to = Some(AgentId(0));

        let mut agent = Agent::new(AgentId(0), AgentKind::Ordinary, Vec2::ZERO, &cfg);
        let mut rng = AgentRng::new(0, AgentId(0));
        scene.publish(vec![agent.snapshot(), partner]);
        agent.listening_to = Some(AgentId(1));
        agent.activate_state(AgentState::ListeningAndWalking, &mut scene, &cfg, &mut rng);

        agent.tick_movement(&scene, &cfg);
        // half a metre to the partner's left, moving with it
        let expected = Vec2::new(3.0, cfg.keep_distance_default);
        assert!((agent.position - expected).length() < 1e-9, "got {}", agent.position);
        assert_eq!(agent.velocity, Vec2::new(1.0, 0.0));
    }

    #[test]
    fn teleoperated_robot_ignores_forces_but_keeps_its_velocity() {
        let cfg = SimConfig {
            robot_mode: RobotMode::Teleoperation,
            ..SimConfig::default()
        };
        let mut scene = Scene::new(SimClock::new(cfg.time_step));
        scene.publish(Vec::new());
        let mut robot = Agent::new(AgentId(0), AgentKind::Robot, Vec2::ZERO, &cfg);
        robot.velocity = Vec2::new(2.0, 0.0);

        robot.compute_forces(&scene, &cfg);
        let braking = robot.last_report.total;
        robot.tick_movement(&scene, &cfg);

        // integration ran against a zeroed velocity, so only the force's own
        // a·dt² contribution reaches the pose
        let expected = braking * cfg.time_step * cfg.time_step;
        assert!(
            (robot.position - expected).length() < 1e-12,
            "got {}, expected {expected}",
            robot.position
        );
        assert_eq!(robot.velocity, Vec2::new(2.0, 0.0), "reported velocity survives");
        assert_eq!(robot.heading, 0.0, "heading is part of the external pose");
    }

    #[test]
    fn controlled_robot_waits_for_its_release_time() {
        let cfg = SimConfig {
            robot_mode: RobotMode::Controlled,
            robot_wait_time: 1.0,
            ..SimConfig::default()
        };
        let mut scene = Scene::new(SimClock::new(cfg.time_step));
        let goal = scene.add_waypoint(Waypoint::area("goal", Vec2::new(50.0, 0.0), 1.0));
        scene.publish(Vec::new());
        let mut robot = Agent::new(AgentId(0), AgentKind::Robot, Vec2::ZERO, &cfg);
        robot.current_destination = Some(goal);

        robot.compute_forces(&scene, &cfg);
        robot.tick_movement(&scene, &cfg);
        assert_eq!(robot.position, Vec2::ZERO, "still held");

        // release time reached
        let ticks = (cfg.robot_wait_time / cfg.time_step).ceil() as u64;
        for _ in 0..ticks {
            scene.advance_clock();
        }
        robot.compute_forces(&scene, &cfg);
        robot.tick_movement(&scene, &cfg);
        assert!(robot.position.x > 0.0, "moving after release");
    }

    #[test]
    fn social_drive_retunes_the_force_model() {
        let cfg = SimConfig {
            robot_mode: RobotMode::SocialDrive,
            ..SimConfig::default()
        };
        let mut scene = Scene::new(SimClock::new(cfg.time_step));
        scene.publish(Vec::new());
        let mut robot = Agent::new(AgentId(0), AgentKind::Robot, Vec2::ZERO, &cfg);

        robot.compute_forces(&scene, &cfg);
        robot.tick_movement(&scene, &cfg);
        assert_eq!(robot.vmax, cfg.social_drive_vmax);
        assert_eq!(robot.forces.factor_desired, cfg.social_drive_force_factor_desired);
        assert_eq!(robot.forces.factor_obstacle, cfg.social_drive_force_factor_obstacle);
    }
}
