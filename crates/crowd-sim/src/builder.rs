//! Builder for assembling a [`Sim`].

use crowd_agent::{Agent, AreaPlanner};
use crowd_core::{AgentId, AgentKind, AgentRng, GroupId, SimClock, SimConfig, Vec2, WaypointId};
use crowd_scene::{Obstacle, Scene, Waypoint};

use crate::{Sim, SimError, SimResult};

/// Builder for [`Sim`].
///
/// Waypoints and obstacles are registered first (the scene numbers them),
/// then agents referencing those waypoints, then groups over those agents.
/// [`build`][Self::build] validates the cross-references, seeds one
/// deterministic RNG per agent from `config.seed`, attaches the default
/// [`AreaPlanner`] to every agent, and publishes the initial snapshots so
/// the very first tick already sees every neighbor.
///
/// # Example
///
/// ```rust,ignore
/// let mut builder = SimBuilder::new(SimConfig::default());
/// let a = builder.add_waypoint(Waypoint::area("a", Vec2::new(0.0, 0.0), 2.0));
/// let b = builder.add_waypoint(Waypoint::area("b", Vec2::new(20.0, 0.0), 2.0));
/// builder.add_agent(AgentKind::Ordinary, Vec2::new(1.0, 1.0), vec![a, b]);
/// let mut sim = builder.build()?;
/// sim.run(10_000, &mut NoopObserver);
/// ```
pub struct SimBuilder {
    config: SimConfig,
    scene:  Scene,
    agents: Vec<Agent>,
    groups: Vec<Vec<AgentId>>,
}

impl SimBuilder {
    pub fn new(config: SimConfig) -> Self {
        let scene = Scene::new(SimClock::new(config.time_step));
        Self {
            config,
            scene,
            agents: Vec::new(),
            groups: Vec::new(),
        }
    }

    // ── Environment ───────────────────────────────────────────────────────

    /// Register a waypoint; the returned id is what agents reference.
    pub fn add_waypoint(&mut self, waypoint: Waypoint) -> WaypointId {
        self.scene.add_waypoint(waypoint)
    }

    pub fn add_obstacle(&mut self, obstacle: Obstacle) -> &mut Self {
        self.scene.add_obstacle(obstacle);
        self
    }

    // ── Population ────────────────────────────────────────────────────────

    /// Add an agent with a destination cycling list.  Ids are assigned in
    /// insertion order.
    pub fn add_agent(
        &mut self,
        kind: AgentKind,
        position: Vec2,
        destinations: Vec<WaypointId>,
    ) -> AgentId {
        let id = AgentId(self.agents.len() as u32);
        let mut agent = Agent::new(id, kind, position, &self.config);
        for waypoint in destinations {
            agent.add_destination(waypoint);
        }
        self.agents.push(agent);
        id
    }

    /// Mutable access to an already-added agent, for per-agent tweaks
    /// (waypoint mode, name, heading, …) before [`build`][Self::build].
    pub fn agent_mut(&mut self, id: AgentId) -> Option<&mut Agent> {
        self.agents.get_mut(id.index())
    }

    /// Declare a walking group.  Membership is validated at build time.
    pub fn add_group(&mut self, members: Vec<AgentId>) -> &mut Self {
        self.groups.push(members);
        self
    }

    // ── Assembly ──────────────────────────────────────────────────────────

    /// Validate the configuration and all cross-references, then assemble a
    /// ready-to-run [`Sim`].
    pub fn build(mut self) -> SimResult<Sim> {
        self.config.validate()?;

        for agent in &self.agents {
            for &waypoint in &agent.destinations {
                if self.scene.waypoint(waypoint).is_none() {
                    return Err(SimError::UnknownWaypoint(waypoint));
                }
            }
        }

        for members in self.groups.drain(..) {
            for &member in &members {
                if member.index() >= self.agents.len() {
                    return Err(SimError::UnknownAgent(member));
                }
            }
            let group: GroupId = self.scene.add_group(members.clone());
            for member in members {
                self.agents[member.index()].group = Some(group);
            }
        }

        let mut rngs: Vec<AgentRng> = self
            .agents
            .iter()
            .map(|a| AgentRng::new(self.config.seed, a.id))
            .collect();

        for (agent, rng) in self.agents.iter_mut().zip(rngs.iter_mut()) {
            agent.planner = Some(Box::new(AreaPlanner::new()));
            if !agent.destinations.is_empty() {
                agent.update_destination(rng);
            }
        }

        // publish once so tick 0 already sees every neighbor
        let snapshots = self.agents.iter().map(Agent::snapshot).collect();
        self.scene.publish(snapshots);

        tracing::info!(
            agents = self.agents.len(),
            seed = self.config.seed,
            "simulation assembled"
        );

        Ok(Sim {
            config: self.config,
            scene:  self.scene,
            agents: self.agents,
            rngs,
        })
    }
}
