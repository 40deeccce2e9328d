//! The `Sim` struct and its tick loop.

use crowd_agent::Agent;
use crowd_core::{AgentRng, SimConfig, Tick};
use crowd_scene::Scene;

use crate::SimObserver;

/// The main simulation runner.
///
/// `Sim` holds all simulation state and drives the three-phase tick loop:
///
/// 1. **Transitions**: run each agent's state-machine guard pass, in
///    ascending `AgentId` order.  Guards read neighbors exclusively through
///    the snapshots published at the end of the *previous* tick, so the
///    iteration order cannot leak into any agent's decision.
/// 2. **Movement**: recompute each agent's forces, then integrate (or replay
///    a canned maneuver, or rigid-follow a partner).
/// 3. **Publish**: rebuild the snapshot buffer from the live agents and swap
///    it into the scene, then advance the clock.
///
/// Create via [`SimBuilder`][crate::SimBuilder].
pub struct Sim {
    /// Global configuration (time step, seed, probabilities, …).
    pub config: SimConfig,

    /// The shared environment: waypoints, obstacles, groups, clock, and the
    /// published agent snapshots.
    pub scene: Scene,

    /// The live agents, indexed by `AgentId`.
    pub agents: Vec<Agent>,

    /// Per-agent deterministic RNGs, kept in a parallel vec so the borrow
    /// checker sees them as disjoint from the agents.
    pub(crate) rngs: Vec<AgentRng>,
}

impl Sim {
    // ── Public API ────────────────────────────────────────────────────────

    /// Run `ticks` ticks from the current position.
    ///
    /// Calls observer hooks at every tick boundary.  Use
    /// [`NoopObserver`][crate::NoopObserver] if you don't need callbacks.
    pub fn run<O: SimObserver>(&mut self, ticks: u64, observer: &mut O) {
        for _ in 0..ticks {
            self.step(observer);
        }
        observer.on_sim_end(self.scene.clock().current_tick);
    }

    /// Process exactly one tick.
    pub fn step<O: SimObserver>(&mut self, observer: &mut O) {
        let tick = self.scene.clock().current_tick;
        observer.on_tick_start(tick);

        // ── Phase 1: state transitions (ascending AgentId) ────────────────
        for (agent, rng) in self.agents.iter_mut().zip(self.rngs.iter_mut()) {
            if let Some((from, to)) = agent.do_state_transition(&mut self.scene, &self.config, rng)
            {
                observer.on_state_change(tick, agent.id, from, to);
            }
        }

        // ── Phase 2: forces and movement ──────────────────────────────────
        //
        // Forces are computed against the previous tick's snapshots, so the
        // whole phase reads a consistent view no matter the agent order.
        for agent in &mut self.agents {
            agent.compute_forces(&self.scene, &self.config);
            agent.tick_movement(&self.scene, &self.config);
        }

        // ── Phase 3: publish and advance ──────────────────────────────────
        let snapshots = self.agents.iter().map(Agent::snapshot).collect();
        self.scene.publish(snapshots);

        observer.on_tick_end(tick, &self.scene);
        self.scene.advance_clock();
    }

    // ── Introspection ─────────────────────────────────────────────────────

    #[inline]
    pub fn current_tick(&self) -> Tick {
        self.scene.clock().current_tick
    }

    #[inline]
    pub fn agent(&self, index: usize) -> Option<&Agent> {
        self.agents.get(index)
    }
}
