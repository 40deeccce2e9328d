//! Simulation observer trait for progress reporting and data collection.

use crowd_core::{AgentId, AgentState, Tick};
use crowd_scene::Scene;

/// Callbacks invoked by [`Sim::run`][crate::Sim::run] at key points in the
/// tick loop.
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.
///
/// # Example — state-change printer
///
/// ```rust,ignore
/// struct StatePrinter;
///
/// impl SimObserver for StatePrinter {
///     fn on_state_change(&mut self, tick: Tick, agent: AgentId, from: AgentState, to: AgentState) {
///         println!("{tick}: agent {agent} {from} -> {to}");
///     }
/// }
/// ```
pub trait SimObserver {
    /// Called at the very start of each tick, before any processing.
    fn on_tick_start(&mut self, _tick: Tick) {}

    /// Called for every state-machine transition, in agent-id order.
    fn on_state_change(
        &mut self,
        _tick:  Tick,
        _agent: AgentId,
        _from:  AgentState,
        _to:    AgentState,
    ) {
    }

    /// Called at the end of each tick, after the fresh snapshots have been
    /// published.  The scene gives read-only access to every agent's
    /// position, velocity, and state.
    fn on_tick_end(&mut self, _tick: Tick, _scene: &Scene) {}

    /// Called once after the final tick completes.
    fn on_sim_end(&mut self, _final_tick: Tick) {}
}

/// A [`SimObserver`] that does nothing.  Use when you need to call `run` but
/// don't want progress callbacks.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
