//! The tick-stable published view of one agent.
//!
//! Neighbor queries, listener resolution, and group-spacing math must all
//! see the state of other agents *as of the start of the current tick*.
//! `AgentSnapshot` is that view: rebuilt from the live agents once per tick
//! by the runner and swapped into the scene via
//! [`Scene::publish`][crate::Scene::publish].

use crowd_core::{AgentId, AgentKind, AgentState, GroupId, Vec2};

/// Immutable per-tick view of one agent, readable by every other agent.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AgentSnapshot {
    pub id: AgentId,
    pub kind: AgentKind,
    pub position: Vec2,
    pub velocity: Vec2,
    pub state: AgentState,
    /// Partner this agent is talking to, if any.  Resolve via
    /// [`Scene::agent_by_id`][crate::Scene::agent_by_id] at point of use.
    pub talking_to: Option<AgentId>,
    /// Agent this one is listening to, if any.
    pub listening_to: Option<AgentId>,
    /// Shared focal point listeners orbit (set by story tellers and
    /// group-talk hosts).
    pub keep_distance_to: Option<Vec2>,
    pub group: Option<GroupId>,
}

impl AgentSnapshot {
    /// Placeholder snapshot used before an agent has published once.
    pub fn empty(id: AgentId, kind: AgentKind, position: Vec2) -> Self {
        Self {
            id,
            kind,
            position,
            velocity: Vec2::ZERO,
            state: AgentState::None,
            talking_to: None,
            listening_to: None,
            keep_distance_to: None,
            group: None,
        }
    }
}
