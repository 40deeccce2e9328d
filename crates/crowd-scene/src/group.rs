//! Agent groups and their shared attraction slot.
//!
//! Group membership itself is bookkeeping owned by the scene; the one piece
//! of behavior that lives here is the *shared* attraction: when a group
//! diverts toward an attraction area, every member must see the same
//! decision, so the claimed waypoint is stored on the group rather than on
//! any individual agent.

use crowd_core::{AgentId, GroupId, Vec2, WaypointId};

use crate::AgentSnapshot;

/// A walking group.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AgentGroup {
    pub id: GroupId,
    pub members: Vec<AgentId>,
    /// Attraction area the whole group is currently diverted to, if any.
    pub attraction: Option<WaypointId>,
}

impl AgentGroup {
    pub fn new(id: GroupId, members: Vec<AgentId>) -> Self {
        Self {
            id,
            members,
            attraction: None,
        }
    }

    /// Centroid of the members' published positions.  `None` for an empty
    /// group or when no member has a snapshot yet.
    pub fn center(&self, snapshots: &[AgentSnapshot]) -> Option<Vec2> {
        let mut sum = Vec2::ZERO;
        let mut count = 0usize;
        for &member in &self.members {
            if let Some(snap) = snapshots.get(member.index()) {
                sum += snap.position;
                count += 1;
            }
        }
        if count == 0 {
            None
        } else {
            Some(sum * (1.0 / count as f64))
        }
    }
}
