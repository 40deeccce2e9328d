//! `crowd-scene` — the shared environment registry.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                   |
//! |--------------|------------------------------------------------------------|
//! | [`waypoint`] | `Waypoint`, `WaypointType` — named target regions          |
//! | [`obstacle`] | `Obstacle` — static line-segment obstacles                 |
//! | [`snapshot`] | `AgentSnapshot` — the tick-stable published agent view     |
//! | [`group`]    | `AgentGroup` — membership plus the shared attraction slot  |
//! | [`scene`]    | `Scene` — the registry all agents query each tick          |
//!
//! # Tick-stable reads
//!
//! Cross-agent fields (state, talking/listening ids, focal points) are read
//! through [`AgentSnapshot`]s published at the *end* of the previous tick.
//! Agents mutate only their own live state during a tick; the runner calls
//! [`Scene::publish`] once per tick to swap in the next snapshot buffer.
//! This double-buffering is what makes neighbor queries consistent without
//! any locking.

pub mod group;
pub mod obstacle;
pub mod scene;
pub mod snapshot;
pub mod waypoint;


pub use group::AgentGroup;
pub use obstacle::Obstacle;
pub use scene::Scene;
pub use snapshot::AgentSnapshot;
pub use waypoint::{Waypoint, WaypointType};
