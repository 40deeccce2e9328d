//! `crowd-core` — foundational types for the crowd simulation framework.
//!
//! This crate is a dependency of every other `crowd-*` crate.  It
//! intentionally has no `crowd-*` dependencies and minimal external ones
//! (only `rand` and `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module       | Contents                                               |
//! |--------------|--------------------------------------------------------|
//! | [`ids`]      | `AgentId`, `WaypointId`, `GroupId`                     |
//! | [`vec2`]     | `Vec2`, angle normalization helpers                    |
//! | [`time`]     | `Tick`, `SimTime`, `SimClock`                          |
//! | [`rng`]      | `AgentRng` (per-agent), `SimRng` (global)              |
//! | [`state`]    | `AgentState`, `AgentKind`, `RobotMode`                 |
//! | [`config`]   | `SimConfig` — all tunable constants, validated once    |
//! | [`error`]    | `CrowdError`, `CrowdResult`                            |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                      |
//! |---------|-------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.         |

pub mod config;
pub mod error;
pub mod ids;
pub mod rng;
pub mod state;
pub mod time;
pub mod vec2;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{SimConfig, WaypointMode};
pub use error::{CrowdError, CrowdResult};
pub use ids::{AgentId, GroupId, WaypointId};
pub use rng::{AgentRng, SimRng};
pub use state::{AgentKind, AgentState, RobotMode};
pub use time::{SimClock, SimTime, Tick};
pub use vec2::{normalize_angle, shortest_angle_delta, Vec2};
