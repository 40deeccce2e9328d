//! `crowd-agent` — the single-agent behavior engine.
//!
//! # Crate layout
//!
//! | Module           | Contents                                                      |
//! |------------------|---------------------------------------------------------------|
//! | [`agent`]        | `Agent` — identity, pose, interaction fields, force model     |
//! | [`machine`]      | `StateMachine` + the per-state handler table                  |
//! | [`destinations`] | waypoint cycling, `WaypointPlanner` trait, `AreaPlanner`      |
//! | [`social`]       | probabilistic triggers and proximity-based listener resolution|
//! | [`trajectory`]   | canned maneuvers: generation, rotation primitive, replay      |
//! | [`motion`]       | per-tick movement dispatch and heading updates                |
//!
//! # Tick protocol
//!
//! The runner drives each agent through three calls per tick, in this order:
//!
//! 1. [`Agent::do_state_transition`] — one priority-ordered guard pass; the
//!    first satisfied guard switches states (running exit/enter hooks).
//! 2. [`Agent::compute_forces`] — rebuild the [`ForceReport`][crowd_force::ForceReport]
//!    from the scene's tick-stable snapshots.
//! 3. [`Agent::tick_movement`] — integrate forces, replay a micro-trajectory,
//!    or rigid-follow a partner, then derive the heading.
//!
//! All neighbor reads go through the scene's published snapshots, so
//! cross-agent state is consistent within a tick regardless of the order
//! agents are stepped in.

pub mod agent;
pub mod destinations;
pub mod machine;
pub mod motion;
pub mod social;
pub mod trajectory;

#[cfg(test)]
mod tests;

pub use agent::Agent;
pub use destinations::{AreaPlanner, WaypointPlanner};
pub use machine::StateMachine;
pub use trajectory::{rotate, MoveList, TimestampedPose};
