//! `crowd-sim` — tick loop runner for the crowd behavior framework.
//!
//! # Three-phase tick loop
//!
//! ```text
//! for each tick:
//!   ① Transitions — run each agent's state-machine guard pass, ascending
//!                   AgentId order; neighbor reads go through the snapshots
//!                   published at the end of the previous tick.
//!   ② Movement    — recompute forces, then integrate / replay a canned
//!                   maneuver / rigid-follow, per agent state.
//!   ③ Publish     — rebuild the snapshot buffer, swap it into the scene,
//!                   advance the clock.
//! ```
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use crowd_core::{AgentKind, SimConfig, Vec2};
//! use crowd_scene::Waypoint;
//! use crowd_sim::{NoopObserver, SimBuilder};
//!
//! let mut builder = SimBuilder::new(SimConfig::default());
//! let a = builder.add_waypoint(Waypoint::area("a", Vec2::new(0.0, 0.0), 2.0));
//! let b = builder.add_waypoint(Waypoint::area("b", Vec2::new(20.0, 0.0), 2.0));
//! builder.add_agent(AgentKind::Ordinary, Vec2::new(1.0, 1.0), vec![a, b]);
//! let mut sim = builder.build()?;
//! sim.run(10_000, &mut NoopObserver);
//! ```

pub mod builder;
pub mod error;
pub mod observer;
pub mod sim;


pub use builder::SimBuilder;
pub use error::{SimError, SimResult};
pub use observer::{NoopObserver, SimObserver};
pub use sim::Sim;
