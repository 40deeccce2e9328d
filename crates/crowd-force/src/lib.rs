//! `crowd-force` — the force model that turns a destination and nearby
//! obstacles/agents into an acceleration.
//!
//! # Crate layout
//!
//! | Module     | Contents                                                  |
//! |------------|-----------------------------------------------------------|
//! | [`plugin`] | `Force` trait — named, pluggable extra forces             |
//! | [`report`] | `ForceReport` — every component exposed individually      |
//! | [`model`]  | `ForceModel` — the four built-in forces + disabled set    |
//!
//! The model is a pure function of the current tick's state: it never
//! integrates, never mutates the scene, and reports each component
//! separately so observers can inspect them.

pub mod model;
pub mod plugin;
pub mod report;


pub use model::{ForceInputs, ForceModel};
pub use plugin::Force;
pub use report::ForceReport;
