//! Framework error type.
//!
//! Sub-crates may define their own error enums and convert them into
//! `CrowdError` via `From` impls, or keep them separate and wrap `CrowdError`
//! as one variant.  Both patterns are acceptable; prefer whichever keeps
//! error sites clean.
//!
//! Note that per-tick behavior never returns `Err`: non-fatal failures
//! (non-finite forces, maneuver overshoot, unresolvable partners) are logged
//! and degraded within the tick that detects them.  `CrowdError` is for
//! construction and validation paths.

use thiserror::Error;

use crate::{AgentId, WaypointId};

/// The top-level error type for `crowd-core` and a common base for sub-crates.
#[derive(Debug, Error)]
pub enum CrowdError {
    #[error("agent {0} not found")]
    AgentNotFound(AgentId),

    #[error("waypoint {0} not found")]
    WaypointNotFound(WaypointId),

    #[error("configuration error: {0}")]
    Config(String),
}

/// Shorthand result type for all `crowd-*` crates.
pub type CrowdResult<T> = Result<T, CrowdError>;
