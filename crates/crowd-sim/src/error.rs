use crowd_core::CrowdError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Core(#[from] CrowdError),

    #[error("agent {0} does not exist")]
    UnknownAgent(crowd_core::AgentId),

    #[error("waypoint {0} does not exist")]
    UnknownWaypoint(crowd_core::WaypointId),
}

pub type SimResult<T> = Result<T, SimError>;
