//! Error types shared by the controller, the directory and the transports.

use thiserror::Error;

use crate::directory::BlockRole;
use crate::wire::RemoteOp;

/// Result type for controller operations
pub type ControllerResult<T> = Result<T, ControllerError>;

/// Failures of a single control-plane request
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransportError {
    /// The block behind the call was never resolved during discovery
    #[error("{role} was not resolved during discovery")]
    Unresolved { role: BlockRole },

    /// Connection, timeout or other request-level failure
    #[error("request failed: {0}")]
    Request(String),

    /// The flowgraph answered with a non-success status
    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    /// The response body could not be decoded
    #[error("invalid response: {0}")]
    Decode(String),
}

/// Errors surfaced by [`crate::PhyController`] and its helpers
#[derive(Error, Debug)]
pub enum ControllerError {
    /// One or more block roles were not found in the flowgraph
    #[error("discovery incomplete, missing: {}", format_roles(.missing))]
    DiscoveryIncomplete { missing: Vec<BlockRole> },

    /// PHY index outside {0, 1}
    #[error("invalid PHY index {0}, expected 0 or 1")]
    InvalidIndex(usize),

    /// A remote call of an apply sequence failed
    #[error("{op} failed: {source}")]
    TransportFailure {
        op: RemoteOp,
        #[source]
        source: TransportError,
    },

    /// Fetching or decoding the flowgraph description failed
    #[error("discovery failed: {0}")]
    Discovery(#[source] TransportError),

    /// Profile file could not be read or parsed
    #[error("profile {path}: {reason}")]
    Profile { path: String, reason: String },

    /// The controller worker thread is no longer running
    #[error("controller worker has stopped")]
    WorkerGone,
}

fn format_roles(roles: &[BlockRole]) -> String {
    roles
        .iter()
        .map(|r| r.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
