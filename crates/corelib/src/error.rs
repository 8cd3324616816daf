//! Error types for the core library.

use thiserror::Error;

use crate::node::NodeId;

/// Result type alias for the core library.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or reading the cluster model.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Location string could not be parsed.
    #[error("invalid location '{location}': {reason}")]
    InvalidLocation { location: String, reason: String },
    /// Unknown location scope name.
    #[error("invalid location scope: {0}")]
    InvalidScope(String),
    /// Replication property is malformed.
    #[error("invalid replication property: {0}")]
    InvalidReplication(String),
    /// Invalid node configuration
    #[error("invalid node {0}: {1}")]
    InvalidNode(NodeId, String),
    /// Node id registered twice.
    #[error("node {0} already exists")]
    DuplicateNode(NodeId),
}
