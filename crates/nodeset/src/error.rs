//! Errors reported by node-set selectors.

use corelib::{LocationScope, LogId, NodeId};
use thiserror::Error;

/// Result type alias for node-set selection.
pub type Result<T> = std::result::Result<T, SelectionError>;

/// Coarse classification callers use to decide between retrying with other
/// options and escalating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The log is not in the configuration.
    NotFound,
    /// The configuration cannot support cross-domain selection.
    InvalidConfig,
    /// Selection ran but could not produce a usable storage set.
    Failed,
}

/// Reasons a selection can fail.
#[derive(Debug, Error)]
pub enum SelectionError {
    #[error("log {0} not found in configuration")]
    LogNotFound(LogId),

    #[error("node {node} does not have location information, cross-domain selection cannot continue")]
    MissingLocation { node: NodeId },

    #[error("node {node} does not have location scope {scope} specified in its location {location}")]
    MissingScope {
        node: NodeId,
        scope: LocationScope,
        location: String,
    },

    #[error("invalid sync replication scope {scope}")]
    InvalidScope { scope: LocationScope },

    #[error(transparent)]
    Config(#[from] corelib::Error),

    #[error("no failure domain left to select storage set from")]
    NoDomains,

    #[error("no storage nodes available for log {0}")]
    NoStorageNodes(LogId),

    #[error("not enough nodes in domain '{domain}': required {required}, actual {available}")]
    InsufficientNodes {
        domain: String,
        required: usize,
        available: usize,
    },

    #[error("storage set {storage_set:?} for log {log_id} cannot satisfy replication {replication}")]
    InvalidStorageSet {
        log_id: LogId,
        storage_set: Vec<NodeId>,
        replication: String,
    },
}

impl SelectionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SelectionError::LogNotFound(_) => ErrorKind::NotFound,
            SelectionError::MissingLocation { .. }
            | SelectionError::MissingScope { .. }
            | SelectionError::InvalidScope { .. }
            | SelectionError::Config(_) => ErrorKind::InvalidConfig,
            SelectionError::NoDomains
            | SelectionError::NoStorageNodes(_)
            | SelectionError::InsufficientNodes { .. }
            | SelectionError::InvalidStorageSet { .. } => ErrorKind::Failed,
        }
    }
}
