//! Cluster configuration snapshot.
//!
//! A `ClusterConfig` is an immutable view of the nodes and the logs of one
//! cluster. Selectors borrow it for the duration of a call and never keep a
//! reference afterwards.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::node::{NodeDescriptor, NodeId};
use crate::replication::ReplicationProperty;
use crate::topology::LocationScope;

/// Identifier of a log.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LogId(pub u64);

impl fmt::Display for LogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Per-log settings relevant to node-set selection.
#[derive(Debug, Clone, PartialEq)]
pub struct LogAttributes {
    pub replication: ReplicationProperty,
    /// Desired storage-set size; selectors treat it as a hint.
    pub nodeset_size: Option<usize>,
}

impl LogAttributes {
    pub fn new(replication: ReplicationProperty) -> Self {
        Self {
            replication,
            nodeset_size: None,
        }
    }

    #[must_use]
    pub fn with_nodeset_size(mut self, size: usize) -> Self {
        self.nodeset_size = Some(size);
        self
    }
}

/// Nodes and logs of a cluster.
#[derive(Debug, Clone, Default)]
pub struct ClusterConfig {
    nodes: BTreeMap<NodeId, NodeDescriptor>,
    logs: BTreeMap<LogId, LogAttributes>,
}

impl ClusterConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a node. Ids must be unique.
    pub fn add_node(&mut self, node: NodeDescriptor) -> Result<()> {
        if self.nodes.contains_key(&node.id) {
            return Err(Error::DuplicateNode(node.id));
        }
        self.nodes.insert(node.id, node);
        Ok(())
    }

    /// Register or replace the attributes of a log.
    pub fn add_log(&mut self, log_id: LogId, attrs: LogAttributes) {
        self.logs.insert(log_id, attrs);
    }

    /// All nodes, ordered by id.
    pub fn nodes(&self) -> &BTreeMap<NodeId, NodeDescriptor> {
        &self.nodes
    }

    pub fn node(&self, id: NodeId) -> Option<&NodeDescriptor> {
        self.nodes.get(&id)
    }

    /// Attributes of `log_id`, `None` if the log is not configured.
    pub fn log_attributes(&self, log_id: LogId) -> Option<&LogAttributes> {
        self.logs.get(&log_id)
    }

    /// Ids of all configured logs.
    pub fn log_ids(&self) -> impl Iterator<Item = LogId> + '_ {
        self.logs.keys().copied()
    }

    /// Number of nodes that may be picked into node sets.
    pub fn storage_node_count(&self) -> usize {
        self.nodes.values().filter(|n| n.included_in_nodesets).count()
    }
}

/// Check whether records of a log with `replication` can still be fully
/// replicated on `storage_set`.
///
/// Only writable members (storage nodes with positive weight) count. For
/// every `(scope, factor)` requirement the writable members must span at
/// least `factor` distinct domains at that scope. A member that is unknown or
/// not a storage node makes the set invalid outright.
pub fn valid_storage_set(
    nodes: &BTreeMap<NodeId, NodeDescriptor>,
    storage_set: &[NodeId],
    replication: &ReplicationProperty,
) -> bool {
    let mut writable = Vec::with_capacity(storage_set.len());
    for id in storage_set {
        match nodes.get(id) {
            Some(node) if node.included_in_nodesets => {
                if node.is_writable() {
                    writable.push(node);
                }
            }
            _ => return false,
        }
    }

    replication.iter().all(|(scope, factor)| {
        let domains: BTreeSet<String> = writable
            .iter()
            .filter_map(|node| match scope {
                LocationScope::Node => Some(node.id.to_string()),
                _ => node
                    .location
                    .as_ref()
                    .filter(|loc| loc.scope_specified(scope))
                    .map(|loc| loc.get_domain(scope)),
            })
            .collect();
        domains.len() >= factor
    })
}
