//! Node abstractions for the cluster model.
//!
//! Nodes are identified by a compact `NodeId` that is cheap to compare and
//! hash. A `NodeDescriptor` carries the metadata node-set selection reads.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::topology::Location;

/// Compact identifier for a node in the cluster.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "N{}", self.0)
    }
}

/// Sorted, duplicate-free list of nodes that may hold copies of a log's
/// records.
pub type StorageSet = Vec<NodeId>;

/// Metadata of one node in the cluster.
///
/// Keep this struct small and cheap to clone; connection state and the like
/// live elsewhere.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeDescriptor {
    pub id: NodeId,
    /// Location in the failure-domain hierarchy. Cross-domain selection
    /// requires it on every node.
    pub location: Option<Location>,
    /// Whether the node stores records and may be picked into node sets.
    pub included_in_nodesets: bool,
    /// Write weight. Zero means the node is drained: it still exists but
    /// must not receive new writes.
    pub weight: f64,
}

impl NodeDescriptor {
    /// Construct a storage node with weight 1 and no location.
    pub fn new(id: NodeId) -> Self {
        Self {
            id,
            location: None,
            included_in_nodesets: true,
            weight: 1.0,
        }
    }

    /// Construct a storage node at the given location.
    pub fn with_location(id: NodeId, location: Location) -> Self {
        Self {
            location: Some(location),
            ..Self::new(id)
        }
    }

    /// Set the write weight.
    ///
    /// Negative or non-finite weights are rejected.
    pub fn weight(mut self, weight: f64) -> Result<Self> {
        if !weight.is_finite() || weight < 0.0 {
            return Err(Error::InvalidNode(
                self.id,
                format!("weight must be a non-negative number, got {weight}"),
            ));
        }
        self.weight = weight;
        Ok(self)
    }

    /// Mark the node as a non-storage node (never part of a node set).
    #[must_use]
    pub fn non_storage(mut self) -> Self {
        self.included_in_nodesets = false;
        self
    }

    /// True if the node currently accepts writes.
    #[inline]
    pub fn is_writable(&self) -> bool {
        self.included_in_nodesets && self.weight > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_defaults() {
        let node = NodeDescriptor::new(NodeId(7));
        assert!(node.included_in_nodesets);
        assert!(node.is_writable());
        assert!(node.location.is_none());
    }

    #[test]
    fn test_zero_weight_is_not_writable() {
        let node = NodeDescriptor::new(NodeId(1)).weight(0.0).unwrap();
        assert!(node.included_in_nodesets);
        assert!(!node.is_writable());
    }

    #[test]
    fn test_negative_weight_rejected() {
        let err = NodeDescriptor::new(NodeId(1)).weight(-1.0).unwrap_err();
        assert!(matches!(err, Error::InvalidNode(NodeId(1), _)));
        assert!(NodeDescriptor::new(NodeId(1)).weight(f64::NAN).is_err());
    }

    #[test]
    fn test_non_storage_is_not_writable() {
        let node = NodeDescriptor::new(NodeId(2)).non_storage();
        assert!(!node.included_in_nodesets);
        assert!(!node.is_writable());
    }

    #[test]
    fn test_node_id_display_and_serde() {
        assert_eq!(NodeId(12).to_string(), "N12");
        assert_eq!(serde_json::to_string(&vec![NodeId(1), NodeId(3)]).unwrap(), "[1,3]");
    }
}
