//! JSON description of a cluster.
//!
//! ```json
//! {
//!   "nodes": [
//!     { "id": 0, "location": "rg1.dc1.cl1.ro1.rk1" },
//!     { "id": 1, "location": "rg1.dc1.cl1.ro1.rk2", "weight": 0.0 },
//!     { "id": 2, "storage": false }
//!   ],
//!   "logs": [
//!     { "id": 1, "replication": { "rack": 2, "node": 3 }, "nodeset_size": 6 }
//!   ]
//! }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::Context;
use corelib::{
    ClusterConfig, Location, LocationScope, LogAttributes, LogId, NodeDescriptor, NodeId,
    ReplicationProperty,
};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClusterFile {
    pub nodes: Vec<NodeEntry>,
    #[serde(default)]
    pub logs: Vec<LogEntry>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NodeEntry {
    pub id: u32,
    #[serde(default)]
    pub location: Option<String>,
    /// Whether the node may be part of storage sets.
    #[serde(default = "default_storage")]
    pub storage: bool,
    #[serde(default = "default_weight")]
    pub weight: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogEntry {
    pub id: u64,
    /// Scope name to replication factor.
    pub replication: BTreeMap<String, usize>,
    #[serde(default)]
    pub nodeset_size: Option<usize>,
}

fn default_storage() -> bool {
    true
}

fn default_weight() -> f64 {
    1.0
}

impl ClusterFile {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read cluster file {}", path.display()))?;
        Self::parse(&raw).with_context(|| format!("invalid cluster file {}", path.display()))
    }

    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Validate the description and turn it into a configuration snapshot.
    pub fn into_config(self) -> anyhow::Result<ClusterConfig> {
        let mut config = ClusterConfig::new();

        for entry in self.nodes {
            let id = NodeId(entry.id);
            let mut node = NodeDescriptor::new(id).weight(entry.weight)?;
            if let Some(location) = entry.location {
                let location: Location = location
                    .parse()
                    .with_context(|| format!("node {id}"))?;
                node.location = Some(location);
            }
            if !entry.storage {
                node = node.non_storage();
            }
            config.add_node(node)?;
        }

        for entry in self.logs {
            let pairs = entry
                .replication
                .iter()
                .map(|(scope, factor)| -> corelib::Result<(LocationScope, usize)> {
                    Ok((scope.parse()?, *factor))
                })
                .collect::<corelib::Result<Vec<_>>>()
                .with_context(|| format!("log {}", entry.id))?;
            let replication =
                ReplicationProperty::new(pairs).with_context(|| format!("log {}", entry.id))?;

            let mut attrs = LogAttributes::new(replication);
            attrs.nodeset_size = entry.nodeset_size;
            config.add_log(LogId(entry.id), attrs);
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "nodes": [
            { "id": 0, "location": "rg1.dc1.cl1.ro1.rk1" },
            { "id": 1, "location": "rg1.dc1.cl1.ro1.rk2", "weight": 0.0 },
            { "id": 2, "storage": false }
        ],
        "logs": [
            { "id": 1, "replication": { "rack": 2, "node": 3 }, "nodeset_size": 6 }
        ]
    }"#;

    #[test]
    fn test_parse_sample() {
        let config = ClusterFile::parse(SAMPLE).unwrap().into_config().unwrap();

        assert_eq!(config.nodes().len(), 3);
        assert_eq!(config.storage_node_count(), 2);
        assert_eq!(config.node(NodeId(1)).unwrap().weight, 0.0);
        assert!(config.node(NodeId(2)).unwrap().location.is_none());

        let attrs = config.log_attributes(LogId(1)).unwrap();
        assert_eq!(attrs.nodeset_size, Some(6));
        assert_eq!(attrs.replication.reduce(), (LocationScope::Node, 3));
    }

    #[test]
    fn test_bad_location_rejected() {
        let raw = r#"{ "nodes": [ { "id": 0, "location": "rg1..cl1.ro1.rk1" } ] }"#;
        let err = ClusterFile::parse(raw).unwrap().into_config().unwrap_err();
        assert!(format!("{err:#}").contains("node N0"));
    }

    #[test]
    fn test_bad_scope_rejected() {
        let raw = r#"{ "nodes": [], "logs": [ { "id": 4, "replication": { "shelf": 2 } } ] }"#;
        let err = ClusterFile::parse(raw).unwrap().into_config().unwrap_err();
        assert!(format!("{err:#}").contains("log 4"));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let raw = r#"{ "nodes": [ { "id": 0, "rack": "a" } ] }"#;
        assert!(ClusterFile::parse(raw).is_err());
    }
}
