//! Grouping of storage nodes into failure domains.

use std::collections::BTreeMap;

use corelib::{ClusterConfig, LocationScope, NodeId};
use tracing::error;

use crate::error::{Result, SelectionError};
use crate::selector::Options;

/// Storage nodes grouped by their domain at one scope.
///
/// Keys iterate in lexicographic order and every bucket holds ascending node
/// ids, so a selection over the map is reproducible for a fixed seed.
/// Buckets are never empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomainMap {
    domains: BTreeMap<String, Vec<NodeId>>,
}

impl DomainMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Group the storage nodes of `config` by their domain at `scope`.
    ///
    /// Nodes in `options.exclude_nodes` and nodes not included in node sets
    /// are skipped. Every node, skipped or not, must have a location that
    /// specifies `scope`; a missing one is a configuration error.
    pub fn build(config: &ClusterConfig, scope: LocationScope, options: &Options) -> Result<Self> {
        if scope <= LocationScope::Node || scope >= LocationScope::Root {
            return Err(SelectionError::InvalidScope { scope });
        }

        let mut map = Self::new();
        for (&id, node) in config.nodes() {
            let Some(location) = node.location.as_ref() else {
                error!(node = %id, "node has no location information, cross-domain selection cannot continue");
                return Err(SelectionError::MissingLocation { node: id });
            };
            if !location.scope_specified(scope) {
                error!(node = %id, %scope, %location, "node location does not specify the sync replication scope");
                return Err(SelectionError::MissingScope {
                    node: id,
                    scope,
                    location: location.to_string(),
                });
            }

            if options.exclude_nodes.contains(&id) || !node.included_in_nodesets {
                continue;
            }
            map.insert(location.get_domain(scope), id);
        }
        Ok(map)
    }

    /// Add `node` to `domain`, keeping the bucket sorted.
    pub fn insert(&mut self, domain: impl Into<String>, node: NodeId) {
        let bucket = self.domains.entry(domain.into()).or_default();
        if let Err(pos) = bucket.binary_search(&node) {
            bucket.insert(pos, node);
        }
    }

    /// Number of domains.
    pub fn len(&self) -> usize {
        self.domains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }

    /// Total number of nodes across all domains.
    pub fn num_nodes(&self) -> usize {
        self.domains.values().map(Vec::len).sum()
    }

    /// Size of the smallest domain, `None` if the map is empty.
    pub fn min_domain_size(&self) -> Option<usize> {
        self.domains.values().map(Vec::len).min()
    }

    pub fn get(&self, domain: &str) -> Option<&[NodeId]> {
        self.domains.get(domain).map(Vec::as_slice)
    }

    /// Domains in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[NodeId])> {
        self.domains
            .iter()
            .map(|(domain, nodes)| (domain.as_str(), nodes.as_slice()))
    }

    /// Drop every domain holding exactly `size` nodes. Returns how many were
    /// dropped.
    pub fn remove_domains_of_size(&mut self, size: usize) -> usize {
        let before = self.domains.len();
        self.domains.retain(|_, nodes| nodes.len() != size);
        before - self.domains.len()
    }
}

impl FromIterator<(String, NodeId)> for DomainMap {
    fn from_iter<I: IntoIterator<Item = (String, NodeId)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (domain, node) in iter {
            map.insert(domain, node);
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use corelib::{Location, NodeDescriptor};

    fn config(nodes: &[(u32, Option<&str>)]) -> ClusterConfig {
        let mut cfg = ClusterConfig::new();
        for &(id, loc) in nodes {
            let mut node = NodeDescriptor::new(NodeId(id));
            node.location = loc.map(|l| l.parse::<Location>().unwrap());
            cfg.add_node(node).unwrap();
        }
        cfg
    }

    #[test]
    fn test_groups_by_rack() {
        let cfg = config(&[
            (3, Some("r.d.c.w.b")),
            (0, Some("r.d.c.w.a")),
            (1, Some("r.d.c.w.b")),
            (2, Some("r.d.c.w.a")),
        ]);
        let map = DomainMap::build(&cfg, LocationScope::Rack, &Options::default()).unwrap();

        assert_eq!(map.len(), 2);
        assert_eq!(map.num_nodes(), 4);
        let domains: Vec<_> = map.iter().collect();
        assert_eq!(domains[0], ("r.d.c.w.a", &[NodeId(0), NodeId(2)][..]));
        assert_eq!(domains[1], ("r.d.c.w.b", &[NodeId(1), NodeId(3)][..]));
    }

    #[test]
    fn test_wider_scope_merges_domains() {
        let cfg = config(&[(0, Some("r.d.c.w.a")), (1, Some("r.d.c.w.b"))]);
        let map = DomainMap::build(&cfg, LocationScope::Row, &Options::default()).unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("r.d.c.w"), Some(&[NodeId(0), NodeId(1)][..]));
    }

    #[test]
    fn test_missing_location_is_config_error() {
        let cfg = config(&[(0, Some("r.d.c.w.a")), (1, None)]);
        let err = DomainMap::build(&cfg, LocationScope::Rack, &Options::default()).unwrap_err();
        assert!(matches!(err, SelectionError::MissingLocation { node: NodeId(1) }));
    }

    #[test]
    fn test_missing_scope_is_config_error() {
        let cfg = config(&[(0, Some("r.d.c.w.a")), (1, Some("r.d.c.."))]);
        let err = DomainMap::build(&cfg, LocationScope::Rack, &Options::default()).unwrap_err();
        assert!(matches!(
            err,
            SelectionError::MissingScope { node: NodeId(1), scope: LocationScope::Rack, .. }
        ));

        // The same node is fine when replicating across clusters.
        assert!(DomainMap::build(&cfg, LocationScope::Cluster, &Options::default()).is_ok());
    }

    #[test]
    fn test_excluded_and_non_storage_nodes_skipped() {
        let mut cfg = config(&[(0, Some("r.d.c.w.a")), (1, Some("r.d.c.w.a"))]);
        let mut non_storage = NodeDescriptor::new(NodeId(2)).non_storage();
        non_storage.location = Some("r.d.c.w.b".parse().unwrap());
        cfg.add_node(non_storage).unwrap();

        let options = Options::default().exclude(NodeId(0));
        let map = DomainMap::build(&cfg, LocationScope::Rack, &options).unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("r.d.c.w.a"), Some(&[NodeId(1)][..]));
    }

    #[test]
    fn test_node_and_root_scopes_rejected() {
        let cfg = config(&[(0, Some("r.d.c.w.a"))]);
        for scope in [LocationScope::Node, LocationScope::Root] {
            let err = DomainMap::build(&cfg, scope, &Options::default()).unwrap_err();
            assert!(matches!(err, SelectionError::InvalidScope { .. }));
        }
    }

    #[test]
    fn test_remove_domains_of_size() {
        let mut map: DomainMap = [
            ("a".to_string(), NodeId(0)),
            ("a".to_string(), NodeId(1)),
            ("b".to_string(), NodeId(2)),
            ("c".to_string(), NodeId(3)),
        ]
        .into_iter()
        .collect();

        assert_eq!(map.min_domain_size(), Some(1));
        assert_eq!(map.remove_domains_of_size(1), 2);
        assert_eq!(map.len(), 1);
        assert_eq!(map.min_domain_size(), Some(2));
    }
}
