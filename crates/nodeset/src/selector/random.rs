//! Random node-set selection without failure domains.
//!
//! Used directly for logs that replicate across nodes only, and as the
//! fallback of the cross-domain selector when the sync replication scope is
//! `NODE`.
//!
//! # Algorithm
//!
//! 1. Candidates are the storage nodes not excluded by the caller
//! 2. Size is the target (or all candidates), raised to the replication
//!    factor and capped at the number of candidates
//! 3. Draw that many candidates, positive weight first
//! 4. Sort and check the set can still be fully replicated

use corelib::{ClusterConfig, LogId, NodeId, ReplicationProperty};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::warn;

use crate::draw::randomly_select_nodes;
use crate::error::{Result, SelectionError};
use crate::ratelimit::DOWNSIZE_WARNINGS;
use crate::selector::{finish_selection, record_outcome, Decision, NodeSetSelector, Options};

/// Picks storage sets uniformly at random from all storage nodes.
#[derive(Debug, Clone, Default)]
pub struct RandomNodeSetSelector;

impl RandomNodeSetSelector {
    pub fn new() -> Self {
        Self
    }

    fn candidates(config: &ClusterConfig, options: &Options) -> Vec<NodeId> {
        config
            .nodes()
            .values()
            .filter(|n| n.included_in_nodesets && !options.exclude_nodes.contains(&n.id))
            .map(|n| n.id)
            .collect()
    }

    fn size_for(
        log_id: LogId,
        num_candidates: usize,
        target: Option<usize>,
        replication_factor: usize,
    ) -> Result<usize> {
        if num_candidates == 0 {
            return Err(SelectionError::NoStorageNodes(log_id));
        }
        let requested = target.unwrap_or(num_candidates);
        let size = requested.max(replication_factor).min(num_candidates);
        if size != requested {
            if let Some(suppressed) = DOWNSIZE_WARNINGS.check() {
                warn!(
                    %log_id,
                    requested,
                    nodeset_size = size,
                    suppressed,
                    "storage set size {requested} for log {log_id} adjusted to {size} \
                     (replication factor {replication_factor}, {num_candidates} storage nodes)"
                );
            }
        }
        Ok(size)
    }

    /// Selection without metrics; the cross-domain selector delegates here.
    pub(crate) fn select(
        &self,
        log_id: LogId,
        config: &ClusterConfig,
        previous: Option<&[NodeId]>,
        options: &Options,
    ) -> Result<Decision> {
        let attrs = config
            .log_attributes(log_id)
            .ok_or(SelectionError::LogNotFound(log_id))?;
        let replication = &attrs.replication;

        let candidates = Self::candidates(config, options);
        let size = Self::size_for(
            log_id,
            candidates.len(),
            attrs.nodeset_size,
            replication.replication_factor(),
        )?;

        let mut rng = StdRng::seed_from_u64(options.seed() ^ log_id.0);
        let selected = randomly_select_nodes(config, &candidates, size, &mut rng).ok_or(
            SelectionError::InsufficientNodes {
                domain: String::from("cluster"),
                required: size,
                available: candidates.len(),
            },
        )?;

        finish_selection(log_id, config, replication, selected, previous)
    }
}

impl NodeSetSelector for RandomNodeSetSelector {
    fn get_storage_set_size(
        &self,
        log_id: LogId,
        config: &ClusterConfig,
        target: Option<usize>,
        replication: &ReplicationProperty,
        options: &Options,
    ) -> Result<usize> {
        let num_candidates = Self::candidates(config, options).len();
        Self::size_for(log_id, num_candidates, target, replication.replication_factor())
    }

    fn get_storage_set(
        &self,
        log_id: LogId,
        config: &ClusterConfig,
        previous: Option<&[NodeId]>,
        options: &Options,
    ) -> Result<Decision> {
        let result = self.select(log_id, config, previous, options);
        record_outcome(self.name(), &result);
        result
    }

    fn name(&self) -> &'static str {
        "random"
    }
}
