//! Cross-domain node-set selection.
//!
//! Spreads a log's storage set evenly over the failure domains at its sync
//! replication scope, so that any `r` copies can be placed in distinct
//! domains.
//!
//! # Algorithm
//!
//! 1. Group storage nodes by domain at the sync replication scope
//! 2. Size the set (a multiple of the domain count, see [`crate::sizer`]),
//!    possibly dropping the smallest domains
//! 3. Draw `size / domains` nodes from every remaining domain, positive
//!    weight first
//! 4. Sort and check the set can still be fully replicated; zero-weight
//!    fill-ins can make it fail
//!
//! Logs replicating across nodes only are handed to
//! [`RandomNodeSetSelector`] unchanged.

use corelib::{ClusterConfig, LocationScope, LogId, NodeId, ReplicationProperty};
use tracing::{debug, error};

use crate::domain::DomainMap;
use crate::draw::{domain_rng, randomly_select_nodes};
use crate::error::{Result, SelectionError};
use crate::selector::{
    finish_selection, record_outcome, Decision, NodeSetSelector, Options, RandomNodeSetSelector,
};
use crate::sizer::{size_storage_set, SizedPlan};

/// Picks the same number of random nodes from every failure domain.
#[derive(Debug, Clone, Default)]
pub struct RandomCrossDomainNodeSetSelector {
    fallback: RandomNodeSetSelector,
}

impl RandomCrossDomainNodeSetSelector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Size the storage set and return the domains to draw it from.
    ///
    /// `scope` must be strictly between `NODE` and `ROOT`.
    pub fn plan(
        &self,
        log_id: LogId,
        config: &ClusterConfig,
        target: Option<usize>,
        scope: LocationScope,
        replication_factor: usize,
        options: &Options,
    ) -> Result<SizedPlan> {
        let domains = DomainMap::build(config, scope, options)?;
        size_storage_set(log_id, target, replication_factor, domains)
    }

    fn select(
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
        let (scope, replication_factor) = replication.reduce();

        if scope == LocationScope::Node {
            debug!(%log_id, "log is not configured for cross-domain replication, using random selection");
            return self.fallback.select(log_id, config, previous, options);
        }
        if scope >= LocationScope::Root {
            error!(%log_id, %scope, %replication, "invalid sync replication scope");
            return Err(SelectionError::InvalidScope { scope });
        }

        let plan = self.plan(
            log_id,
            config,
            attrs.nodeset_size,
            scope,
            replication_factor,
            options,
        )?;
        let nodes_per_domain = plan.nodes_per_domain();
        let seed = options.seed();

        let mut selected = Vec::with_capacity(plan.nodeset_size);
        for (domain, nodes) in plan.domains.iter() {
            if nodes.len() < nodes_per_domain {
                error!(
                    %log_id,
                    domain,
                    required = nodes_per_domain,
                    actual = nodes.len(),
                    nodeset_size = plan.nodeset_size,
                    num_domains = plan.domains.len(),
                    "not enough nodes in domain"
                );
                return Err(SelectionError::InsufficientNodes {
                    domain: domain.to_string(),
                    required: nodes_per_domain,
                    available: nodes.len(),
                });
            }

            let mut rng = domain_rng(seed, log_id, domain);
            let picked = randomly_select_nodes(config, nodes, nodes_per_domain, &mut rng)
                .ok_or_else(|| {
                    error!(%log_id, domain, "not enough positive weight nodes in domain");
                    SelectionError::InsufficientNodes {
                        domain: domain.to_string(),
                        required: nodes_per_domain,
                        available: nodes.len(),
                    }
                })?;
            debug_assert_eq!(picked.len(), nodes_per_domain);
            selected.extend(picked);
        }
        debug_assert_eq!(selected.len(), plan.nodeset_size);

        finish_selection(log_id, config, replication, selected, previous)
    }
}

impl NodeSetSelector for RandomCrossDomainNodeSetSelector {
    fn get_storage_set_size(
        &self,
        log_id: LogId,
        config: &ClusterConfig,
        target: Option<usize>,
        replication: &ReplicationProperty,
        options: &Options,
    ) -> Result<usize> {
        let (scope, replication_factor) = replication.reduce();
        if scope == LocationScope::Node {
            debug!(%log_id, "log is not configured for cross-domain replication, using random sizing");
            let node_only =
                ReplicationProperty::with_sync_scope(LocationScope::Node, replication_factor)?;
            return self
                .fallback
                .get_storage_set_size(log_id, config, target, &node_only, options);
        }
        self.plan(log_id, config, target, scope, replication_factor, options)
            .map(|plan| plan.nodeset_size)
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
        "random-crossdomain"
    }
}
