//! Storage-set sizing for cross-domain selection.
//!
//! A cross-domain storage set takes the same number of nodes from every
//! domain, so its size must be a multiple of the number of domains. The
//! requested size is accepted when it also holds at least `r` nodes, does
//! not exceed the cluster, and does not overdraw the smallest domain.
//! Otherwise the closest per-domain count within bounds is picked.
//!
//! When a small domain is what limits the count, the smallest domains are
//! dropped and the computation repeats. Losing a domain weakens fault
//! tolerance, so a smaller domain set only replaces the current best plan
//! if it gains more than one node per domain.

use std::fmt;

use corelib::LogId;
use tracing::{debug, warn};

use crate::domain::DomainMap;
use crate::error::{Result, SelectionError};
use crate::ratelimit::DOWNSIZE_WARNINGS;

/// Outcome of sizing: the storage-set size and the domains it is drawn from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizedPlan {
    pub nodeset_size: usize,
    pub domains: DomainMap,
}

impl SizedPlan {
    /// Number of nodes to take from every domain.
    pub fn nodes_per_domain(&self) -> usize {
        self.nodeset_size / self.domains.len()
    }
}

/// First constraint a requested size violates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Violation {
    NotDivisible { num_domains: usize },
    BelowReplicationFactor { replication_factor: usize },
    ExceedsCluster { cluster_size: usize },
    SmallDomain { min_domain_size: usize },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::NotDivisible { num_domains } => {
                write!(f, "not divisible by the number of domains ({num_domains})")
            }
            Violation::BelowReplicationFactor { replication_factor } => {
                write!(f, "smaller than replication factor ({replication_factor})")
            }
            Violation::ExceedsCluster { cluster_size } => {
                write!(f, "larger than the number of nodes in the cluster ({cluster_size})")
            }
            Violation::SmallDomain { min_domain_size } => write!(
                f,
                "not satisfiable due to small domain(s) (domain size == {min_domain_size})"
            ),
        }
    }
}

fn check_feasible(
    size: usize,
    replication_factor: usize,
    num_domains: usize,
    cluster_size: usize,
    min_domain_size: usize,
) -> Option<Violation> {
    if size % num_domains != 0 {
        Some(Violation::NotDivisible { num_domains })
    } else if size < replication_factor {
        Some(Violation::BelowReplicationFactor { replication_factor })
    } else if size > cluster_size {
        Some(Violation::ExceedsCluster { cluster_size })
    } else if size > min_domain_size * num_domains {
        Some(Violation::SmallDomain { min_domain_size })
    } else {
        None
    }
}

/// Pick the storage-set size for `domains`.
///
/// `target` defaults to the number of nodes in the map. The returned plan
/// carries the domain set the size was computed for, which may be a subset
/// of `domains`. Fails with [`SelectionError::NoDomains`] if `domains` is
/// empty.
pub fn size_storage_set(
    log_id: LogId,
    target: Option<usize>,
    replication_factor: usize,
    mut domains: DomainMap,
) -> Result<SizedPlan> {
    let mut best: Option<SizedPlan> = None;

    while let Some(min_domain_size) = domains.min_domain_size() {
        let num_domains = domains.len();
        let cluster_size = domains.num_nodes();
        let requested = target.unwrap_or(cluster_size);

        let mut retry = false;
        let mut nodeset_size = requested;
        if let Some(violation) = check_feasible(
            requested,
            replication_factor,
            num_domains,
            cluster_size,
            min_domain_size,
        ) {
            let min_per_domain = replication_factor.div_ceil(num_domains);
            let max_per_domain = cluster_size / num_domains;
            let ideal = (requested as f64 / num_domains as f64).round() as usize;

            let mut per_domain = min_per_domain.max(max_per_domain.min(ideal));
            if per_domain > min_domain_size {
                per_domain = min_domain_size;
                retry = true;
            }
            nodeset_size = per_domain * num_domains;

            if let Some(suppressed) = DOWNSIZE_WARNINGS.check() {
                warn!(
                    %log_id,
                    requested,
                    nodeset_size,
                    suppressed,
                    "storage set size {requested} for log {log_id} is {violation}, using {nodeset_size} instead"
                );
            }
        }

        let improves = best
            .as_ref()
            .map_or(true, |b| nodeset_size > b.nodeset_size + num_domains);
        if improves {
            best = Some(SizedPlan {
                nodeset_size,
                domains: domains.clone(),
            });
        }

        if !retry {
            break;
        }
        let dropped = domains.remove_domains_of_size(min_domain_size);
        debug!(%log_id, dropped, min_domain_size, "retrying storage set sizing without the smallest domains");
    }

    best.ok_or(SelectionError::NoDomains)
}
