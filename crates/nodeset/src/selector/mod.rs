//! Node-set selector abstractions.
//!
//! A selector picks the storage set of a log: the nodes eligible to store
//! copies of its records. Different selectors optimize for different
//! goals:
//!
//! - **RandomNodeSetSelector**: uniform random nodes, no failure domains
//! - **RandomCrossDomainNodeSetSelector**: the same number of random nodes
//!   from every failure domain at the log's sync replication scope

pub mod cross_domain;
pub mod random;

pub use cross_domain::RandomCrossDomainNodeSetSelector;
pub use random::RandomNodeSetSelector;

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use corelib::{valid_storage_set, ClusterConfig, LogId, NodeId, ReplicationProperty, StorageSet};
use serde::Serialize;
use tracing::error;

use crate::error::{Result, SelectionError};

/// Caller-supplied knobs for one selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options {
    /// Nodes that must not be part of the storage set.
    pub exclude_nodes: BTreeSet<NodeId>,
    /// Seed for the random draws. Without one, every call draws a fresh seed.
    pub rng_seed: Option<u64>,
}

impl Options {
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }

    #[must_use]
    pub fn exclude(mut self, node: NodeId) -> Self {
        self.exclude_nodes.insert(node);
        self
    }

    /// Seed for this call.
    pub(crate) fn seed(&self) -> u64 {
        self.rng_seed.unwrap_or_else(rand::random)
    }
}

/// Outcome of a successful selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", content = "storage_set", rename_all = "snake_case")]
pub enum Decision {
    /// The previous storage set is still the one the selector would pick.
    Keep,
    /// The log should move to this storage set.
    NeedsChange(StorageSet),
}

/// Trait for node-set selectors.
///
/// Selectors are stateless: every call reads the borrowed configuration
/// snapshot and keeps nothing once it returns. Implementations must be
/// thread-safe (Send + Sync) as they may be shared across threads.
pub trait NodeSetSelector: Send + Sync + 'static {
    /// Size of the storage set this selector would pick for a log with the
    /// given replication and size target.
    fn get_storage_set_size(
        &self,
        log_id: LogId,
        config: &ClusterConfig,
        target: Option<usize>,
        replication: &ReplicationProperty,
        options: &Options,
    ) -> Result<usize>;

    /// Pick the storage set of `log_id`.
    ///
    /// Returns [`Decision::Keep`] if the pick equals `previous`.
    fn get_storage_set(
        &self,
        log_id: LogId,
        config: &ClusterConfig,
        previous: Option<&[NodeId]>,
        options: &Options,
    ) -> Result<Decision>;

    /// Selector name (for logging/metrics).
    fn name(&self) -> &'static str;
}

/// Available selector implementations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectorKind {
    Random,
    #[default]
    RandomCrossDomain,
}

impl SelectorKind {
    /// Instantiate the selector.
    pub fn create(self) -> Box<dyn NodeSetSelector> {
        match self {
            SelectorKind::Random => Box::new(RandomNodeSetSelector::new()),
            SelectorKind::RandomCrossDomain => Box::new(RandomCrossDomainNodeSetSelector::new()),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SelectorKind::Random => "random",
            SelectorKind::RandomCrossDomain => "random-crossdomain",
        }
    }
}

impl fmt::Display for SelectorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SelectorKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "random" => Ok(SelectorKind::Random),
            "random-crossdomain" | "random_crossdomain" => Ok(SelectorKind::RandomCrossDomain),
            other => Err(format!("unknown node set selector '{other}'")),
        }
    }
}

/// Sort `selected`, reject it if it cannot satisfy `replication`, and compare
/// it with `previous`.
pub(crate) fn finish_selection(
    log_id: LogId,
    config: &ClusterConfig,
    replication: &ReplicationProperty,
    mut selected: StorageSet,
    previous: Option<&[NodeId]>,
) -> Result<Decision> {
    selected.sort_unstable();

    // Selection ignores weights beyond preferring positive ones, so with
    // many drained nodes the set may be unable to take writes.
    if !valid_storage_set(config.nodes(), &selected, replication) {
        error!(%log_id, storage_set = ?selected, %replication, "invalid storage set, check node weights");
        return Err(SelectionError::InvalidStorageSet {
            log_id,
            storage_set: selected,
            replication: replication.to_string(),
        });
    }

    if previous == Some(selected.as_slice()) {
        return Ok(Decision::Keep);
    }
    Ok(Decision::NeedsChange(selected))
}

/// Count the outcome of a selection.
pub(crate) fn record_outcome(selector: &'static str, result: &Result<Decision>) {
    let outcome = match result {
        Ok(Decision::Keep) => "keep",
        Ok(Decision::NeedsChange(_)) => "needs_change",
        Err(_) => "failed",
    };
    metrics::counter!("nodeset_selections_total", "selector" => selector, "outcome" => outcome)
        .increment(1);
}
