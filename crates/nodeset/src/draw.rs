//! Seeded random draws of nodes.

use corelib::hash::domain_hash;
use corelib::{ClusterConfig, LogId, NodeId};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// RNG for drawing from one domain.
///
/// Seeded with `seed ^ log_id ^ hash(domain)` so the same inputs give the
/// same draw in every process while different domains and logs get
/// independent streams.
pub fn domain_rng(seed: u64, log_id: LogId, domain: &str) -> StdRng {
    StdRng::seed_from_u64(seed ^ log_id.0 ^ domain_hash(domain))
}

/// Draw `count` distinct nodes out of `candidates`, preferring nodes with
/// positive weight.
///
/// If there are fewer than `count` positive-weight candidates, all of them
/// are taken and the rest is filled with zero-weight ones. Returns `None` if
/// `candidates` holds fewer than `count` nodes. The result is in draw order,
/// not sorted.
pub fn randomly_select_nodes(
    config: &ClusterConfig,
    candidates: &[NodeId],
    count: usize,
    rng: &mut StdRng,
) -> Option<Vec<NodeId>> {
    let (positive, zero): (Vec<NodeId>, Vec<NodeId>) = candidates
        .iter()
        .copied()
        .partition(|id| config.node(*id).map_or(false, |n| n.is_writable()));

    if positive.len() >= count {
        return Some(positive.choose_multiple(rng, count).copied().collect());
    }

    let missing = count - positive.len();
    if zero.len() < missing {
        return None;
    }
    let mut selected = positive;
    selected.extend(zero.choose_multiple(rng, missing).copied());
    Some(selected)
}
