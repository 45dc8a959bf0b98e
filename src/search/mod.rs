//! Search engines: four exact, interchangeable traversal
//! strategies over the same canonical prefix-growth space, sharing one
//! expansion-loop body, one three-tier pruning predicate, one join
//! operator, and one collector.

mod best_first;
mod breadth_first;
mod dfs;
mod iddfs;

pub use best_first::BestFirstSearch;
pub use breadth_first::BreadthFirstSearch;
pub use dfs::DfsSearch;
pub use iddfs::IddfsSearch;

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::collector::Collector;
use crate::error::MiningError;
use crate::join::JoinOperator;
use crate::numerics::less_than_threshold;
use crate::ranker::Ranker;
use crate::upu_list::UpuList;

/// Immutable context every strategy needs for every candidate it expands.
/// Bundled so `explore_extensions` implementations don't carry a long
/// parameter list.
pub struct SearchContext<'a> {
    pub ranker: &'a Ranker,
    pub single_item_lists: &'a HashMap<u32, UpuList>,
    pub join_operator: &'a dyn JoinOperator,
    pub collector: &'a dyn Collector,
    pub min_prob: f64,
    pub counters: &'a NodeCounters,
}

/// Run-wide node counts surfaced in the mining report: how many candidate
/// extensions were actually explored (survived all three pruning tiers)
/// versus pruned, broken down by the tier that stopped them. Updated from
/// every worker thread via relaxed atomics — only approximate ordering
/// across threads matters, not the exact interleaving.
#[derive(Debug, Default)]
pub struct NodeCounters {
    pub explored: AtomicUsize,
    pub pruned_by_ep: AtomicUsize,
    pub pruned_by_ptwu: AtomicUsize,
    pub pruned_by_pub: AtomicUsize,
}

impl NodeCounters {
    pub fn explored_count(&self) -> usize {
        self.explored.load(Ordering::Relaxed)
    }

    pub fn pruned_by_ep_count(&self) -> usize {
        self.pruned_by_ep.load(Ordering::Relaxed)
    }

    pub fn pruned_by_ptwu_count(&self) -> usize {
        self.pruned_by_ptwu.load(Ordering::Relaxed)
    }

    pub fn pruned_by_pub_count(&self) -> usize {
        self.pruned_by_pub.load(Ordering::Relaxed)
    }
}

/// One engine's single operation: explore every extension of `prefix`
/// whose rank is >= `start_rank`, recursing/enqueuing/scheduling further
/// extensions per the strategy's own traversal order. All four engines
/// are exact — they enumerate the same non-pruned candidates — so the
/// recursive structure each uses internally is an implementation detail
/// of this trait's sole method. Returns `Err` the moment any candidate it
/// touches fails its structural invariants, aborting the remainder of
/// this subtree rather than admitting a corrupted pattern.
pub trait SearchEngine: Send + Sync {
    fn explore_extensions(
        &self,
        ctx: &SearchContext,
        prefix: &UpuList,
        start_rank: usize,
    ) -> Result<(), MiningError>;
}

/// Outcome of trying one candidate extension: either it was pruned (and
/// by which tier, for diagnostics/reporting) or it survived and should be
/// recursed into at `next_start_rank`.
pub enum ExpansionOutcome {
    NoExtensionList,
    EmptyJoin,
    PrunedByEp,
    PrunedByPtwu,
    PrunedByPub,
    Survived { joined: UpuList, next_start_rank: usize },
}

/// The shared expansion-loop body, used by every
/// strategy for a single candidate extension at `rank`. Strategies differ
/// only in *when* and *in what order* they call this for each rank and
/// what they do with a `Survived` outcome (recurse immediately, enqueue,
/// or schedule).
pub fn expand_one(ctx: &SearchContext, prefix: &UpuList, rank: usize) -> Result<ExpansionOutcome, MiningError> {
    let item = ctx.ranker.item_at(rank);
    let Some(extension) = ctx.single_item_lists.get(&item) else {
        return Ok(ExpansionOutcome::NoExtensionList);
    };

    let theta = ctx.collector.admission_threshold();
    let Some(joined) = ctx.join_operator.join(prefix, extension, theta, item)? else {
        return Ok(ExpansionOutcome::EmptyJoin);
    };

    if less_than_threshold(joined.existential_probability, ctx.min_prob) {
        ctx.counters.pruned_by_ep.fetch_add(1, Ordering::Relaxed);
        return Ok(ExpansionOutcome::PrunedByEp);
    }
    if less_than_threshold(joined.ptwu, theta) {
        ctx.counters.pruned_by_ptwu.fetch_add(1, Ordering::Relaxed);
        return Ok(ExpansionOutcome::PrunedByPtwu);
    }
    if less_than_threshold(joined.positive_upper_bound, theta) {
        ctx.counters.pruned_by_pub.fetch_add(1, Ordering::Relaxed);
        return Ok(ExpansionOutcome::PrunedByPub);
    }

    if !less_than_threshold(joined.expected_utility, theta) {
        ctx.collector.try_admit(&joined);
    }

    ctx.counters.explored.fetch_add(1, Ordering::Relaxed);
    Ok(ExpansionOutcome::Survived { next_start_rank: rank + 1, joined })
}
