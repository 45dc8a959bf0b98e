//! Best-first search: a max-priority queue keyed by positive
//! upper bound. Every popped node is re-checked against the live θ before
//! its children are generated, since the bound it was pushed with may
//! have gone stale while it waited in the frontier; because PUB is
//! monotone non-increasing down any branch, a head whose PUB has fallen
//! below θ means nothing better remains in the queue, so the search ends
//! there rather than draining the rest of the frontier.

use std::collections::BinaryHeap;

use ordered_float::OrderedFloat;

use crate::error::MiningError;
use crate::numerics::less_than_threshold;
use crate::upu_list::UpuList;

use super::{expand_one, ExpansionOutcome, SearchContext, SearchEngine};

struct FrontierEntry {
    joined: UpuList,
    next_start_rank: usize,
}

impl PartialEq for FrontierEntry {
    fn eq(&self, other: &Self) -> bool {
        self.joined.positive_upper_bound == other.joined.positive_upper_bound
    }
}
impl Eq for FrontierEntry {}
impl PartialOrd for FrontierEntry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for FrontierEntry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        OrderedFloat(self.joined.positive_upper_bound).cmp(&OrderedFloat(other.joined.positive_upper_bound))
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct BestFirstSearch;

impl SearchEngine for BestFirstSearch {
    fn explore_extensions(
        &self,
        ctx: &SearchContext,
        prefix: &UpuList,
        start_rank: usize,
    ) -> Result<(), MiningError> {
        let mut queue: BinaryHeap<FrontierEntry> = BinaryHeap::new();
        queue.push(FrontierEntry { joined: prefix.clone(), next_start_rank: start_rank });

        while let Some(entry) = queue.pop() {
            let theta = ctx.collector.admission_threshold();
            if less_than_threshold(entry.joined.ptwu, theta) {
                continue;
            }
            if less_than_threshold(entry.joined.positive_upper_bound, theta) {
                break;
            }
            for rank in entry.next_start_rank..ctx.ranker.size() {
                if let ExpansionOutcome::Survived { joined, next_start_rank } =
                    expand_one(ctx, &entry.joined, rank)?
                {
                    queue.push(FrontierEntry { joined, next_start_rank });
                }
            }
        }
        Ok(())
    }
}
