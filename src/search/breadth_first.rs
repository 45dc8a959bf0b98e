//! Breadth-first search: a plain FIFO frontier with the same
//! stale-check on dequeue as best-first, minus the early-termination
//! shortcut (FIFO order gives no guarantee that a later node's bound is
//! no better than the current head's).

use std::collections::VecDeque;

use crate::error::MiningError;
use crate::numerics::less_than_threshold;
use crate::upu_list::UpuList;

use super::{expand_one, ExpansionOutcome, SearchContext, SearchEngine};

struct FrontierEntry {
    joined: UpuList,
    next_start_rank: usize,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct BreadthFirstSearch;

impl SearchEngine for BreadthFirstSearch {
    fn explore_extensions(
        &self,
        ctx: &SearchContext,
        prefix: &UpuList,
        start_rank: usize,
    ) -> Result<(), MiningError> {
        let mut queue: VecDeque<FrontierEntry> = VecDeque::new();
        queue.push_back(FrontierEntry { joined: prefix.clone(), next_start_rank: start_rank });

        while let Some(entry) = queue.pop_front() {
            let theta = ctx.collector.admission_threshold();
            if less_than_threshold(entry.joined.ptwu, theta)
                || less_than_threshold(entry.joined.positive_upper_bound, theta)
            {
                continue;
            }
            for rank in entry.next_start_rank..ctx.ranker.size() {
                if let ExpansionOutcome::Survived { joined, next_start_rank } =
                    expand_one(ctx, &entry.joined, rank)?
                {
                    queue.push_back(FrontierEntry { joined, next_start_rank });
                }
            }
        }
        Ok(())
    }
}
