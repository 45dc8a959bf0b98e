//! Iterative-deepening DFS: repeated bounded DFS passes with
//! depth limits 1, 2, …. Each pass reports whether it was truncated by
//! the depth limit anywhere; the outer loop stops the first time a full
//! pass completes with no truncation at all, meaning the previous pass's
//! limit was already deep enough to reach every leaf.

use super::{expand_one, ExpansionOutcome, SearchContext, SearchEngine};
use crate::error::MiningError;
use crate::upu_list::UpuList;

#[derive(Debug, Default, Clone, Copy)]
pub struct IddfsSearch;

impl SearchEngine for IddfsSearch {
    fn explore_extensions(
        &self,
        ctx: &SearchContext,
        prefix: &UpuList,
        start_rank: usize,
    ) -> Result<(), MiningError> {
        let mut depth_limit = 1usize;
        loop {
            let cutoff = bounded_dfs(ctx, prefix, start_rank, 0, depth_limit)?;
            if !cutoff {
                return Ok(());
            }
            depth_limit += 1;
        }
    }
}

/// Runs one depth-bounded DFS pass rooted at `node`, relative depth 0 at
/// the call that started this iteration. Returns true iff any node along
/// this branch still had unexplored ranks once the depth limit was hit.
fn bounded_dfs(
    ctx: &SearchContext,
    node: &UpuList,
    start_rank: usize,
    depth: usize,
    limit: usize,
) -> Result<bool, MiningError> {
    if depth >= limit {
        return Ok(start_rank < ctx.ranker.size());
    }
    let mut cutoff = false;
    for rank in start_rank..ctx.ranker.size() {
        if let ExpansionOutcome::Survived { joined, next_start_rank } = expand_one(ctx, node, rank)? {
            if bounded_dfs(ctx, &joined, next_start_rank, depth + 1, limit)? {
                cutoff = true;
            }
        }
    }
    Ok(cutoff)
}
