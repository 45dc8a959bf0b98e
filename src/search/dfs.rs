//! Baseline depth-first search. Recursive, O(depth) stack, no
//! separate frontier; re-reads θ after each recursive call returns so a
//! threshold raise produced deep in one subtree benefits every sibling
//! explored afterwards.

use crate::error::MiningError;

use super::{expand_one, ExpansionOutcome, SearchContext, SearchEngine};

#[derive(Debug, Default, Clone, Copy)]
pub struct DfsSearch;

impl SearchEngine for DfsSearch {
    fn explore_extensions(
        &self,
        ctx: &SearchContext,
        prefix: &crate::upu_list::UpuList,
        start_rank: usize,
    ) -> Result<(), MiningError> {
        for rank in start_rank..ctx.ranker.size() {
            if let ExpansionOutcome::Survived { joined, next_start_rank } = expand_one(ctx, prefix, rank)? {
                self.explore_extensions(ctx, &joined, next_start_rank)?;
            }
        }
        Ok(())
    }
}
