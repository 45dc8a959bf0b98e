//! Item ranking: filters items by EP threshold and PTWU > 0,
//! orders survivors by `(ptwu ascending, item-id ascending)`, and exposes
//! O(1) rank<->item lookups plus a binary-searchable PTWU-in-rank-order
//! array for the prefix scheduler's PTWU-weighted split.

use crate::numerics::{ep_from_log_complement, less_than_threshold};
use crate::preprocessor::{DenseIndex, ItemStats};

#[derive(Debug, Clone)]
pub struct Ranker {
    /// `item_at_rank[r]` is the sparse item id at rank `r`.
    item_at_rank: Vec<u32>,
    /// `rank_of_item[item]` is `item`'s rank, or `None` if excluded.
    rank_of_item: Vec<Option<usize>>,
    /// PTWU values in rank order, for binary search.
    ptwu_in_rank_order: Vec<f64>,
}

impl Ranker {
    /// Builds the ranking. Items must pass `EP(i) >= min_prob - EPSILON`
    /// and `ptwu[i] > 0`.
    pub fn build(dense_index: &DenseIndex, stats: &ItemStats, min_prob: f64) -> Self {
        let mut survivors: Vec<(f64, u32, usize)> = Vec::new(); // (ptwu, item_id, dense)
        for d in 0..dense_index.size() {
            let ptwu = stats.ptwu[d];
            if ptwu <= 0.0 {
                continue;
            }
            let ep = ep_from_log_complement(stats.log_complement[d]);
            if less_than_threshold(ep, min_prob) {
                continue;
            }
            survivors.push((ptwu, dense_index.sparse_of(d), d));
        }
        survivors.sort_by(|a, b| {
            a.0.partial_cmp(&b.0)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.1.cmp(&b.1))
        });

        let max_item_id = (0..dense_index.size())
            .map(|d| dense_index.sparse_of(d))
            .max()
            .unwrap_or(0);
        let mut rank_of_item = vec![None; max_item_id as usize + 1];
        let mut item_at_rank = Vec::with_capacity(survivors.len());
        let mut ptwu_in_rank_order = Vec::with_capacity(survivors.len());
        for (rank, (ptwu, item_id, _dense)) in survivors.into_iter().enumerate() {
            item_at_rank.push(item_id);
            ptwu_in_rank_order.push(ptwu);
            rank_of_item[item_id as usize] = Some(rank);
        }

        Ranker { item_at_rank, rank_of_item, ptwu_in_rank_order }
    }

    pub fn size(&self) -> usize {
        self.item_at_rank.len()
    }

    pub fn rank(&self, item: u32) -> Option<usize> {
        self.rank_of_item.get(item as usize).copied().flatten()
    }

    pub fn item_at(&self, rank: usize) -> u32 {
        self.item_at_rank[rank]
    }

    pub fn ptwu_at_rank(&self, rank: usize) -> f64 {
        self.ptwu_in_rank_order[rank]
    }

    /// PTWU of a ranked item, or 0.0 if the item was excluded from the
    /// ranking entirely.
    pub fn ptwu_of(&self, item: u32) -> f64 {
        self.rank(item).map(|r| self.ptwu_at_rank(r)).unwrap_or(0.0)
    }

    /// First rank whose PTWU is >= `tau`, or `size()` if none.
    pub fn first_rank_with_ptwu_at_least(&self, tau: f64) -> usize {
        self.ptwu_in_rank_order.partition_point(|&v| v < tau)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Database, ProfitTable, Transaction};
    use crate::preprocessor::preprocess;

    #[test]
    fn ranking_orders_by_ptwu_then_item_id() {
        let mut t = Transaction::new(1);
        t.set_item(1, 1, 1.0);
        t.set_item(2, 1, 1.0);
        t.set_item(3, 1, 1.0);
        let mut profits = ProfitTable::new();
        profits.insert(1, 5.0);
        profits.insert(2, 1.0);
        profits.insert(3, 5.0);
        let db = Database::new(vec![t]);
        let idx = DenseIndex::build(&db, 3);
        let stats = preprocess(&db, &profits, &idx, false);
        let ranker = Ranker::build(&idx, &stats, 0.0);
        assert_eq!(ranker.size(), 3);
        // item 2 has the smallest PTWU (1.0), items 1 and 3 tie at 5.0 and
        // are then ordered by item id.
        assert_eq!(ranker.item_at(0), 2);
        assert_eq!(ranker.item_at(1), 1);
        assert_eq!(ranker.item_at(2), 3);
        assert_eq!(ranker.rank(1), Some(1));
    }

    #[test]
    fn zero_ptwu_items_are_excluded() {
        let mut t = Transaction::new(1);
        t.set_item(1, 1, 1.0);
        t.set_item(2, 1, 1.0);
        let mut profits = ProfitTable::new();
        profits.insert(1, 5.0);
        profits.insert(2, -5.0);
        let db = Database::new(vec![t]);
        let idx = DenseIndex::build(&db, 2);
        let stats = preprocess(&db, &profits, &idx, false);
        let ranker = Ranker::build(&idx, &stats, 0.0);
        assert_eq!(ranker.size(), 1);
        assert_eq!(ranker.rank(2), None);
    }

    #[test]
    fn first_rank_with_ptwu_at_least_is_monotone_binary_search() {
        let mut t = Transaction::new(1);
        for item in 1..=5u32 {
            t.set_item(item, 1, 1.0);
        }
        let mut profits = ProfitTable::new();
        for item in 1..=5u32 {
            profits.insert(item, item as f64);
        }
        let db = Database::new(vec![t]);
        let idx = DenseIndex::build(&db, 5);
        let stats = preprocess(&db, &profits, &idx, false);
        let ranker = Ranker::build(&idx, &stats, 0.0);
        // ptwu values in rank order are 1,2,3,4,5
        assert_eq!(ranker.first_rank_with_ptwu_at_least(3.5), 3);
        assert_eq!(ranker.first_rank_with_ptwu_at_least(0.5), 0);
        assert_eq!(ranker.first_rank_with_ptwu_at_least(100.0), 5);
    }
}
