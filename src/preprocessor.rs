//! One-pass preprocessor: builds the dense item index and the
//! per-item PTWU / log-complement aggregates in a single scan over the
//! database, with an optional `rayon::join` fork-last parallel variant.

use crate::model::Database;
use crate::numerics::log_complement;

/// Maps sparse item ids to dense indices and back. Dense indices are
/// assigned densely over the set of items that actually appear in the
/// database, so per-item aggregate arrays are proportional to the number
/// of distinct items rather than to the maximum item id.
#[derive(Debug, Clone)]
pub struct DenseIndex {
    sparse_to_dense: Vec<i64>,
    dense_to_sparse: Vec<u32>,
}

impl DenseIndex {
    /// Builds the index from every item id that appears in `db`.
    /// `max_item_id` bounds the sparse array's size.
    pub fn build(db: &Database, max_item_id: u32) -> Self {
        let mut sparse_to_dense = vec![-1_i64; max_item_id as usize + 1];
        let mut dense_to_sparse = Vec::new();
        for t in &db.transactions {
            for &item in t.items.keys() {
                let slot = &mut sparse_to_dense[item as usize];
                if *slot == -1 {
                    *slot = dense_to_sparse.len() as i64;
                    dense_to_sparse.push(item);
                }
            }
        }
        DenseIndex { sparse_to_dense, dense_to_sparse }
    }

    pub fn dense_of(&self, item: u32) -> Option<usize> {
        self.sparse_to_dense
            .get(item as usize)
            .copied()
            .filter(|&d| d >= 0)
            .map(|d| d as usize)
    }

    pub fn sparse_of(&self, dense: usize) -> u32 {
        self.dense_to_sparse[dense]
    }

    pub fn size(&self) -> usize {
        self.dense_to_sparse.len()
    }
}

/// Per-item aggregates computed once by the preprocessor and held for the
/// lifetime of the run.
#[derive(Debug, Clone)]
pub struct ItemStats {
    pub ptwu: Vec<f64>,
    pub log_complement: Vec<f64>,
}

impl ItemStats {
    fn zeroed(size: usize) -> Self {
        ItemStats { ptwu: vec![0.0; size], log_complement: vec![0.0; size] }
    }

    fn merge_from(&mut self, other: &ItemStats) {
        for i in 0..self.ptwu.len() {
            self.ptwu[i] += other.ptwu[i];
            self.log_complement[i] += other.log_complement[i];
        }
    }
}

/// Positive Transaction Utility for one transaction: the sum of
/// `profit(i) * q(i,T)` over items with strictly positive profit.
/// Negative-profit items contribute nothing, keeping PTWU a valid upper
/// bound on EU.
fn positive_transaction_utility(
    t: &crate::model::Transaction,
    profits: &crate::model::ProfitTable,
) -> f64 {
    t.items
        .iter()
        .filter_map(|(&item, occ)| {
            profits.get(item).filter(|&p| p > 0.0).map(|p| p * occ.quantity as f64)
        })
        .sum()
}

const LEAF_SIZE: usize = 256;

/// Runs the preprocessor over `db`, returning the dense index and the
/// per-item statistics. `parallel` selects the `rayon::join` fork-last
/// recursive-bisection variant; both paths produce
/// identical aggregates (summation order may differ, but transaction
/// utilities are non-negative-profit sums accumulated as plain f64 adds,
/// so results agree to the last bit in practice).
pub fn preprocess(
    db: &Database,
    profits: &crate::model::ProfitTable,
    dense_index: &DenseIndex,
    parallel: bool,
) -> ItemStats {
    let size = dense_index.size();
    if db.transactions.is_empty() {
        return ItemStats::zeroed(size);
    }
    if parallel {
        preprocess_range(&db.transactions, profits, dense_index, size)
    } else {
        preprocess_leaf(&db.transactions, profits, dense_index, size)
    }
}

fn preprocess_leaf(
    transactions: &[crate::model::Transaction],
    profits: &crate::model::ProfitTable,
    dense_index: &DenseIndex,
    size: usize,
) -> ItemStats {
    let mut stats = ItemStats::zeroed(size);
    for t in transactions {
        let ptu = positive_transaction_utility(t, profits);
        for (&item, occ) in &t.items {
            let Some(d) = dense_index.dense_of(item) else { continue };
            stats.ptwu[d] += ptu;
            stats.log_complement[d] += log_complement(occ.probability);
        }
    }
    stats
}

fn preprocess_range(
    transactions: &[crate::model::Transaction],
    profits: &crate::model::ProfitTable,
    dense_index: &DenseIndex,
    size: usize,
) -> ItemStats {
    if transactions.len() <= LEAF_SIZE {
        return preprocess_leaf(transactions, profits, dense_index, size);
    }
    let mid = transactions.len() / 2;
    let (left, right) = transactions.split_at(mid);
    // Fork-last: spawn the first half, compute the second half on this
    // worker, to avoid doubling task allocation.
    let (mut left_stats, right_stats) = rayon::join(
        || preprocess_range(left, profits, dense_index, size),
        || preprocess_range(right, profits, dense_index, size),
    );
    left_stats.merge_from(&right_stats);
    left_stats
}
