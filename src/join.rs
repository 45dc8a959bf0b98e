//! Join operator: intersects a prefix UPU-List with a
//! single-item extension list and recomputes all aggregates in one pass.
//! Three intersection mechanisms are provided behind one trait; all three
//! are required to produce bit-equal arrays and aggregates given the same
//! inputs, since each traverses `a` left-to-right and processes matches
//! in the same tid order.

use crate::error::MiningError;
use crate::numerics::{accumulate_log_complement, ep_from_log_complement, less_than_threshold, LOG_ZERO};
use crate::upu_list::UpuList;

/// A matched pair of entry indices, one into `a` and one into `b`.
struct Match {
    a_index: usize,
    b_index: usize,
}

/// Shared join semantics, parameterized only by
/// how matching (tid, tid) index pairs are found.
pub trait JoinOperator: Send + Sync {
    /// Returns the index pairs of matching transactions, in ascending tid
    /// order. Implementations differ only in how they locate matches.
    fn find_matches(&self, a: &UpuList, b: &UpuList) -> Vec<Match>;

    /// Performs the full join: the PTWU gate, intersection via
    /// `find_matches`, single-pass aggregate recomputation, and
    /// construction of the joined list for `a.items ++ [new_item]`.
    /// Returns `Err` if the joined list fails its structural invariants —
    /// a programming bug, never a data condition — so the caller can
    /// abort the run instead of admitting a corrupted candidate.
    fn join(
        &self,
        a: &UpuList,
        b: &UpuList,
        theta: f64,
        new_item: u32,
    ) -> Result<Option<UpuList>, MiningError> {
        let joined_ptwu = a.ptwu.min(b.ptwu);
        if less_than_threshold(joined_ptwu, theta) {
            return Ok(None);
        }

        let matches = self.find_matches(a, b);
        if matches.is_empty() {
            return Ok(None);
        }

        let n = matches.len();
        let mut tids = Vec::with_capacity(n);
        let mut utilities = Vec::with_capacity(n);
        let mut remaining = Vec::with_capacity(n);
        let mut log_probabilities = Vec::with_capacity(n);

        for m in &matches {
            tids.push(a.tids[m.a_index]);
            utilities.push(a.utilities[m.a_index] + b.utilities[m.b_index]);
            remaining.push(a.remaining_utilities[m.a_index].min(b.remaining_utilities[m.b_index]));
            log_probabilities.push(a.log_probabilities[m.a_index] + b.log_probabilities[m.b_index]);
        }

        let mut items = a.items.clone();
        items.push(new_item);
        items.sort_unstable();

        UpuList::finalize(items, tids, utilities, remaining, log_probabilities, joined_ptwu, "join operator")
    }
}

/// Reference and default: O(|A|+|B|) two-pointer merge.
#[derive(Debug, Default, Clone, Copy)]
pub struct TwoPointerJoin;

impl JoinOperator for TwoPointerJoin {
    fn find_matches(&self, a: &UpuList, b: &UpuList) -> Vec<Match> {
        let mut out = Vec::new();
        let (mut ai, mut bi) = (0, 0);
        while ai < a.len() && bi < b.len() {
            match a.tids[ai].cmp(&b.tids[bi]) {
                std::cmp::Ordering::Equal => {
                    out.push(Match { a_index: ai, b_index: bi });
                    ai += 1;
                    bi += 1;
                }
                std::cmp::Ordering::Less => ai += 1,
                std::cmp::Ordering::Greater => bi += 1,
            }
        }
        out
    }
}

/// Exponential/galloping search from a remembered cursor into `b`: for
/// each `a` entry, doubles the search window in `b` starting at the last
/// found position until it brackets the target tid, then binary searches
/// within the bracket. Wins over two-pointer when `b` is much larger than
/// the run of `a` entries between matches.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExponentialSearchJoin;

impl JoinOperator for ExponentialSearchJoin {
    fn find_matches(&self, a: &UpuList, b: &UpuList) -> Vec<Match> {
        let mut out = Vec::new();
        let mut cursor = 0usize;
        for ai in 0..a.len() {
            let target = a.tids[ai];
            if cursor >= b.len() || b.tids[cursor] > target {
                continue;
            }
            let mut bound = 1usize;
            while cursor + bound < b.len() && b.tids[cursor + bound] < target {
                bound *= 2;
            }
            let lo = cursor + bound / 2;
            let hi = (cursor + bound).min(b.len());
            match b.tids[lo..hi].binary_search(&target) {
                Ok(offset) => {
                    let bi = lo + offset;
                    out.push(Match { a_index: ai, b_index: bi });
                    cursor = bi + 1;
                }
                Err(offset) => {
                    cursor = lo + offset;
                }
            }
        }
        out
    }
}

/// Binary search per `a` entry into the whole of `b`. Simplest to reason
/// about; O(|A| log |B|).
#[derive(Debug, Default, Clone, Copy)]
pub struct BinarySearchJoin;

impl JoinOperator for BinarySearchJoin {
    fn find_matches(&self, a: &UpuList, b: &UpuList) -> Vec<Match> {
        let mut out = Vec::new();
        for ai in 0..a.len() {
            if let Ok(bi) = b.tids.binary_search(&a.tids[ai]) {
                out.push(Match { a_index: ai, b_index: bi });
            }
        }
        out
    }
}

/// Recomputes a candidate's aggregates directly, independent of any
/// `JoinOperator`; used by invariant checks and tests to cross-validate
/// the accumulation in `UpuList::finalize` against the per-transaction
/// arrays it was built from.
pub fn recompute_ep(list: &UpuList) -> f64 {
    let mut total = 0.0;
    for &lp in &list.log_probabilities {
        total = accumulate_log_complement(total, lp.max(LOG_ZERO));
    }
    ep_from_log_complement(total)
}
