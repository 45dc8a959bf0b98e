//! Prefix scheduler: recursively bisects the root prefix range
//! `[0, N)`, fork-last, splitting above a fine-grain threshold at the
//! point where half the accumulated PTWU of the range has been consumed
//! — so that high-PTWU prefixes (whose subtrees are dramatically larger)
//! don't starve the rest of the pool.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::MiningError;
use crate::ranker::Ranker;
use crate::upu_list::UpuList;

/// Mines root prefixes `[0, N)` should not touch directly; the task unit
/// is an explicit closure so the scheduler stays independent of which
/// search strategy mines each prefix.
pub const FINE_GRAIN_THRESHOLD: usize = 16;

/// Recursively schedules `mine_one(rank)` over every rank in
/// `[start, end)`, choosing a PTWU-weighted split point above the
/// fine-grain threshold and falling back to the midpoint when the range's
/// total PTWU is zero. `parallel` selects the `rayon::join` fork-last
/// variant; sequential execution simply iterates. Aborts and returns the
/// first `MiningError` observed — remaining sibling tasks already spawned
/// still run to completion, but their results are discarded once an error
/// has been recorded.
pub fn schedule_range<F>(
    ranker: &Ranker,
    start: usize,
    end: usize,
    parallel: bool,
    mine_one: &F,
) -> Result<(), MiningError>
where
    F: Fn(usize) -> Result<(), MiningError> + Sync,
{
    if start >= end {
        return Ok(());
    }
    if end - start <= 1 {
        return mine_one(start);
    }
    if !parallel {
        for rank in start..end {
            mine_one(rank)?;
        }
        return Ok(());
    }
    if end - start <= FINE_GRAIN_THRESHOLD {
        // One subtask per prefix: rayon's own work-stealing pool handles
        // distribution once each is a separate scope task. `scope.spawn`
        // closures can't return a value, so the first error observed is
        // recorded into a shared slot instead.
        let first_error: Mutex<Option<MiningError>> = Mutex::new(None);
        rayon::scope(|scope| {
            for rank in start..end {
                let first_error = &first_error;
                scope.spawn(move |_| {
                    if let Err(e) = mine_one(rank) {
                        let mut slot = first_error.lock().unwrap();
                        if slot.is_none() {
                            *slot = Some(e);
                        }
                    }
                });
            }
        });
        return match first_error.into_inner().unwrap() {
            Some(e) => Err(e),
            None => Ok(()),
        };
    }

    let split = ptwu_weighted_split(ranker, start, end);
    // Fork-last: spawn the first half, compute the second half on this
    // worker thread. Both halves always run; the first error between the
    // two (left takes priority) is the one returned.
    let (left, right) = rayon::join(
        || schedule_range(ranker, start, split, parallel, mine_one),
        || schedule_range(ranker, split, end, parallel, mine_one),
    );
    left.and(right)
}

/// Walks `[start, end)` accumulating PTWU until half the range's total is
/// reached, returning the rank at which to split. Falls back to the
/// midpoint if the total PTWU over the range is zero (pathological, since
/// the ranker already excludes zero-PTWU items, but any rank subrange
/// could still sum to zero if every entry underflowed to exactly 0.0).
fn ptwu_weighted_split(ranker: &Ranker, start: usize, end: usize) -> usize {
    let total: f64 = (start..end).map(|r| ranker.ptwu_at_rank(r)).sum();
    if total <= 0.0 {
        return start + (end - start) / 2;
    }
    let half = total / 2.0;
    let mut running = 0.0;
    for rank in start..end {
        running += ranker.ptwu_at_rank(rank);
        if running >= half {
            // Never split at `start` itself, and never leave the right
            // half empty.
            return (rank + 1).clamp(start + 1, end - 1);
        }
    }
    start + (end - start) / 2
}

/// Phase-2 seeding: feeds every surviving single-item UPU-List to the
/// collector before Phase 3 begins, the data-flow barrier between
/// Phase 1/2 and Phase 3.
pub fn seed_collector<C: crate::collector::Collector + ?Sized>(
    collector: &C,
    single_item_lists: &HashMap<u32, UpuList>,
) {
    for list in single_item_lists.values() {
        collector.try_admit(list);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use crate::model::{Database, ProfitTable, Transaction};
    use crate::preprocessor::{preprocess, DenseIndex};

    fn ranker_with_ptwus(ptwus: &[f64]) -> Ranker {
        let mut db_transactions = Vec::new();
        let mut profits = ProfitTable::new();
        for (i, &p) in ptwus.iter().enumerate() {
            let mut t = Transaction::new(i as u32);
            t.set_item(i as u32, 1, 0.5);
            profits.insert(i as u32, p);
            db_transactions.push(t);
        }
        let db = Database::new(db_transactions);
        let idx = DenseIndex::build(&db, ptwus.len() as u32 - 1);
        let stats = preprocess(&db, &profits, &idx, false);
        Ranker::build(&idx, &stats, 0.0)
    }

    #[test]
    fn every_rank_in_range_is_visited_exactly_once_sequentially() {
        let ranker = ranker_with_ptwus(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let visited = Mutex::new(Vec::new());
        schedule_range(&ranker, 0, 5, false, &|rank| {
            visited.lock().unwrap().push(rank);
            Ok(())
        })
        .unwrap();
        let mut v = visited.into_inner().unwrap();
        v.sort_unstable();
        assert_eq!(v, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn every_rank_in_range_is_visited_exactly_once_in_parallel() {
        let ptwus: Vec<f64> = (0..40).map(|i| (i as f64) + 1.0).collect();
        let ranker = ranker_with_ptwus(&ptwus);
        let count = AtomicUsize::new(0);
        let seen = Mutex::new(vec![false; 40]);
        schedule_range(&ranker, 0, 40, true, &|rank| {
            seen.lock().unwrap()[rank] = true;
            count.fetch_add(1, Ordering::Relaxed);
            Ok(())
        })
        .unwrap();
        assert_eq!(count.load(Ordering::Relaxed), 40);
        assert!(seen.into_inner().unwrap().iter().all(|&b| b));
    }

    #[test]
    fn split_falls_back_to_midpoint_when_total_ptwu_is_zero() {
        let ranker = ranker_with_ptwus(&[0.0001, 0.0001, 0.0001, 0.0001]);
        // Force a degenerate all-zero-range case by probing split logic
        // directly with an empty slice's worth of PTWU sum (simulated via
        // a single-item range, which always returns start+1 by construction).
        let split = ptwu_weighted_split(&ranker, 0, 4);
        assert!(split > 0 && split < 4);
    }
}
