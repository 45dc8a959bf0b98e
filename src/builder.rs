//! UPU-List builder: phase 1d-a emits a transient per-item
//! entry for every item in every transaction (with its rank-order suffix
//! sum of positive remaining utility); phase 1d-b groups those entries by
//! item and finalizes one UPU-List per surviving single item.

use std::collections::HashMap;

use rayon::prelude::*;

use crate::error::MiningError;
use crate::model::{Database, ProfitTable, Transaction};
use crate::numerics::{ep_from_log_complement, less_than_threshold, LOG_ZERO};
use crate::ranker::Ranker;
use crate::upu_list::UpuList;

/// One transient per-transaction, per-item entry produced in phase 1d-a.
#[derive(Debug, Clone, Copy)]
struct RawEntry {
    tid: u32,
    utility: f64,
    remaining: f64,
    log_prob: f64,
}

const LEAF_SIZE: usize = 256;
/// Adaptive-sort crossover: counting sort wins when the rank range spans
/// fewer than 4x the transaction's item count.
const COUNTING_SORT_RANGE_FACTOR: usize = 4;

/// Sorts `(rank, item)` pairs by rank ascending, choosing a counting sort
/// over buckets spanning the rank range when that range is small relative
/// to the transaction size, and a comparison sort otherwise.
fn sort_by_rank_ascending(mut entries: Vec<(usize, u32)>) -> Vec<(usize, u32)> {
    if entries.is_empty() {
        return entries;
    }
    let min_rank = entries.iter().map(|&(r, _)| r).min().unwrap();
    let max_rank = entries.iter().map(|&(r, _)| r).max().unwrap();
    let range = max_rank - min_rank + 1;
    if range < COUNTING_SORT_RANGE_FACTOR * entries.len() {
        let mut buckets: Vec<Vec<(usize, u32)>> = vec![Vec::new(); range];
        for (rank, item) in entries {
            buckets[rank - min_rank].push((rank, item));
        }
        buckets.into_iter().flatten().collect()
    } else {
        entries.sort_by_key(|&(r, _)| r);
        entries
    }
}

/// Computes, for every item in `t` that survives the ranker, its raw
/// entry: utility, rank-order suffix sum of positive remaining utility,
/// and clamped log-probability. Items absent from the ranker (unranked,
/// e.g. filtered or profit-unknown) are skipped — they can never extend a
/// qualifying prefix.
fn emit_entries_for_transaction(
    t: &Transaction,
    profits: &ProfitTable,
    ranker: &Ranker,
) -> Vec<(u32, RawEntry)> {
    let mut ranked_items: Vec<(usize, u32)> = t
        .items
        .keys()
        .filter_map(|&item| ranker.rank(item).map(|r| (r, item)))
        .collect();
    ranked_items = sort_by_rank_ascending(std::mem::take(&mut ranked_items));

    let m = ranked_items.len();
    let mut positive_utility_by_position = vec![0.0_f64; m];
    for (pos, &(_, item)) in ranked_items.iter().enumerate() {
        if let Some(profit) = profits.get(item) {
            if profit > 0.0 {
                let q = t.quantity_of(item).unwrap_or(0) as f64;
                positive_utility_by_position[pos] = profit * q;
            }
        }
    }
    // Right-to-left accumulator: suffix_sum at position p is the sum of
    // max(0, profit*q) over positions strictly greater than p.
    let mut suffix_sum = vec![0.0_f64; m];
    let mut running = 0.0_f64;
    for pos in (0..m).rev() {
        suffix_sum[pos] = running;
        running += positive_utility_by_position[pos];
    }

    ranked_items
        .into_iter()
        .enumerate()
        .map(|(pos, (_, item))| {
            let profit = profits.get(item).unwrap_or(0.0);
            let q = t.quantity_of(item).unwrap_or(0) as f64;
            let p = t.probability_of(item).unwrap_or(0.0);
            let entry = RawEntry {
                tid: t.tid,
                utility: profit * q,
                remaining: suffix_sum[pos],
                log_prob: p.ln().max(LOG_ZERO),
            };
            (item, entry)
        })
        .collect()
}

type EntryMap = HashMap<u32, Vec<RawEntry>>;

fn build_leaf_entry_map(
    transactions: &[Transaction],
    profits: &ProfitTable,
    ranker: &Ranker,
) -> EntryMap {
    let mut map: EntryMap = HashMap::new();
    for t in transactions {
        for (item, entry) in emit_entries_for_transaction(t, profits, ranker) {
            map.entry(item).or_default().push(entry);
        }
    }
    map
}

fn merge_entry_maps(mut left: EntryMap, mut right: EntryMap) -> EntryMap {
    for (item, mut entries) in right.drain() {
        left.entry(item).or_default().append(&mut entries);
    }
    left
}

fn build_entry_map_range(
    transactions: &[Transaction],
    profits: &ProfitTable,
    ranker: &Ranker,
    parallel: bool,
) -> EntryMap {
    if !parallel || transactions.len() <= LEAF_SIZE {
        return build_leaf_entry_map(transactions, profits, ranker);
    }
    let mid = transactions.len() / 2;
    let (left, right) = transactions.split_at(mid);
    let (left_map, right_map) = rayon::join(
        || build_entry_map_range(left, profits, ranker, parallel),
        || build_entry_map_range(right, profits, ranker, parallel),
    );
    merge_entry_maps(left_map, right_map)
}

/// Builds one finalized `UpuList` per surviving single item, keyed by
/// item id. Because the outer scan visits transactions in tid order, each
/// item's entry vector is naturally tid-sorted, so no extra sort is
/// needed before finalizing. An item whose single-item EP falls below
/// `min_prob` is dropped (belt-and-braces: the ranker already filtered
/// these).
pub fn build_single_item_lists(
    db: &Database,
    profits: &ProfitTable,
    ranker: &Ranker,
    min_prob: f64,
    parallel: bool,
) -> Result<HashMap<u32, UpuList>, MiningError> {
    let entry_map = build_entry_map_range(&db.transactions, profits, ranker, parallel);

    let finalize_one = |(item, entries): (u32, Vec<RawEntry>)| -> Result<Option<(u32, UpuList)>, MiningError> {
        let ptwu = ranker.ptwu_of(item);
        let mut tids = Vec::with_capacity(entries.len());
        let mut utilities = Vec::with_capacity(entries.len());
        let mut remaining = Vec::with_capacity(entries.len());
        let mut log_probs = Vec::with_capacity(entries.len());
        for e in entries {
            tids.push(e.tid);
            utilities.push(e.utility);
            remaining.push(e.remaining);
            log_probs.push(e.log_prob);
        }
        let context = "single-item UPU-list construction";
        let built = UpuList::finalize(vec![item], tids, utilities, remaining, log_probs, ptwu, context)?;
        let Some(list) = built else { return Ok(None) };
        if less_than_threshold(list.existential_probability, min_prob) {
            return Ok(None);
        }
        Ok(Some((item, list)))
    };

    if parallel {
        Ok(entry_map
            .into_par_iter()
            .map(finalize_one)
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .flatten()
            .collect())
    } else {
        Ok(entry_map
            .into_iter()
            .map(finalize_one)
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .flatten()
            .collect())
    }
}

/// Sanity helper used by tests/engine to check EP reconstruction agrees
/// with the plain product-of-complements formula for small lists.
#[cfg(test)]
fn ep_from_log_probs(log_probs: &[f64]) -> f64 {
    let mut total = 0.0;
    for &lp in log_probs {
        total = crate::numerics::accumulate_log_complement(total, lp);
    }
    ep_from_log_complement(total)
}
