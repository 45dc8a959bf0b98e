//! End-to-end scenarios A-F, run through the full `run_mining` pipeline
//! (loader-free: these build `Database`/`ProfitTable` directly, since file
//! parsing is `loader.rs`'s own concern).

mod common;

use ptk_huim::{
    BaselineCollector, Collector, CollectorKind, JoinVariant, MiningConfig, ParallelMode, Strategy,
};

fn find<'a>(
    patterns: &'a [ptk_huim::PatternRecord],
    items: &[u32],
) -> Option<&'a ptk_huim::PatternRecord> {
    patterns.iter().find(|p| p.items == items)
}

fn base_config(k: usize, min_prob: f64) -> MiningConfig {
    MiningConfig {
        k,
        min_prob,
        strategy: Strategy::Dfs,
        join_variant: JoinVariant::TwoPointer,
        collector_kind: CollectorKind::Baseline,
        parallel: ParallelMode::Sequential,
    }
}

#[test]
fn scenario_a_worked_example() {
    let (db, profits) = common::scenario_a();
    let config = base_config(3, 0.1);
    let outcome = ptk_huim::run_mining(&db, &profits, &config).unwrap();

    let a = find(&outcome.patterns, &[1]).expect("{A} present");
    assert!((a.expected_utility - 37.0).abs() < 1e-6);
    assert!((a.existential_probability - 0.94).abs() < 1e-6);

    let ab = find(&outcome.patterns, &[1, 2]).expect("{A,B} present");
    assert!((ab.expected_utility - 25.2).abs() < 1e-6);
    assert!((ab.existential_probability - 0.72).abs() < 1e-6);

    let ac = find(&outcome.patterns, &[1, 3]).expect("{A,C} present");
    assert!((ac.expected_utility - 16.8).abs() < 1e-6);
    assert!((ac.existential_probability - 0.42).abs() < 1e-6);
}

#[test]
fn scenario_b_negative_profit_does_not_inflate_ptwu() {
    let (db, profits) = common::scenario_b();
    let config = base_config(1, 0.0);
    let outcome = ptk_huim::run_mining(&db, &profits, &config).unwrap();

    assert_eq!(outcome.patterns.len(), 1);
    let a = &outcome.patterns[0];
    assert_eq!(a.items, vec![1]);
    assert!((a.expected_utility - 10.0).abs() < 1e-9);
    // {A,B} would have EU = -90 and must never be the retained top-1.
    assert!(find(&outcome.patterns, &[1, 2]).is_none());
}

#[test]
fn scenario_c_probability_underflow_reports_ep_as_one() {
    let (db, profits) = common::scenario_c();
    let config = base_config(1, 0.99);
    let outcome = ptk_huim::run_mining(&db, &profits, &config).unwrap();

    assert_eq!(outcome.patterns.len(), 1);
    let a = &outcome.patterns[0];
    assert_eq!(a.items, vec![1]);
    assert!((a.existential_probability - 1.0).abs() < 1e-12);
}

#[test]
fn scenario_d_duplicate_itemset_admission_is_order_independent() {
    // Exercised directly against the collector, since this scenario is
    // about the Top-K admission contract rather than the mining search.
    let low = build_candidate(vec![1, 2], 10.0, 0.5);
    let high = build_candidate(vec![1, 2], 50.0, 0.5);

    let arrival_low_then_high = BaselineCollector::new(5);
    assert!(arrival_low_then_high.try_admit(&low));
    assert!(arrival_low_then_high.try_admit(&high));
    assert_eq!(arrival_low_then_high.snapshot().len(), 1);
    assert_eq!(arrival_low_then_high.snapshot()[0].expected_utility, 50.0);

    let arrival_high_then_low = BaselineCollector::new(5);
    assert!(arrival_high_then_low.try_admit(&high));
    assert!(!arrival_high_then_low.try_admit(&low));
    assert_eq!(arrival_high_then_low.snapshot().len(), 1);
    assert_eq!(arrival_high_then_low.snapshot()[0].expected_utility, 50.0);
}

fn build_candidate(items: Vec<u32>, eu: f64, ep: f64) -> ptk_huim::UpuList {
    ptk_huim::UpuList {
        items,
        tids: vec![1],
        utilities: vec![eu],
        remaining_utilities: vec![0.0],
        log_probabilities: vec![ep.ln()],
        ptwu: eu.max(0.0) + 1.0,
        expected_utility: eu,
        existential_probability: ep,
        positive_upper_bound: eu.max(0.0),
    }
}

#[test]
fn scenario_e_threshold_monotonicity_stress_best_first_vs_dfs() {
    let (db, profits) = common::synthetic_database(300, 14, 42);

    let dfs_config = MiningConfig { strategy: Strategy::Dfs, ..base_config(10, 0.05) };
    let bf_config = MiningConfig { strategy: Strategy::BestFirst, ..base_config(10, 0.05) };

    let dfs_outcome = ptk_huim::run_mining(&db, &profits, &dfs_config).unwrap();
    let bf_outcome = ptk_huim::run_mining(&db, &profits, &bf_config).unwrap();

    let mut dfs_items: Vec<Vec<u32>> = dfs_outcome.patterns.iter().map(|p| p.items.clone()).collect();
    let mut bf_items: Vec<Vec<u32>> = bf_outcome.patterns.iter().map(|p| p.items.clone()).collect();
    dfs_items.sort();
    bf_items.sort();
    assert_eq!(dfs_items, bf_items, "DFS and best-first must enumerate the same snapshot");

    for outcome in [&dfs_outcome, &bf_outcome] {
        assert!(outcome.report.final_admission_threshold >= 0.0);
    }
}

#[test]
fn scenario_f_join_variant_equivalence_on_a_larger_database() {
    let (db, profits) = common::synthetic_database(1000, 55, 7);
    let variants = [JoinVariant::TwoPointer, JoinVariant::ExponentialSearch, JoinVariant::BinarySearch];

    let mut snapshots = Vec::new();
    for &join_variant in &variants {
        let config = MiningConfig { join_variant, ..base_config(10, 0.05) };
        let outcome = ptk_huim::run_mining(&db, &profits, &config).unwrap();
        let mut pairs: Vec<(Vec<u32>, f64, f64)> = outcome
            .patterns
            .iter()
            .map(|p| (p.items.clone(), p.expected_utility, p.existential_probability))
            .collect();
        pairs.sort_by(|a, b| a.0.cmp(&b.0));
        snapshots.push(pairs);
    }

    for window in snapshots.windows(2) {
        assert_eq!(window[0].len(), window[1].len());
        for (a, b) in window[0].iter().zip(window[1].iter()) {
            assert_eq!(a.0, b.0, "join variants must agree on itemset identity");
            assert!((a.1 - b.1).abs() < 1e-6, "EU mismatch between join variants: {:?} vs {:?}", a, b);
            assert!((a.2 - b.2).abs() < 1e-6, "EP mismatch between join variants: {:?} vs {:?}", a, b);
        }
    }
}

#[test]
fn no_parallel_and_parallel_modes_agree_on_a_synthetic_database() {
    let (db, profits) = common::synthetic_database(600, 20, 99);
    let seq_config = base_config(8, 0.05);
    let par_config = MiningConfig { parallel: ParallelMode::Parallel, ..base_config(8, 0.05) };

    let seq = ptk_huim::run_mining(&db, &profits, &seq_config).unwrap();
    let par = ptk_huim::run_mining(&db, &profits, &par_config).unwrap();

    let mut seq_items: Vec<Vec<u32>> = seq.patterns.iter().map(|p| p.items.clone()).collect();
    let mut par_items: Vec<Vec<u32>> = par.patterns.iter().map(|p| p.items.clone()).collect();
    seq_items.sort();
    par_items.sort();
    assert_eq!(seq_items, par_items);
}
