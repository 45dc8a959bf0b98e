//! Mining entry point: wires the preprocessor, ranker, builder, prefix
//! scheduler, chosen search engine, join variant, and collector variant
//! together into the three-phase pipeline, and reports per-phase timing
//! and counts alongside the final pattern list.

use std::time::{Duration, Instant};

use log::{debug, info};

use crate::builder::build_single_item_lists;
use crate::collector::{BaselineCollector, Collector, LazyCollector, ShardedCollector};
use crate::error::ConfigError;
use crate::join::{BinarySearchJoin, ExponentialSearchJoin, JoinOperator, TwoPointerJoin};
use crate::model::{Database, PatternRecord, ProfitTable};
use crate::preprocessor::{preprocess, DenseIndex};
use crate::ranker::Ranker;
use crate::scheduler::{schedule_range, seed_collector};
use crate::search::{
    BestFirstSearch, BreadthFirstSearch, DfsSearch, IddfsSearch, NodeCounters, SearchContext, SearchEngine,
};

/// Whether to run the fork-join/`par_iter` paths or their plain sequential
/// equivalents. Threaded through every phase from one flag so
/// `--no-parallel` is a genuine code path rather than a thread-count knob.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParallelMode {
    Sequential,
    Parallel,
}

impl ParallelMode {
    fn is_parallel(self) -> bool {
        matches!(self, ParallelMode::Parallel)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Dfs,
    BestFirst,
    BreadthFirst,
    Iddfs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinVariant {
    TwoPointer,
    ExponentialSearch,
    BinarySearch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectorKind {
    Baseline,
    Sharded,
    Lazy,
}

/// Shard count used when `CollectorKind::Sharded` is selected. Not exposed
/// on the CLI; a fixed value is plenty for the workloads this crate
/// targets and keeps the collector selection surface to one flag.
const SHARD_COUNT: usize = 8;

#[derive(Debug, Clone)]
pub struct MiningConfig {
    pub k: usize,
    pub min_prob: f64,
    pub strategy: Strategy,
    pub join_variant: JoinVariant,
    pub collector_kind: CollectorKind,
    pub parallel: ParallelMode,
}

impl MiningConfig {
    /// Rejects a non-positive k or an out-of-range min_prob before Phase 1
    /// ever runs.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.k == 0 {
            return Err(ConfigError::NonPositiveK(0));
        }
        if !(0.0..=1.0).contains(&self.min_prob) {
            return Err(ConfigError::MinProbOutOfRange(self.min_prob));
        }
        Ok(())
    }
}

/// Per-phase timings and counts, useful for benchmarking and diagnostics;
/// not part of the mining semantics itself.
#[derive(Debug, Clone, Default)]
pub struct MiningReport {
    pub transactions_scanned: usize,
    pub items_surviving_ranker: usize,
    pub single_item_lists: usize,
    pub preprocessing_time: Duration,
    pub ranking_time: Duration,
    pub building_time: Duration,
    pub mining_time: Duration,
    pub final_admission_threshold: f64,
    pub nodes_explored: usize,
    pub nodes_pruned_by_ep: usize,
    pub nodes_pruned_by_ptwu: usize,
    pub nodes_pruned_by_pub: usize,
}

pub struct MiningOutcome {
    pub patterns: Vec<PatternRecord>,
    pub report: MiningReport,
}

/// Runs the full three-phase pipeline and returns the ordered patterns
/// plus the run's observability report. A `ConfigError` aborts before
/// Phase 1 ever runs; a `MiningError` aborts mid-run if a candidate fails
/// its structural invariants — both surface to the caller as one
/// `anyhow::Error` since this is the outermost boundary of the mining
/// pipeline.
pub fn run_mining(db: &Database, profits: &ProfitTable, config: &MiningConfig) -> anyhow::Result<MiningOutcome> {
    config.validate()?;
    let parallel = config.parallel.is_parallel();
    let mut report = MiningReport { transactions_scanned: db.len(), ..Default::default() };

    let max_item_id = db.max_item_id().unwrap_or(0).max(profits.max_item_id().unwrap_or(0));

    let t0 = Instant::now();
    let dense_index = DenseIndex::build(db, max_item_id);
    let stats = preprocess(db, profits, &dense_index, parallel);
    report.preprocessing_time = t0.elapsed();
    info!("preprocessing done in {:?} over {} transactions", report.preprocessing_time, db.len());

    let t1 = Instant::now();
    let ranker = Ranker::build(&dense_index, &stats, config.min_prob);
    report.ranking_time = t1.elapsed();
    report.items_surviving_ranker = ranker.size();
    debug!("ranker retained {} of {} distinct items", ranker.size(), dense_index.size());

    let t2 = Instant::now();
    let single_item_lists = build_single_item_lists(db, profits, &ranker, config.min_prob, parallel)?;
    report.building_time = t2.elapsed();
    report.single_item_lists = single_item_lists.len();
    info!("built {} single-item UPU-lists in {:?}", single_item_lists.len(), report.building_time);

    // Phase 2/3 barrier: every collector variant needs the full single-item
    // set seeded before any multi-item extension is explored, since the
    // admission threshold a Phase-3 worker reads must already reflect every
    // single-item candidate.
    let t3 = Instant::now();
    let join_operator: Box<dyn JoinOperator> = match config.join_variant {
        JoinVariant::TwoPointer => Box::new(TwoPointerJoin),
        JoinVariant::ExponentialSearch => Box::new(ExponentialSearchJoin),
        JoinVariant::BinarySearch => Box::new(BinarySearchJoin),
    };
    let collector: Box<dyn Collector> = match config.collector_kind {
        CollectorKind::Baseline => Box::new(BaselineCollector::new(config.k)),
        CollectorKind::Sharded => Box::new(ShardedCollector::new(config.k, SHARD_COUNT)),
        CollectorKind::Lazy => Box::new(LazyCollector::new(config.k)),
    };
    seed_collector(collector.as_ref(), &single_item_lists);

    let engine: Box<dyn SearchEngine> = match config.strategy {
        Strategy::Dfs => Box::new(DfsSearch),
        Strategy::BestFirst => Box::new(BestFirstSearch),
        Strategy::BreadthFirst => Box::new(BreadthFirstSearch),
        Strategy::Iddfs => Box::new(IddfsSearch),
    };

    let counters = NodeCounters::default();
    let ctx = SearchContext {
        ranker: &ranker,
        single_item_lists: &single_item_lists,
        join_operator: join_operator.as_ref(),
        collector: collector.as_ref(),
        min_prob: config.min_prob,
        counters: &counters,
    };

    let mine_one = |rank: usize| -> Result<(), crate::error::MiningError> {
        let item = ranker.item_at(rank);
        if let Some(prefix) = single_item_lists.get(&item) {
            engine.explore_extensions(&ctx, prefix, rank + 1)?;
        }
        Ok(())
    };
    schedule_range(&ranker, 0, ranker.size(), parallel, &mine_one)?;
    report.mining_time = t3.elapsed();
    report.final_admission_threshold = collector.admission_threshold();
    report.nodes_explored = counters.explored_count();
    report.nodes_pruned_by_ep = counters.pruned_by_ep_count();
    report.nodes_pruned_by_ptwu = counters.pruned_by_ptwu_count();
    report.nodes_pruned_by_pub = counters.pruned_by_pub_count();
    info!(
        "mining finished in {:?}, final threshold={}, nodes explored={}",
        report.mining_time, report.final_admission_threshold, report.nodes_explored
    );

    Ok(MiningOutcome { patterns: collector.snapshot(), report })
}
