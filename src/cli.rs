//! Command-line argument surface, built on `clap`'s derive API, which
//! validates the enum flags this CLI needs (`--strategy`, `--join`,
//! `--collector`) without hand-written matching.

use clap::{Parser, ValueEnum};

use crate::engine::{CollectorKind, JoinVariant, Strategy};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StrategyArg {
    Dfs,
    BestFirst,
    BreadthFirst,
    Iddfs,
}

impl From<StrategyArg> for Strategy {
    fn from(value: StrategyArg) -> Self {
        match value {
            StrategyArg::Dfs => Strategy::Dfs,
            StrategyArg::BestFirst => Strategy::BestFirst,
            StrategyArg::BreadthFirst => Strategy::BreadthFirst,
            StrategyArg::Iddfs => Strategy::Iddfs,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum JoinArg {
    TwoPointer,
    ExponentialSearch,
    BinarySearch,
}

impl From<JoinArg> for JoinVariant {
    fn from(value: JoinArg) -> Self {
        match value {
            JoinArg::TwoPointer => JoinVariant::TwoPointer,
            JoinArg::ExponentialSearch => JoinVariant::ExponentialSearch,
            JoinArg::BinarySearch => JoinVariant::BinarySearch,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CollectorArg {
    Baseline,
    Sharded,
    Lazy,
}

impl From<CollectorArg> for CollectorKind {
    fn from(value: CollectorArg) -> Self {
        match value {
            CollectorArg::Baseline => CollectorKind::Baseline,
            CollectorArg::Sharded => CollectorKind::Sharded,
            CollectorArg::Lazy => CollectorKind::Lazy,
        }
    }
}

/// Probabilistic top-K high-utility itemset miner.
#[derive(Debug, Parser)]
#[command(name = "ptk-huim", version)]
pub struct Arguments {
    /// Path to the transaction database file.
    pub database: String,

    /// Path to the item profit table file.
    pub profits: String,

    /// Number of top itemsets to retain.
    pub k: i64,

    /// Minimum existential probability an itemset must meet.
    pub min_prob: f64,

    /// Enables verbose (debug-level) logging.
    #[arg(long)]
    pub debug: bool,

    /// Writes the mined patterns to this file instead of stdout.
    #[arg(long)]
    pub output: Option<String>,

    /// Disables the parallel code path; runs every phase sequentially.
    #[arg(long)]
    pub no_parallel: bool,

    #[arg(long, value_enum, default_value = "dfs")]
    pub strategy: StrategyArg,

    #[arg(long, value_enum, default_value = "two-pointer")]
    pub join: JoinArg,

    #[arg(long, value_enum, default_value = "baseline")]
    pub collector: CollectorArg,
}
