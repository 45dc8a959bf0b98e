//! Probabilistic Top-K High Utility Itemset Miner over uncertain
//! transaction databases: a preprocessor, ranker, and UPU-list builder
//! feed a prefix-growth search fanned out over a work-stealing scheduler,
//! with interchangeable join and Top-K collector strategies.

pub mod builder;
pub mod cli;
pub mod collector;
pub mod engine;
pub mod error;
pub mod join;
pub mod loader;
pub mod model;
pub mod numerics;
pub mod preprocessor;
pub mod ranker;
pub mod scheduler;
pub mod search;
pub mod upu_list;

pub use collector::{BaselineCollector, Collector, LazyCollector, ShardedCollector};
pub use engine::{run_mining, CollectorKind, JoinVariant, MiningConfig, MiningOutcome, MiningReport, ParallelMode, Strategy};
pub use error::{ConfigError, MiningError};
pub use join::{BinarySearchJoin, ExponentialSearchJoin, JoinOperator, TwoPointerJoin};
pub use loader::{load_profits, load_transactions, LoadDiagnostics};
pub use model::{Database, PatternRecord, ProfitTable, Transaction};
pub use search::{BestFirstSearch, BreadthFirstSearch, DfsSearch, IddfsSearch, SearchEngine};
pub use upu_list::UpuList;
