use thiserror::Error;

/// Rejected before Phase 1 starts.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("k must be a positive integer, got {0}")]
    NonPositiveK(i64),
    #[error("minProb must lie in [0,1], got {0}")]
    MinProbOutOfRange(f64),
}

/// A violated invariant indicates a programming bug, not a data problem;
/// Never swallowed.
#[derive(Debug, Error)]
pub enum MiningError {
    #[error("UPU-list tids are not strictly ascending at index {index} in {context}")]
    NonMonotoneTids { index: usize, context: &'static str },

    #[error("EP accumulator out of bounds ({value}) in {context}")]
    EpOutOfBounds { value: f64, context: &'static str },

    #[error("joined UPU-list is empty but was not reported as such in {context}")]
    EmptyJoinInvariant { context: &'static str },
}
