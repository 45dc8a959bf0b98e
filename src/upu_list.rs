//! The UPU-List: the columnar per-itemset projection structure
//! that makes the join operator's single linear pass possible. Immutable
//! after construction; single-item lists live for the whole run, joined
//! lists are owned by the worker that built them and dropped when the
//! search call returns.

use crate::error::MiningError;
use crate::numerics::{accumulate_log_complement, ep_from_log_complement, LOG_ZERO};

/// One UPU-List: four parallel arrays of equal length, one entry per
/// transaction containing the itemset, plus four pre-aggregated scalars.
#[derive(Debug, Clone)]
pub struct UpuList {
    /// The itemset this list represents, sorted ascending by item id.
    pub items: Vec<u32>,
    pub tids: Vec<u32>,
    pub utilities: Vec<f64>,
    pub remaining_utilities: Vec<f64>,
    pub log_probabilities: Vec<f64>,
    pub ptwu: f64,
    pub expected_utility: f64,
    pub existential_probability: f64,
    pub positive_upper_bound: f64,
}

impl UpuList {
    /// Entry count, i.e. the number of transactions containing this
    /// itemset.
    pub fn len(&self) -> usize {
        self.tids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tids.is_empty()
    }

    /// Checks the structural invariants every UPU-List must satisfy:
    /// non-empty, strictly ascending tids, and aggregates consistent with
    /// the per-transaction arrays. Called after construction and after
    /// every join; any failure here is a programming bug (an internal invariant
    /// category 3), never a data problem.
    pub fn check_invariants(&self, context: &'static str) -> Result<(), MiningError> {
        if self.tids.is_empty() {
            return Err(MiningError::EmptyJoinInvariant { context });
        }
        for w in self.tids.windows(2) {
            if w[0] >= w[1] {
                return Err(MiningError::NonMonotoneTids { index: 1, context });
            }
        }
        let expected_eu: f64 = self
            .utilities
            .iter()
            .zip(&self.log_probabilities)
            .map(|(&u, &lp)| u * lp.exp())
            .sum();
        if (expected_eu - self.expected_utility).abs() > 1e-6 * expected_eu.abs().max(1.0) {
            return Err(MiningError::EpOutOfBounds { value: self.expected_utility, context });
        }
        if self.positive_upper_bound + 1e-9 < self.expected_utility {
            return Err(MiningError::EpOutOfBounds { value: self.positive_upper_bound, context });
        }
        Ok(())
    }

    /// Builds and finalizes a single-item or joined UPU-List from raw
    /// per-transaction components, computing the four aggregate scalars
    /// in one linear pass over the arrays (the same
    /// accumulation rules shared with the join operator). Checks the
    /// structural invariants before returning, so a corrupted list can
    /// never reach the collector or a downstream join; `context`
    /// identifies the call site in the resulting diagnostic.
    pub fn finalize(
        items: Vec<u32>,
        tids: Vec<u32>,
        utilities: Vec<f64>,
        remaining_utilities: Vec<f64>,
        log_probabilities: Vec<f64>,
        ptwu: f64,
        context: &'static str,
    ) -> Result<Option<UpuList>, MiningError> {
        if tids.is_empty() {
            return Ok(None);
        }
        let mut expected_utility = 0.0;
        let mut positive_upper_bound = 0.0;
        let mut log_complement_total = 0.0;
        for i in 0..tids.len() {
            let lp = log_probabilities[i].max(LOG_ZERO);
            let p = lp.exp();
            expected_utility += utilities[i] * p;
            positive_upper_bound += p * (utilities[i] + remaining_utilities[i]).max(0.0);
            log_complement_total = accumulate_log_complement(log_complement_total, lp);
        }
        let existential_probability = ep_from_log_complement(log_complement_total);
        let list = UpuList {
            items,
            tids,
            utilities,
            remaining_utilities,
            log_probabilities,
            ptwu,
            expected_utility,
            existential_probability,
            positive_upper_bound,
        };
        list.check_invariants(context)?;
        Ok(Some(list))
    }
}
