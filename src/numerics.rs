//! Numerical primitives: log-space helpers and epsilon-tolerant comparisons.
//! Every probability that flows through a UPU-List is carried as a
//! log-complement accumulator to avoid underflow on long transaction
//! databases with near-certain items.

/// Tolerance applied to every threshold comparison in the pipeline.
pub const EPSILON: f64 = 1e-10;

/// Floor for any accumulated log value; keeps values above subnormal range.
pub const LOG_ZERO: f64 = -700.0;

/// `true` iff `a` is strictly less than `b` once epsilon tolerance is applied.
#[inline]
pub fn less_than_threshold(a: f64, b: f64) -> bool {
    a < b - EPSILON
}

/// `log(1 - p)`, computed in whichever stable form suits the magnitude of `p`.
///
/// Returns 0 for `p <= 0` (no occurrence contributes nothing), `LOG_ZERO`
/// for `p >= 1` (certain occurrence saturates the complement to zero), and
/// otherwise `log1p(-p)` below 0.5 (stable near zero) or `log(1-p)` above.
pub fn log_complement(p: f64) -> f64 {
    if p <= 0.0 {
        0.0
    } else if p >= 1.0 {
        LOG_ZERO
    } else if p < 0.5 {
        p.ln_1p_neg_stable()
    } else {
        (1.0 - p).ln()
    }
}

/// Small helper trait so the stable-near-zero branch above reads as a
/// single expression rather than an inline `(-p).ln_1p()`.
trait LnOnePlusNegStable {
    fn ln_1p_neg_stable(self) -> f64;
}

impl LnOnePlusNegStable for f64 {
    #[inline]
    fn ln_1p_neg_stable(self) -> f64 {
        (-self).ln_1p()
    }
}

/// Reconstructs EP = 1 - exp(L) from an accumulated log-complement `l`,
/// clamping to 1.0 once `l` has saturated to `LOG_ZERO` or below.
pub fn ep_from_log_complement(l: f64) -> f64 {
    if l <= LOG_ZERO {
        1.0
    } else {
        1.0 - l.exp()
    }
}

/// Accumulates one transaction's contribution to an EP log-complement
/// total, applying the saturation rule: once a single transaction's joint
/// log-probability is close enough to certain (`log P > log(1-EPSILON)`),
/// the complement for that transaction is treated as exactly zero and the
/// running total is clamped to `LOG_ZERO`.
pub fn accumulate_log_complement(running_total: f64, log_prob_this_tid: f64) -> f64 {
    if running_total <= LOG_ZERO {
        return LOG_ZERO;
    }
    let saturation_bound = (1.0 - EPSILON).ln();
    if log_prob_this_tid > saturation_bound {
        return LOG_ZERO;
    }
    let p = log_prob_this_tid.exp();
    let contribution = log_complement(p);
    let total = running_total + contribution;
    if total <= LOG_ZERO {
        LOG_ZERO
    } else {
        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_complement_boundaries() {
        assert_eq!(log_complement(0.0), 0.0);
        assert_eq!(log_complement(-1.0), 0.0);
        assert_eq!(log_complement(1.0), LOG_ZERO);
        assert_eq!(log_complement(2.0), LOG_ZERO);
    }

    #[test]
    fn log_complement_matches_direct_formula_away_from_extremes() {
        for &p in &[0.1, 0.3, 0.5, 0.7, 0.9, 0.99] {
            let direct = (1.0 - p).ln();
            assert!((log_complement(p) - direct).abs() < 1e-9, "p={p}");
        }
    }

    #[test]
    fn ep_from_log_complement_roundtrips() {
        let l = log_complement(0.3);
        let ep = ep_from_log_complement(l);
        assert!((ep - 0.3).abs() < 1e-9);
    }

    #[test]
    fn ep_from_log_complement_saturates_at_one() {
        assert_eq!(ep_from_log_complement(LOG_ZERO - 1.0), 1.0);
        assert_eq!(ep_from_log_complement(LOG_ZERO), 1.0);
    }

    #[test]
    fn accumulate_saturates_on_near_certain_transaction() {
        // log(0.999999999999) is just barely below the saturation bound;
        // a transaction with a probability essentially equal to 1 should
        // push the accumulator straight to LOG_ZERO.
        let lp = (1.0_f64).ln();
        let total = accumulate_log_complement(0.0, lp);
        assert_eq!(total, LOG_ZERO);
    }

    #[test]
    fn accumulate_over_many_high_probability_transactions_saturates_ep_to_one() {
        // Scenario C: 2000 transactions with p=0.999 each.
        let lp = 0.999_f64.ln();
        let mut total = 0.0;
        for _ in 0..2000 {
            total = accumulate_log_complement(total, lp);
        }
        let ep = ep_from_log_complement(total);
        assert!((ep - 1.0).abs() < 1e-12);
    }

    #[test]
    fn less_than_threshold_applies_epsilon() {
        assert!(!less_than_threshold(5.0, 5.0));
        assert!(!less_than_threshold(5.0 - EPSILON / 2.0, 5.0));
        assert!(less_than_threshold(5.0 - EPSILON * 2.0, 5.0));
    }
}
