//! Shared synthetic-database helpers for the integration tests in this
//! directory. Not a test module itself (no `#[test]` here), just the
//! fixtures scenarios A-F and the differential-equivalence tests build on.

use ptk_huim::{Database, ProfitTable, Transaction};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Scenario A: the worked example.
pub fn scenario_a() -> (Database, ProfitTable) {
    let mut t1 = Transaction::new(1);
    t1.set_item(1, 2, 0.8); // A
    t1.set_item(2, 1, 0.9); // B
    let mut t2 = Transaction::new(2);
    t2.set_item(1, 3, 0.7); // A
    t2.set_item(3, 2, 0.6); // C

    let mut profits = ProfitTable::new();
    profits.insert(1, 10.0);
    profits.insert(2, 15.0);
    profits.insert(3, 5.0);

    (Database::new(vec![t1, t2]), profits)
}

/// Scenario B: negative-profit exclusion.
pub fn scenario_b() -> (Database, ProfitTable) {
    let mut t = Transaction::new(1);
    t.set_item(1, 1, 1.0); // A
    t.set_item(2, 1, 1.0); // B
    let mut profits = ProfitTable::new();
    profits.insert(1, 10.0);
    profits.insert(2, -100.0);
    (Database::new(vec![t]), profits)
}

/// Scenario C: 2000 identical near-certain transactions, probability
/// underflow must still report EP = 1.0.
pub fn scenario_c() -> (Database, ProfitTable) {
    let mut transactions = Vec::with_capacity(2000);
    for tid in 1..=2000u32 {
        let mut t = Transaction::new(tid);
        t.set_item(1, 1, 0.999);
        transactions.push(t);
    }
    let mut profits = ProfitTable::new();
    profits.insert(1, 1.0);
    (Database::new(transactions), profits)
}

/// A deterministic, seeded synthetic database with `n_transactions`
/// transactions over `n_items` distinct items, used by the differential
/// (join/search/collector/parallel) equivalence tests in scenarios E/F.
/// Profits alternate sign so both PTWU-pruning and negative-profit
/// exclusion are exercised; probabilities avoid the extremes so EP
/// thresholds land in the interior of (0,1).
pub fn synthetic_database(n_transactions: u32, n_items: u32, seed: u64) -> (Database, ProfitTable) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut profits = ProfitTable::new();
    for item in 0..n_items {
        let profit = (item as f64) - (n_items as f64 / 2.5);
        profits.insert(item, profit);
    }

    let mut transactions = Vec::with_capacity(n_transactions as usize);
    for tid in 1..=n_transactions {
        let mut t = Transaction::new(tid);
        for item in 0..n_items {
            if rng.gen_bool(0.3) {
                let quantity = rng.gen_range(1..=5);
                let probability = rng.gen_range(0.05..=1.0_f64);
                t.set_item(item, quantity, probability);
            }
        }
        transactions.push(t);
    }
    (Database::new(transactions), profits)
}
