//! Core data model: transactions, the profit table, and the
//! pattern records the mining pipeline ultimately produces.

use std::collections::BTreeMap;

/// One item occurrence within a transaction: a positive quantity and an
/// existential probability in (0,1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ItemOccurrence {
    pub quantity: u32,
    pub probability: f64,
}

/// An immutable transaction: a unique `tid` plus a mapping from item id to
/// its occurrence. Items within one transaction are distinct by
/// construction (a `BTreeMap` keeps them ordered by item id, which the
/// preprocessor and builder rely on when iterating a transaction's items).
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub tid: u32,
    pub items: BTreeMap<u32, ItemOccurrence>,
}

impl Transaction {
    pub fn new(tid: u32) -> Self {
        Transaction {
            tid,
            items: BTreeMap::new(),
        }
    }

    /// Last occurrence of a duplicate item within one line wins.
    pub fn set_item(&mut self, item: u32, quantity: u32, probability: f64) {
        self.items.insert(item, ItemOccurrence { quantity, probability });
    }

    pub fn quantity_of(&self, item: u32) -> Option<u32> {
        self.items.get(&item).map(|o| o.quantity)
    }

    pub fn probability_of(&self, item: u32) -> Option<f64> {
        self.items.get(&item).map(|o| o.probability)
    }
}

/// An ordered, immutable sequence of transactions. TIDs need not be
/// contiguous in general, but the file loader assigns them 1..N by line
/// order by the loader.
#[derive(Debug, Clone, Default)]
pub struct Database {
    pub transactions: Vec<Transaction>,
}

impl Database {
    pub fn new(transactions: Vec<Transaction>) -> Self {
        Database { transactions }
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// Largest item id appearing anywhere in the database, or `None` if
    /// the database is empty of items. Used to size the dense-index
    /// arrays in the preprocessor.
    pub fn max_item_id(&self) -> Option<u32> {
        self.transactions
            .iter()
            .flat_map(|t| t.items.keys())
            .copied()
            .max()
    }
}

/// Immutable item id -> profit mapping. Profits may be negative; items
/// absent from the map are unknown and ignored wherever they're looked up.
#[derive(Debug, Clone, Default)]
pub struct ProfitTable {
    profits: BTreeMap<u32, f64>,
}

impl ProfitTable {
    pub fn new() -> Self {
        ProfitTable { profits: BTreeMap::new() }
    }

    pub fn insert(&mut self, item: u32, profit: f64) {
        self.profits.insert(item, profit);
    }

    pub fn get(&self, item: u32) -> Option<f64> {
        self.profits.get(&item).copied()
    }

    pub fn max_item_id(&self) -> Option<u32> {
        self.profits.keys().copied().max()
    }

    pub fn len(&self) -> usize {
        self.profits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profits.is_empty()
    }
}

/// One mined itemset plus its expected utility and existential
/// probability. Two records are the same pattern iff their itemsets are
/// equal; the `PartialEq`/`Eq`/`Hash` impls below only ever look at
/// `items`.
#[derive(Debug, Clone)]
pub struct PatternRecord {
    pub items: Vec<u32>,
    pub expected_utility: f64,
    pub existential_probability: f64,
}

impl PatternRecord {
    pub fn new(mut items: Vec<u32>, expected_utility: f64, existential_probability: f64) -> Self {
        items.sort_unstable();
        PatternRecord { items, expected_utility, existential_probability }
    }
}

impl PartialEq for PatternRecord {
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items
    }
}
impl Eq for PatternRecord {}

impl std::hash::Hash for PatternRecord {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.items.hash(state);
    }
}

/// Total order used by the Top-K collector's heap and the final snapshot:
/// EU ascending, then itemset size ascending, then sorted item-ids
/// lexicographic. This is a total order, making eviction deterministic.
pub fn pattern_order_key(p: &PatternRecord) -> (ordered_float::OrderedFloat<f64>, usize, Vec<u32>) {
    (
        ordered_float::OrderedFloat(p.expected_utility),
        p.items.len(),
        p.items.clone(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pattern_equality_ignores_eu_and_ep() {
        let a = PatternRecord::new(vec![2, 1], 10.0, 0.5);
        let b = PatternRecord::new(vec![1, 2], 99.0, 0.99);
        assert_eq!(a, b);
    }

    #[test]
    fn last_occurrence_wins_on_duplicate_item() {
        let mut t = Transaction::new(1);
        t.set_item(5, 1, 0.5);
        t.set_item(5, 3, 0.9);
        assert_eq!(t.quantity_of(5), Some(3));
        assert_eq!(t.probability_of(5), Some(0.9));
    }
}
