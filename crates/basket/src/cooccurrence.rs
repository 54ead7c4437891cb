use itertools::Itertools;
use std::collections::{BTreeMap, BTreeSet};

/// Item and unordered-pair counts over a collection of sets.
///
/// Pair keys are stored with the smaller item first.
#[derive(Debug, Clone)]
pub struct CoOccurrence<K: Ord> {
    pub total_sets: usize,
    pub item_counts: BTreeMap<K, usize>,
    pub pair_counts: BTreeMap<(K, K), usize>,
    /// Sets that were counted for items but too large for pair enumeration.
    pub skipped_sets: usize,
}

impl<K: Ord + Clone> CoOccurrence<K> {
    /// Counts every set. Sets with more than `max_items` members still count
    /// towards item totals but contribute no pairs.
    pub fn count<'a, I>(sets: I, max_items: usize) -> Self
    where
        I: IntoIterator<Item = &'a BTreeSet<K>>,
        K: 'a,
    {
        let mut total_sets = 0;
        let mut skipped_sets = 0;
        let mut item_counts = BTreeMap::new();
        let mut pair_counts = BTreeMap::new();

        for set in sets {
            total_sets += 1;
            for item in set {
                *item_counts.entry(item.clone()).or_insert(0) += 1;
            }
            if set.len() < 2 {
                continue;
            }
            if set.len() > max_items {
                skipped_sets += 1;
                continue;
            }
            // BTreeSet iterates in order, so each combination is already sorted.
            for (a, b) in set.iter().tuple_combinations() {
                *pair_counts.entry((a.clone(), b.clone())).or_insert(0) += 1;
            }
        }

        Self {
            total_sets,
            item_counts,
            pair_counts,
            skipped_sets,
        }
    }

    pub fn item_count(&self, item: &K) -> usize {
        self.item_counts.get(item).copied().unwrap_or(0)
    }
}
