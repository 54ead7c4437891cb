use crate::cooccurrence::CoOccurrence;
use core_types::stats::safe_div;
use core_types::{BasketRecord, CategoryKey};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// How often two categories land in the same basket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryAffinity {
    pub category_a_id: Option<Uuid>,
    pub category_a_name: String,
    pub category_b_id: Option<Uuid>,
    pub category_b_name: String,
    pub co_occurrence_count: usize,
    /// Share of all baskets containing both categories.
    pub affinity_score: Decimal,
    /// Mean receipt total of the baskets containing both.
    pub avg_basket_value: Decimal,
}

/// Category-level co-occurrence. Pairs seen fewer than `min_count` times are
/// dropped; the rest are sorted by affinity, at most `limit` of them.
pub fn category_affinity(
    baskets: &[BasketRecord],
    min_count: usize,
    limit: usize,
) -> Vec<CategoryAffinity> {
    let counts = CoOccurrence::count(baskets.iter().map(|b| &b.categories), usize::MAX);
    let total = counts.total_sets;
    if total == 0 {
        return Vec::new();
    }

    // Basket value per category pair, accumulated in the same order as the counts.
    let mut values: BTreeMap<(&CategoryKey, &CategoryKey), Decimal> = BTreeMap::new();
    for basket in baskets {
        let categories: Vec<&CategoryKey> = basket.categories.iter().collect();
        for (i, a) in categories.iter().enumerate() {
            for b in &categories[i + 1..] {
                *values.entry((*a, *b)).or_insert(Decimal::ZERO) += basket.total;
            }
        }
    }

    let mut affinities: Vec<CategoryAffinity> = counts
        .pair_counts
        .iter()
        .filter(|(_, count)| **count >= min_count)
        .map(|((a, b), count)| {
            let value = values.get(&(a, b)).copied().unwrap_or(Decimal::ZERO);
            CategoryAffinity {
                category_a_id: a.id,
                category_a_name: a.name.clone(),
                category_b_id: b.id,
                category_b_name: b.name.clone(),
                co_occurrence_count: *count,
                affinity_score: safe_div(Decimal::from(*count), Decimal::from(total)).round_dp(3),
                avg_basket_value: safe_div(value, Decimal::from(*count)).round_dp(2),
            }
        })
        .collect();

    affinities.sort_by(|x, y| y.affinity_score.cmp(&x.affinity_score));
    affinities.truncate(limit);
    affinities
}
