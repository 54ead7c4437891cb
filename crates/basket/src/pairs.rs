use crate::cooccurrence::CoOccurrence;
use core_types::{BasketRecord, Catalog};
use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An association rule between two products, reported in both directions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductPair {
    pub product_a_id: Uuid,
    pub product_a_name: String,
    pub product_b_id: Uuid,
    pub product_b_name: String,
    pub co_occurrence_count: usize,
    pub product_a_count: usize,
    pub product_b_count: usize,
    pub total_baskets: usize,
    pub support: Decimal,
    pub confidence_a_to_b: Decimal,
    pub confidence_b_to_a: Decimal,
    pub lift: Decimal,
}

/// Raw (unrounded) association metrics for one pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairMetrics {
    pub support: Decimal,
    pub confidence_a_to_b: Decimal,
    pub confidence_b_to_a: Decimal,
    pub lift: Decimal,
}

impl PairMetrics {
    /// Lift is `co / (P(A)·P(B)·total)`, computed as `co·total / (count_a·count_b)`.
    pub fn compute(co: usize, count_a: usize, count_b: usize, total: usize) -> Self {
        let co_d = Decimal::from(co);
        let ratio = |num: Decimal, den: usize| {
            if den == 0 {
                Decimal::ZERO
            } else {
                num / Decimal::from(den)
            }
        };
        let expected = Decimal::from(count_a) * Decimal::from(count_b);
        let lift = if expected.is_zero() {
            Decimal::ONE
        } else {
            co_d * Decimal::from(total) / expected
        };
        Self {
            support: ratio(co_d, total),
            confidence_a_to_b: ratio(co_d, count_a),
            confidence_b_to_a: ratio(co_d, count_b),
            lift,
        }
    }
}

/// Minimum co-occurrence count a pair needs to survive:
/// `max(min_occurrences, floor(min_support × total))`.
pub fn min_pair_count(min_support: Decimal, min_occurrences: usize, total: usize) -> usize {
    let support_count = (min_support * Decimal::from(total))
        .floor()
        .to_usize()
        .unwrap_or(0);
    min_occurrences.max(support_count)
}

/// Mines frequent product pairs, strongest lift first, at most `limit` of them.
///
/// Ties in lift keep the pair-key order, so the output is deterministic.
pub fn mine_pairs(
    baskets: &[BasketRecord],
    catalog: &Catalog,
    min_support: Decimal,
    min_occurrences: usize,
    limit: usize,
    max_basket_items: usize,
) -> Vec<ProductPair> {
    let counts = CoOccurrence::count(baskets.iter().map(|b| &b.products), max_basket_items);
    if counts.skipped_sets > 0 {
        tracing::warn!(
            skipped = counts.skipped_sets,
            max_basket_items,
            "Oversized baskets left out of pair mining"
        );
    }

    let total = counts.total_sets;
    if total == 0 {
        return Vec::new();
    }
    let threshold = min_pair_count(min_support, min_occurrences, total);

    let mut pairs: Vec<ProductPair> = counts
        .pair_counts
        .iter()
        .filter(|(_, co)| **co >= threshold)
        .map(|((a, b), co)| {
            let count_a = counts.item_count(a);
            let count_b = counts.item_count(b);
            let metrics = PairMetrics::compute(*co, count_a, count_b, total);
            ProductPair {
                product_a_id: *a,
                product_a_name: catalog.name(a).to_string(),
                product_b_id: *b,
                product_b_name: catalog.name(b).to_string(),
                co_occurrence_count: *co,
                product_a_count: count_a,
                product_b_count: count_b,
                total_baskets: total,
                support: metrics.support.round_dp(4),
                confidence_a_to_b: metrics.confidence_a_to_b.round_dp(3),
                confidence_b_to_a: metrics.confidence_b_to_a.round_dp(3),
                lift: metrics.lift.round_dp(2),
            }
        })
        .collect();

    pairs.sort_by(|x, y| y.lift.cmp(&x.lift));
    pairs.truncate(limit);

    tracing::debug!(
        baskets = total,
        candidates = counts.pair_counts.len(),
        threshold,
        kept = pairs.len(),
        "Product pairs mined"
    );
    pairs
}
