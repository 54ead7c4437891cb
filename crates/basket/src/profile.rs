use crate::pairs::ProductPair;
use core_types::stats::{count_percent, safe_div};
use core_types::BasketRecord;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const POPULAR_COMBINATIONS: usize = 5;

/// Shape of a typical basket.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BasketProfile {
    pub total_baskets: usize,
    pub avg_items: Decimal,
    pub avg_value: Decimal,
    pub avg_categories: Decimal,
    /// Baskets with exactly one line item.
    pub single_item_percent: Decimal,
    /// Two or three line items.
    pub small_basket_percent: Decimal,
    /// Four to six line items.
    pub medium_basket_percent: Decimal,
    /// Seven or more line items.
    pub large_basket_percent: Decimal,
}

pub fn basket_profile(baskets: &[BasketRecord]) -> BasketProfile {
    if baskets.is_empty() {
        return BasketProfile::default();
    }
    let total = baskets.len();
    let total_d = Decimal::from(total);

    let mut single = 0;
    let mut small = 0;
    let mut medium = 0;
    let mut large = 0;
    for basket in baskets {
        match basket.item_count {
            0 => {}
            1 => single += 1,
            2..=3 => small += 1,
            4..=6 => medium += 1,
            _ => large += 1,
        }
    }

    let items: Decimal = baskets.iter().map(|b| Decimal::from(b.item_count)).sum();
    let value: Decimal = baskets.iter().map(|b| b.total).sum();
    let categories: Decimal = baskets.iter().map(|b| Decimal::from(b.categories.len())).sum();

    BasketProfile {
        total_baskets: total,
        avg_items: (items / total_d).round_dp(1),
        avg_value: (value / total_d).round_dp(2),
        avg_categories: (categories / total_d).round_dp(1),
        single_item_percent: count_percent(single, total).round_dp(1),
        small_basket_percent: count_percent(small, total).round_dp(1),
        medium_basket_percent: count_percent(medium, total).round_dp(1),
        large_basket_percent: count_percent(large, total).round_dp(1),
    }
}

/// Basket shape for one hour of the day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyBasketPattern {
    pub hour: u32,
    pub baskets: usize,
    pub avg_basket_size: Decimal,
    pub avg_basket_value: Decimal,
    /// Mined pairs most often bought together in this hour, as (A, B) names.
    pub popular_combinations: Vec<(String, String)>,
}

#[derive(Default)]
struct HourBucket {
    baskets: usize,
    items: Decimal,
    value: Decimal,
    pair_hits: Vec<usize>,
}

/// Groups baskets that carry an opening hour. Baskets without one are ignored.
///
/// Popular combinations rank the already-mined `pairs` by how many of the
/// hour's baskets contain both products; ties keep the pairs' order.
pub fn hourly_patterns(baskets: &[BasketRecord], pairs: &[ProductPair]) -> Vec<HourlyBasketPattern> {
    let mut buckets: BTreeMap<u32, HourBucket> = BTreeMap::new();
    for basket in baskets {
        let Some(hour) = basket.hour else { continue };
        let bucket = buckets.entry(hour).or_insert_with(|| HourBucket {
            pair_hits: vec![0; pairs.len()],
            ..Default::default()
        });
        bucket.baskets += 1;
        bucket.items += Decimal::from(basket.item_count);
        bucket.value += basket.total;
        for (i, pair) in pairs.iter().enumerate() {
            if basket.products.contains(&pair.product_a_id) && basket.products.contains(&pair.product_b_id) {
                bucket.pair_hits[i] += 1;
            }
        }
    }

    buckets
        .into_iter()
        .map(|(hour, bucket)| {
            let count = Decimal::from(bucket.baskets);
            let mut ranked: Vec<(usize, usize)> = bucket
                .pair_hits
                .iter()
                .copied()
                .enumerate()
                .filter(|(_, hits)| *hits > 0)
                .collect();
            ranked.sort_by(|a, b| b.1.cmp(&a.1));
            let popular_combinations = ranked
                .into_iter()
                .take(POPULAR_COMBINATIONS)
                .map(|(i, _)| (pairs[i].product_a_name.clone(), pairs[i].product_b_name.clone()))
                .collect();
            HourlyBasketPattern {
                hour,
                baskets: bucket.baskets,
                avg_basket_size: safe_div(bucket.items, count).round_dp(1),
                avg_basket_value: safe_div(bucket.value, count).round_dp(2),
                popular_combinations,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::collections::BTreeSet;
    use uuid::Uuid;

    fn basket(items: u32, total: Decimal, hour: Option<u32>, products: &[u128]) -> BasketRecord {
        BasketRecord {
            receipt_id: Uuid::new_v4(),
            products: products.iter().map(|p| Uuid::from_u128(*p)).collect(),
            categories: BTreeSet::new(),
            item_count: items,
            total,
            hour,
        }
    }

    #[test]
    fn profile_buckets_by_item_count() {
        let baskets = vec![
            basket(1, dec!(100), None, &[]),
            basket(1, dec!(120), None, &[]),
            basket(3, dec!(400), None, &[]),
            basket(5, dec!(700), None, &[]),
            basket(9, dec!(1680), None, &[]),
        ];
        let profile = basket_profile(&baskets);
        assert_eq!(profile.single_item_percent, dec!(40));
        assert_eq!(profile.small_basket_percent, dec!(20));
        assert_eq!(profile.medium_basket_percent, dec!(20));
        assert_eq!(profile.large_basket_percent, dec!(20));
        assert_eq!(profile.avg_items, dec!(3.8));
        assert_eq!(profile.avg_value, dec!(600));
    }

    #[test]
    fn empty_profile_is_zeroed() {
        assert_eq!(basket_profile(&[]), BasketProfile::default());
    }

    #[test]
    fn hourly_patterns_rank_pairs_per_hour() {
        let pair = |a: u128, b: u128| ProductPair {
            product_a_id: Uuid::from_u128(a),
            product_a_name: format!("P{a}"),
            product_b_id: Uuid::from_u128(b),
            product_b_name: format!("P{b}"),
            co_occurrence_count: 3,
            product_a_count: 3,
            product_b_count: 3,
            total_baskets: 10,
            support: dec!(0.3),
            confidence_a_to_b: dec!(1),
            confidence_b_to_a: dec!(1),
            lift: dec!(3.33),
        };
        let pairs = vec![pair(1, 2), pair(3, 4)];
        let baskets = vec![
            basket(2, dec!(300), Some(9), &[1, 2]),
            basket(2, dec!(500), Some(13), &[3, 4]),
            basket(3, dec!(600), Some(13), &[3, 4, 1]),
            basket(4, dec!(900), Some(13), &[1, 2]),
            basket(1, dec!(50), None, &[1]),
        ];
        let patterns = hourly_patterns(&baskets, &pairs);
        assert_eq!(patterns.len(), 2);
        assert_eq!(patterns[0].hour, 9);
        assert_eq!(patterns[1].baskets, 3);
        assert_eq!(patterns[1].avg_basket_size, dec!(3));
        assert_eq!(patterns[1].avg_basket_value, dec!(666.67));
        assert_eq!(
            patterns[1].popular_combinations,
            vec![("P3".to_string(), "P4".to_string()), ("P1".to_string(), "P2".to_string())]
        );
    }
}
