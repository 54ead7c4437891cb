use crate::pairs::ProductPair;
use core_types::Catalog;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossSellRecommendation {
    pub trigger_product_id: Uuid,
    pub trigger_product_name: String,
    pub recommended_product_id: Uuid,
    pub recommended_product_name: String,
    pub confidence: Decimal,
    pub lift: Decimal,
    /// Revenue from trigger buyers who do not yet take the recommended product.
    pub potential_revenue: Decimal,
    pub recommendation_text: String,
}

struct Direction<'a> {
    trigger_id: Uuid,
    trigger_name: &'a str,
    trigger_count: usize,
    recommended_id: Uuid,
    recommended_name: &'a str,
    confidence: Decimal,
}

/// Turns both directions of each rule into cross-sell suggestions.
///
/// A direction qualifies when its confidence and the pair's lift reach the
/// minimums. Duplicate (trigger, recommended) pairs keep the higher potential.
pub fn recommend_cross_sell(
    pairs: &[ProductPair],
    catalog: &Catalog,
    min_confidence: Decimal,
    min_lift: Decimal,
    limit: usize,
) -> Vec<CrossSellRecommendation> {
    let mut recommendations = Vec::new();

    for pair in pairs {
        let directions = [
            Direction {
                trigger_id: pair.product_a_id,
                trigger_name: &pair.product_a_name,
                trigger_count: pair.product_a_count,
                recommended_id: pair.product_b_id,
                recommended_name: &pair.product_b_name,
                confidence: pair.confidence_a_to_b,
            },
            Direction {
                trigger_id: pair.product_b_id,
                trigger_name: &pair.product_b_name,
                trigger_count: pair.product_b_count,
                recommended_id: pair.product_a_id,
                recommended_name: &pair.product_a_name,
                confidence: pair.confidence_b_to_a,
            },
        ];

        for d in directions {
            if d.confidence < min_confidence || pair.lift < min_lift {
                continue;
            }
            let potential = catalog.price(&d.recommended_id)
                * Decimal::from(d.trigger_count)
                * (Decimal::ONE - d.confidence);
            recommendations.push(CrossSellRecommendation {
                trigger_product_id: d.trigger_id,
                trigger_product_name: d.trigger_name.to_string(),
                recommended_product_id: d.recommended_id,
                recommended_product_name: d.recommended_name.to_string(),
                confidence: d.confidence,
                lift: pair.lift,
                potential_revenue: potential.round_dp(2),
                recommendation_text: insights::basket::cross_sell_text(
                    d.trigger_name,
                    d.recommended_name,
                    d.confidence,
                ),
            });
        }
    }

    recommendations.sort_by(|a, b| b.potential_revenue.cmp(&a.potential_revenue));

    let mut seen = HashSet::new();
    recommendations.retain(|r| seen.insert((r.trigger_product_id, r.recommended_product_id)));
    recommendations.truncate(limit);
    recommendations
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::ProductInfo;
    use rust_decimal_macros::dec;

    fn pair(a: u128, b: u128, conf_ab: Decimal, conf_ba: Decimal, lift: Decimal) -> ProductPair {
        ProductPair {
            product_a_id: Uuid::from_u128(a),
            product_a_name: format!("P{a}"),
            product_b_id: Uuid::from_u128(b),
            product_b_name: format!("P{b}"),
            co_occurrence_count: 50,
            product_a_count: 100,
            product_b_count: 80,
            total_baskets: 1000,
            support: dec!(0.05),
            confidence_a_to_b: conf_ab,
            confidence_b_to_a: conf_ba,
            lift,
        }
    }

    fn catalog() -> Catalog {
        let mut catalog = Catalog::default();
        for (id, price) in [(1, dec!(200)), (2, dec!(150))] {
            catalog.insert(
                Uuid::from_u128(id),
                ProductInfo {
                    name: format!("P{id}"),
                    category_id: None,
                    category_name: None,
                    price,
                },
            );
        }
        catalog
    }

    #[test]
    fn both_directions_with_potential() {
        let recs = recommend_cross_sell(
            &[pair(1, 2, dec!(0.5), dec!(0.625), dec!(6.25))],
            &catalog(),
            dec!(0.1),
            dec!(1.2),
            20,
        );
        assert_eq!(recs.len(), 2);
        // 1 -> 2: 150 * 100 * 0.5 = 7500; 2 -> 1: 200 * 80 * 0.375 = 6000
        assert_eq!(recs[0].trigger_product_id, Uuid::from_u128(1));
        assert_eq!(recs[0].potential_revenue, dec!(7500));
        assert_eq!(recs[1].potential_revenue, dec!(6000));
        assert!(recs[0].recommendation_text.contains("вероятность 50%"));
    }

    #[test]
    fn weak_directions_are_dropped() {
        let recs = recommend_cross_sell(
            &[pair(1, 2, dec!(0.05), dec!(0.625), dec!(6.25)), pair(1, 3, dec!(0.9), dec!(0.9), dec!(1.1))],
            &catalog(),
            dec!(0.1),
            dec!(1.2),
            20,
        );
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].trigger_product_id, Uuid::from_u128(2));
    }

    #[test]
    fn duplicates_keep_higher_potential() {
        let mut weaker = pair(1, 2, dec!(0.8), dec!(0.9), dec!(2));
        weaker.product_a_count = 10;
        let recs = recommend_cross_sell(
            &[weaker, pair(1, 2, dec!(0.5), dec!(0.9), dec!(2))],
            &catalog(),
            dec!(0.1),
            dec!(1.2),
            20,
        );
        let one_to_two: Vec<_> = recs
            .iter()
            .filter(|r| r.trigger_product_id == Uuid::from_u128(1))
            .collect();
        assert_eq!(one_to_two.len(), 1);
        assert_eq!(one_to_two[0].potential_revenue, dec!(7500));
    }
}
