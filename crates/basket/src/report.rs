use crate::affinity::CategoryAffinity;
use crate::cross_sell::CrossSellRecommendation;
use crate::pairs::ProductPair;
use crate::profile::{BasketProfile, HourlyBasketPattern};
use insights::basket as text;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

const MAX_INSIGHTS: usize = 6;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BasketReport {
    pub profile: BasketProfile,
    pub product_pairs: Vec<ProductPair>,
    pub cross_sell: Vec<CrossSellRecommendation>,
    pub category_affinities: Vec<CategoryAffinity>,
    pub hourly_patterns: Vec<HourlyBasketPattern>,
    pub insights: Vec<String>,
}

/// Builds up to six insight sentences from the report parts.
pub fn generate_insights(
    profile: &BasketProfile,
    pairs: &[ProductPair],
    cross_sell: &[CrossSellRecommendation],
    affinities: &[CategoryAffinity],
) -> Vec<String> {
    let mut insights = Vec::new();

    if profile.single_item_percent > dec!(40) {
        insights.push(text::single_item_insight(profile.single_item_percent));
    }
    if profile.total_baskets > 0 && profile.avg_items < Decimal::TWO {
        insights.push(text::small_basket_insight());
    }

    if let Some(top) = pairs.first() {
        if top.lift > Decimal::TWO {
            insights.push(text::combo_insight(&top.product_a_name, &top.product_b_name, top.lift));
        }
        let strong = pairs.iter().filter(|p| p.lift > dec!(1.5)).count();
        if strong > 5 {
            insights.push(text::strong_links_insight(strong));
        }
    }

    if let Some(best) = cross_sell.first() {
        let total: Decimal = cross_sell.iter().map(|r| r.potential_revenue).sum();
        insights.push(text::cross_sell_potential_insight(total));
        insights.push(text::best_recommendation_insight(&best.recommendation_text));
    }

    if let Some(top) = affinities.first() {
        insights.push(text::category_affinity_insight(&top.category_a_name, &top.category_b_name));
    }

    insights.truncate(MAX_INSIGHTS);
    insights
}
