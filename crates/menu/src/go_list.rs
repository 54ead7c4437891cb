use crate::abc::AbcAnalysis;
use core_types::stats::median;
use core_types::{AbcCategory, GoListCategory};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoListItem {
    pub product_id: Uuid,
    pub product_name: String,
    pub category_name: Option<String>,
    pub abc_category: AbcCategory,
    pub margin_percent: Decimal,
    pub go_list_category: GoListCategory,
    pub recommendation: String,
    pub revenue: Decimal,
    pub profit: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GoListSummary {
    pub count: usize,
    pub revenue: Decimal,
    pub profit: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GoListResult {
    pub items: Vec<GoListItem>,
    /// One entry per cell; empty when there were no products.
    pub summary: BTreeMap<GoListCategory, GoListSummary>,
    pub recommendations: Vec<String>,
    /// The margin split actually used, rounded to two places; `None` when
    /// there were no products.
    pub margin_threshold: Option<Decimal>,
}

impl GoListResult {
    pub fn count(&self, category: GoListCategory) -> usize {
        self.summary.get(&category).map(|s| s.count).unwrap_or(0)
    }
}

/// The median unrounded margin over products with a positive margin, or
/// `fallback` when no product has one.
pub fn default_margin_threshold(abc: &AbcAnalysis, fallback: Decimal) -> Decimal {
    let positive: Vec<Decimal> = abc
        .products
        .iter()
        .map(|p| p.exact_margin_percent())
        .filter(|m| *m > Decimal::ZERO)
        .collect();
    median(&positive).unwrap_or(fallback)
}

/// Crosses each product's ABC tier with high (>= threshold) or low margin.
pub fn go_list(
    abc: &AbcAnalysis,
    margin_threshold: Option<Decimal>,
    fallback_threshold: Decimal,
) -> GoListResult {
    if abc.products.is_empty() {
        return GoListResult::default();
    }

    let threshold = margin_threshold
        .unwrap_or_else(|| default_margin_threshold(abc, fallback_threshold));

    let items: Vec<GoListItem> = abc
        .products
        .iter()
        .map(|product| {
            let high_margin = product.exact_margin_percent() >= threshold;
            let go_list_category = GoListCategory::from_abc(product.abc_category, high_margin);
            GoListItem {
                product_id: product.product_id,
                product_name: product.product_name.clone(),
                category_name: product.category_name.clone(),
                abc_category: product.abc_category,
                margin_percent: product.margin_percent,
                go_list_category,
                recommendation: insights::menu::go_list_recommendation(go_list_category)
                    .to_string(),
                revenue: product.revenue,
                profit: product.profit,
            }
        })
        .collect();

    let mut summary: BTreeMap<GoListCategory, GoListSummary> = GoListCategory::ALL
        .into_iter()
        .map(|c| (c, GoListSummary::default()))
        .collect();
    for item in &items {
        if let Some(cell) = summary.get_mut(&item.go_list_category) {
            cell.count += 1;
            cell.revenue += item.revenue;
            cell.profit += item.profit;
        }
    }

    let count = |c: GoListCategory| summary.get(&c).map(|s| s.count).unwrap_or(0);
    let mut recommendations = Vec::new();
    let dogs = count(GoListCategory::Dogs);
    if dogs > 0 {
        recommendations.push(insights::menu::review_dogs(dogs));
    }
    let puzzles = count(GoListCategory::Puzzles);
    if puzzles > 0 {
        recommendations.push(insights::menu::investigate_puzzles(puzzles));
    }
    let workhorses = count(GoListCategory::Workhorses);
    if workhorses > 0 {
        recommendations.push(insights::menu::optimize_workhorses(workhorses));
    }
    let stars = count(GoListCategory::Stars);
    if stars > 0 {
        recommendations.push(insights::menu::feature_stars(stars));
    }

    tracing::debug!(
        items = items.len(),
        threshold = %threshold,
        stars,
        dogs,
        "Go-List built"
    );

    GoListResult {
        items,
        summary,
        recommendations,
        margin_threshold: Some(threshold.round_dp(2)),
    }
}
