use crate::error::MenuError;
use core_types::stats::percent_of;
use core_types::{AbcCategory, Metric, ProductAggregate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use uuid::Uuid;

/// ABC classification of one product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductAbc {
    pub product_id: Uuid,
    pub product_name: String,
    pub category_name: Option<String>,
    pub quantity: Decimal,
    pub revenue: Decimal,
    pub cost: Decimal,
    pub profit: Decimal,
    pub margin_percent: Decimal,
    /// Share of total revenue, whatever metric was used for ranking.
    pub revenue_percent: Decimal,
    /// Running share of the ranking metric up to and including this product.
    pub cumulative_percent: Decimal,
    pub abc_category: AbcCategory,
}

impl ProductAbc {
    /// Profit as a share of revenue, before the rounding `margin_percent` carries.
    pub fn exact_margin_percent(&self) -> Decimal {
        percent_of(self.profit, self.revenue)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AbcSummary {
    pub count: usize,
    pub revenue: Decimal,
    pub profit: Decimal,
    pub revenue_percent: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AbcAnalysis {
    pub metric: Metric,
    /// Products in ranking order.
    pub products: Vec<ProductAbc>,
    /// One entry per tier, present even when the tier is empty.
    pub summary: BTreeMap<AbcCategory, AbcSummary>,
    pub total_revenue: Decimal,
    pub total_profit: Decimal,
}

impl AbcAnalysis {
    pub fn in_category(&self, category: AbcCategory) -> impl Iterator<Item = &ProductAbc> {
        self.products
            .iter()
            .filter(move |p| p.abc_category == category)
    }
}

fn metric_value(aggregate: &ProductAggregate, metric: Metric) -> Decimal {
    match metric {
        Metric::Revenue => aggregate.revenue,
        Metric::Profit => aggregate.profit(),
        Metric::Quantity => aggregate.quantity,
    }
}

/// Ranks products by `metric` and assigns Pareto tiers.
///
/// The sort is stable, so ties keep their input order. A product is A while the
/// running share is within `a_threshold`, B within `b_threshold`, C otherwise.
/// When the metric total is not positive every share is 0 and every product is C.
pub fn classify_abc(
    aggregates: &[ProductAggregate],
    metric: Metric,
    a_threshold: Decimal,
    b_threshold: Decimal,
) -> Result<AbcAnalysis, MenuError> {
    let mut seen = HashSet::with_capacity(aggregates.len());
    for aggregate in aggregates {
        if !seen.insert(aggregate.product_id) {
            return Err(MenuError::DuplicateProduct(aggregate.product_id));
        }
    }

    let mut analysis = AbcAnalysis {
        metric,
        ..Default::default()
    };
    for category in AbcCategory::ALL {
        analysis.summary.insert(category, AbcSummary::default());
    }
    if aggregates.is_empty() {
        return Ok(analysis);
    }

    analysis.total_revenue = aggregates.iter().map(|a| a.revenue).sum();
    analysis.total_profit = aggregates.iter().map(|a| a.profit()).sum();
    let total_metric: Decimal = aggregates.iter().map(|a| metric_value(a, metric)).sum();

    let mut ranked: Vec<&ProductAggregate> = aggregates.iter().collect();
    ranked.sort_by(|a, b| metric_value(b, metric).cmp(&metric_value(a, metric)));

    let mut cumulative = Decimal::ZERO;
    for aggregate in ranked {
        // Accumulate unrounded shares; only the reported value is rounded.
        cumulative += percent_of(metric_value(aggregate, metric), total_metric);

        let abc_category = if total_metric <= Decimal::ZERO {
            AbcCategory::C
        } else if cumulative <= a_threshold {
            AbcCategory::A
        } else if cumulative <= b_threshold {
            AbcCategory::B
        } else {
            AbcCategory::C
        };

        analysis.products.push(ProductAbc {
            product_id: aggregate.product_id,
            product_name: aggregate.name.clone(),
            category_name: aggregate.category_name.clone(),
            quantity: aggregate.quantity,
            revenue: aggregate.revenue,
            cost: aggregate.cost,
            profit: aggregate.profit(),
            margin_percent: aggregate.margin_percent().round_dp(2),
            revenue_percent: percent_of(aggregate.revenue, analysis.total_revenue).round_dp(2),
            cumulative_percent: cumulative.round_dp(2),
            abc_category,
        });
    }

    for product in &analysis.products {
        if let Some(summary) = analysis.summary.get_mut(&product.abc_category) {
            summary.count += 1;
            summary.revenue += product.revenue;
            summary.profit += product.profit;
        }
    }
    let total_revenue = analysis.total_revenue;
    for summary in analysis.summary.values_mut() {
        summary.revenue_percent = percent_of(summary.revenue, total_revenue).round_dp(2);
    }

    tracing::debug!(
        products = analysis.products.len(),
        %metric,
        a = analysis.summary[&AbcCategory::A].count,
        b = analysis.summary[&AbcCategory::B].count,
        c = analysis.summary[&AbcCategory::C].count,
        "ABC classification complete"
    );
    Ok(analysis)
}
