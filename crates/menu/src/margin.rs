use core_types::stats::{percent_of, safe_div};
use core_types::{CategoryKey, Metric, ProductAggregate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductMargin {
    pub product_id: Uuid,
    pub product_name: String,
    pub category_name: Option<String>,
    pub quantity: Decimal,
    pub revenue: Decimal,
    pub cost: Decimal,
    pub profit: Decimal,
    pub margin_percent: Decimal,
    pub avg_price: Decimal,
    pub avg_cost: Decimal,
}

impl From<&ProductAggregate> for ProductMargin {
    fn from(aggregate: &ProductAggregate) -> Self {
        Self {
            product_id: aggregate.product_id,
            product_name: aggregate.name.clone(),
            category_name: aggregate.category_name.clone(),
            quantity: aggregate.quantity,
            revenue: aggregate.revenue,
            cost: aggregate.cost,
            profit: aggregate.profit(),
            margin_percent: aggregate.margin_percent().round_dp(2),
            avg_price: safe_div(aggregate.revenue, aggregate.quantity).round_dp(2),
            avg_cost: safe_div(aggregate.cost, aggregate.quantity).round_dp(2),
        }
    }
}

/// Products sold at least `min_quantity` times, highest margin first.
pub fn margin_analysis(aggregates: &[ProductAggregate], min_quantity: Decimal) -> Vec<ProductMargin> {
    let mut margins: Vec<ProductMargin> = aggregates
        .iter()
        .filter(|a| a.quantity >= min_quantity)
        .map(ProductMargin::from)
        .collect();
    margins.sort_by(|a, b| b.margin_percent.cmp(&a.margin_percent));
    margins
}

/// The best `limit` products by the given metric.
pub fn top_sellers(aggregates: &[ProductAggregate], limit: usize, by: Metric) -> Vec<ProductMargin> {
    let mut margins = margin_analysis(aggregates, Decimal::ONE);
    match by {
        Metric::Revenue => margins.sort_by(|a, b| b.revenue.cmp(&a.revenue)),
        Metric::Quantity => margins.sort_by(|a, b| b.quantity.cmp(&a.quantity)),
        Metric::Profit => margins.sort_by(|a, b| b.profit.cmp(&a.profit)),
    }
    margins.truncate(limit);
    margins
}

/// The lowest-revenue `limit` products among those sold at least `min_quantity` times.
pub fn worst_sellers(
    aggregates: &[ProductAggregate],
    limit: usize,
    min_quantity: Decimal,
) -> Vec<ProductMargin> {
    let mut margins = margin_analysis(aggregates, min_quantity);
    margins.sort_by(|a, b| a.revenue.cmp(&b.revenue));
    margins.truncate(limit);
    margins
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySales {
    pub category_id: Option<Uuid>,
    pub category_name: String,
    pub quantity: Decimal,
    pub revenue: Decimal,
    pub revenue_percent: Decimal,
    pub products_count: usize,
}

/// Sales grouped by product category, highest revenue first. Products without a
/// category are pooled under one uncategorized bucket.
pub fn category_breakdown(aggregates: &[ProductAggregate]) -> Vec<CategorySales> {
    let mut groups: BTreeMap<CategoryKey, (Decimal, Decimal, BTreeSet<Uuid>)> = BTreeMap::new();
    for aggregate in aggregates {
        let key = CategoryKey::new(aggregate.category_id, aggregate.category_name.as_deref());
        let entry = groups
            .entry(key)
            .or_insert_with(|| (Decimal::ZERO, Decimal::ZERO, BTreeSet::new()));
        entry.0 += aggregate.quantity;
        entry.1 += aggregate.revenue;
        entry.2.insert(aggregate.product_id);
    }

    let total_revenue: Decimal = groups.values().map(|(_, revenue, _)| *revenue).sum();
    let mut categories: Vec<CategorySales> = groups
        .into_iter()
        .map(|(key, (quantity, revenue, products))| CategorySales {
            category_id: key.id,
            category_name: key.name,
            quantity,
            revenue,
            revenue_percent: percent_of(revenue, total_revenue).round_dp(2),
            products_count: products.len(),
        })
        .collect();
    categories.sort_by(|a, b| b.revenue.cmp(&a.revenue));
    categories
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn product(
        n: u128,
        category: Option<(u128, &str)>,
        quantity: Decimal,
        revenue: Decimal,
        cost: Decimal,
    ) -> ProductAggregate {
        ProductAggregate {
            product_id: Uuid::from_u128(n),
            name: format!("P{n}"),
            category_id: category.map(|(id, _)| Uuid::from_u128(id)),
            category_name: category.map(|(_, name)| name.to_string()),
            quantity,
            revenue,
            cost,
        }
    }

    fn sample() -> Vec<ProductAggregate> {
        vec![
            product(1, Some((10, "Кофе")), dec!(40), dec!(6000), dec!(1500)),
            product(2, Some((10, "Кофе")), dec!(3), dec!(600), dec!(100)),
            product(3, Some((20, "Десерты")), dec!(20), dec!(5000), dec!(3000)),
            product(4, None, dec!(10), dec!(400), dec!(380)),
        ]
    }

    #[test]
    fn margin_analysis_filters_and_sorts() {
        let margins = margin_analysis(&sample(), dec!(5));
        let ids: Vec<_> = margins.iter().map(|m| m.product_id.as_u128()).collect();
        assert_eq!(ids, vec![1, 3, 4]);
        assert_eq!(margins[0].margin_percent, dec!(75));
        assert_eq!(margins[0].avg_price, dec!(150));
        assert_eq!(margins[0].avg_cost, dec!(37.5));
    }

    #[test]
    fn sellers_rankings() {
        let top = top_sellers(&sample(), 2, Metric::Profit);
        assert_eq!(top[0].product_id.as_u128(), 1);
        assert_eq!(top[1].product_id.as_u128(), 3);

        let worst = worst_sellers(&sample(), 10, dec!(5));
        assert_eq!(worst[0].product_id.as_u128(), 4);
        assert_eq!(worst.len(), 3);
    }

    #[test]
    fn categories_are_grouped_with_uncategorized_bucket() {
        let categories = category_breakdown(&sample());
        assert_eq!(categories.len(), 3);
        assert_eq!(categories[0].category_name, "Кофе");
        assert_eq!(categories[0].products_count, 2);
        assert_eq!(categories[0].revenue, dec!(6600));
        assert_eq!(categories[0].revenue_percent, dec!(55));
        assert_eq!(categories[2].category_name, CategoryKey::UNCATEGORIZED);
    }
}
