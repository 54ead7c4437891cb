use crate::error::CoreError;
use chrono::{Duration, NaiveDate};
use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use uuid::Uuid;

/// One dated observation of a metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub value: Decimal,
}

impl SeriesPoint {
    pub fn new(date: NaiveDate, value: Decimal) -> Self {
        Self { date, value }
    }
}

/// A chronologically ordered, gap-free daily series.
///
/// The Series Provider is responsible for zero-filling missing days before
/// handing a series to an analyzer; `validate` checks that contract.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricSeries {
    pub points: Vec<SeriesPoint>,
}

impl MetricSeries {
    pub fn new(points: Vec<SeriesPoint>) -> Self {
        Self { points }
    }

    /// Builds a series from consecutive values starting at `start`.
    pub fn from_values(start: NaiveDate, values: &[Decimal]) -> Self {
        let points = values
            .iter()
            .enumerate()
            .map(|(i, v)| SeriesPoint::new(start + Duration::days(i as i64), *v))
            .collect();
        Self { points }
    }

    /// Builds a gap-free series over `[start, end]` from sparse observations.
    /// Days without an observation get zero; duplicate days are summed.
    pub fn zero_filled(start: NaiveDate, end: NaiveDate, observations: &[SeriesPoint]) -> Self {
        let mut by_day: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();
        for obs in observations {
            if obs.date >= start && obs.date <= end {
                *by_day.entry(obs.date).or_insert(Decimal::ZERO) += obs.value;
            }
        }

        let mut points = Vec::new();
        let mut day = start;
        while day <= end {
            points.push(SeriesPoint::new(
                day,
                by_day.get(&day).copied().unwrap_or(Decimal::ZERO),
            ));
            day += Duration::days(1);
        }
        Self { points }
    }

    /// Checks the provider contract: strictly consecutive days.
    pub fn validate(&self) -> Result<(), CoreError> {
        for pair in self.points.windows(2) {
            if pair[1].date != pair[0].date + Duration::days(1) {
                return Err(CoreError::invalid_parameter(
                    "series",
                    format!(
                        "expected consecutive days, found {} followed by {}",
                        pair[0].date, pair[1].date
                    ),
                ));
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn values(&self) -> Vec<Decimal> {
        self.points.iter().map(|p| p.value).collect()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }

    /// The trailing `n` points (or all of them if shorter).
    pub fn tail(&self, n: usize) -> MetricSeries {
        let start = self.points.len().saturating_sub(n);
        MetricSeries::new(self.points[start..].to_vec())
    }

    /// Points dated within `[from, to]`.
    pub fn between(&self, from: NaiveDate, to: NaiveDate) -> MetricSeries {
        MetricSeries::new(
            self.points
                .iter()
                .filter(|p| p.date >= from && p.date <= to)
                .copied()
                .collect(),
        )
    }

    pub fn sum(&self) -> Decimal {
        self.points.iter().map(|p| p.value).sum()
    }

    /// Lossy conversion for numeric fitting. Unrepresentable values become 0.
    pub fn to_f64(&self) -> Vec<(NaiveDate, f64)> {
        self.points
            .iter()
            .map(|p| (p.date, p.value.to_f64().unwrap_or(0.0)))
            .collect()
    }
}

/// Per-product totals for the requested period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductAggregate {
    pub product_id: Uuid,
    pub name: String,
    #[serde(default)]
    pub category_id: Option<Uuid>,
    #[serde(default)]
    pub category_name: Option<String>,
    pub quantity: Decimal,
    pub revenue: Decimal,
    #[serde(default)]
    pub cost: Decimal,
}

impl ProductAggregate {
    pub fn profit(&self) -> Decimal {
        self.revenue - self.cost
    }

    /// Profit as a percentage of revenue; 0 when there is no revenue.
    pub fn margin_percent(&self) -> Decimal {
        if self.revenue > Decimal::ZERO {
            self.profit() / self.revenue * Decimal::ONE_HUNDRED
        } else {
            Decimal::ZERO
        }
    }
}

/// Category identity as it appears on a receipt. Uncategorized items carry
/// no id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CategoryKey {
    pub id: Option<Uuid>,
    pub name: String,
}

impl CategoryKey {
    pub const UNCATEGORIZED: &'static str = "Без категории";

    pub fn new(id: Option<Uuid>, name: Option<&str>) -> Self {
        Self {
            id,
            name: name.unwrap_or(Self::UNCATEGORIZED).to_string(),
        }
    }
}

/// One receipt reduced to what basket analysis needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasketRecord {
    pub receipt_id: Uuid,
    /// Distinct products on the receipt.
    pub products: BTreeSet<Uuid>,
    /// Distinct categories on the receipt.
    #[serde(default)]
    pub categories: BTreeSet<CategoryKey>,
    /// Number of line items, counting repeats.
    pub item_count: u32,
    pub total: Decimal,
    /// Hour of day the receipt was opened, when known.
    #[serde(default)]
    pub hour: Option<u32>,
}

/// Catalog entry for a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductInfo {
    pub name: String,
    #[serde(default)]
    pub category_id: Option<Uuid>,
    #[serde(default)]
    pub category_name: Option<String>,
    #[serde(default)]
    pub price: Decimal,
}

/// Product lookup used to name pairs and price cross-sell suggestions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub products: BTreeMap<Uuid, ProductInfo>,
}

impl Catalog {
    pub fn new(products: BTreeMap<Uuid, ProductInfo>) -> Self {
        Self { products }
    }

    pub fn insert(&mut self, id: Uuid, info: ProductInfo) {
        self.products.insert(id, info);
    }

    pub fn name(&self, id: &Uuid) -> &str {
        self.products
            .get(id)
            .map(|p| p.name.as_str())
            .unwrap_or("Unknown")
    }

    pub fn price(&self, id: &Uuid) -> Decimal {
        self.products
            .get(id)
            .map(|p| p.price)
            .unwrap_or(Decimal::ZERO)
    }
}

/// Venue-wide totals for one day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyMetrics {
    pub date: NaiveDate,
    pub revenue: Decimal,
    pub receipts: Decimal,
    pub avg_check: Decimal,
}

/// Revenue booked within one hour of one day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HourlyReading {
    pub date: NaiveDate,
    pub hour: u32,
    pub revenue: Decimal,
}

/// Daily sold quantity of one product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductDailySeries {
    pub product_id: Uuid,
    pub product_name: String,
    #[serde(default)]
    pub category_name: Option<String>,
    pub series: MetricSeries,
}

impl ProductDailySeries {
    pub fn total_quantity(&self) -> Decimal {
        self.series.sum()
    }
}
