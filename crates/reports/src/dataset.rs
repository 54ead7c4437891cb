//! In-memory snapshot of receipts and the product catalog.
//!
//! Stands in for the point-of-sale database: it performs the same
//! aggregations a SQL provider would (sums per day, hour, product and
//! receipt), zero-fills daily series and drops deleted receipts.

use crate::error::ReportError;
use crate::provider::{Period, SeriesProvider};
use chrono::{NaiveDateTime, Timelike};
use core_types::{
    BasketRecord, Catalog, CategoryKey, DailyMetrics, HourlyReading, MetricSeries, ProductAggregate,
    ProductDailySeries, ProductInfo, SeriesPoint,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub category_id: Option<Uuid>,
    #[serde(default)]
    pub category_name: Option<String>,
    #[serde(default)]
    pub price: Decimal,
    /// Unit cost used when a receipt line carries none.
    #[serde(default)]
    pub cost_price: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiptLine {
    pub product_id: Uuid,
    pub quantity: Decimal,
    /// Line total after discounts.
    pub total: Decimal,
    #[serde(default)]
    pub cost_price: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Receipt {
    pub id: Uuid,
    pub opened_at: NaiveDateTime,
    /// Receipt total; the sum of its lines when absent.
    #[serde(default)]
    pub total: Option<Decimal>,
    #[serde(default)]
    pub is_deleted: bool,
    pub items: Vec<ReceiptLine>,
}

impl Receipt {
    pub fn total(&self) -> Decimal {
        self.total
            .unwrap_or_else(|| self.items.iter().map(|l| l.total).sum())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub products: Vec<ProductRecord>,
    pub receipts: Vec<Receipt>,
}

impl Dataset {
    pub fn from_json_str(json: &str) -> Result<Self, ReportError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ReportError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ReportError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let dataset = Self::from_json_str(&raw)?;
        debug!(
            path = %path.display(),
            products = dataset.products.len(),
            receipts = dataset.receipts.len(),
            "Dataset loaded"
        );
        Ok(dataset)
    }

    /// Last day with a live receipt.
    pub fn last_date(&self) -> Option<chrono::NaiveDate> {
        self.live_receipts().map(|r| r.opened_at.date()).max()
    }

    pub fn first_date(&self) -> Option<chrono::NaiveDate> {
        self.live_receipts().map(|r| r.opened_at.date()).min()
    }

    fn live_receipts(&self) -> impl Iterator<Item = &Receipt> {
        self.receipts.iter().filter(|r| !r.is_deleted)
    }

    fn receipts_in(&self, period: Period) -> impl Iterator<Item = &Receipt> {
        self.live_receipts()
            .filter(move |r| period.contains(r.opened_at.date()))
    }

    fn product(&self, id: &Uuid) -> Option<&ProductRecord> {
        self.products.iter().find(|p| p.id == *id)
    }
}

impl SeriesProvider for Dataset {
    fn daily_metrics(&self, period: Period) -> Vec<DailyMetrics> {
        let mut by_day: BTreeMap<chrono::NaiveDate, (Decimal, usize)> = BTreeMap::new();
        for receipt in self.receipts_in(period) {
            let entry = by_day.entry(receipt.opened_at.date()).or_default();
            entry.0 += receipt.total();
            entry.1 += 1;
        }

        let revenue: Vec<SeriesPoint> = by_day
            .iter()
            .map(|(d, (rev, _))| SeriesPoint::new(*d, *rev))
            .collect();
        MetricSeries::zero_filled(period.start, period.end, &revenue)
            .points
            .into_iter()
            .map(|p| {
                let receipts = by_day.get(&p.date).map(|(_, n)| *n).unwrap_or(0);
                let avg_check = if receipts > 0 {
                    (p.value / Decimal::from(receipts)).round_dp(2)
                } else {
                    Decimal::ZERO
                };
                DailyMetrics {
                    date: p.date,
                    revenue: p.value,
                    receipts: Decimal::from(receipts),
                    avg_check,
                }
            })
            .collect()
    }

    fn hourly_readings(&self, period: Period) -> Vec<HourlyReading> {
        let mut by_slot: BTreeMap<(chrono::NaiveDate, u32), Decimal> = BTreeMap::new();
        for receipt in self.receipts_in(period) {
            *by_slot
                .entry((receipt.opened_at.date(), receipt.opened_at.hour()))
                .or_default() += receipt.total();
        }
        by_slot
            .into_iter()
            .map(|((date, hour), revenue)| HourlyReading { date, hour, revenue })
            .collect()
    }

    fn product_aggregates(&self, period: Period) -> Vec<ProductAggregate> {
        let mut totals: BTreeMap<Uuid, (Decimal, Decimal, Decimal)> = BTreeMap::new();
        for receipt in self.receipts_in(period) {
            for line in &receipt.items {
                let product = self.product(&line.product_id);
                let unit_cost = line
                    .cost_price
                    .or(product.map(|p| p.cost_price))
                    .unwrap_or(Decimal::ZERO);
                let entry = totals.entry(line.product_id).or_default();
                entry.0 += line.quantity;
                entry.1 += line.total;
                entry.2 += line.quantity * unit_cost;
            }
        }

        totals
            .into_iter()
            .map(|(id, (quantity, revenue, cost))| {
                let product = self.product(&id);
                ProductAggregate {
                    product_id: id,
                    name: product.map(|p| p.name.clone()).unwrap_or_else(|| "Unknown".into()),
                    category_id: product.and_then(|p| p.category_id),
                    category_name: product.and_then(|p| p.category_name.clone()),
                    quantity,
                    revenue,
                    cost,
                }
            })
            .collect()
    }

    fn product_series(&self, period: Period) -> Vec<ProductDailySeries> {
        let mut sold: BTreeMap<Uuid, Vec<SeriesPoint>> = BTreeMap::new();
        for receipt in self.receipts_in(period) {
            for line in &receipt.items {
                sold.entry(line.product_id)
                    .or_default()
                    .push(SeriesPoint::new(receipt.opened_at.date(), line.quantity));
            }
        }

        sold.into_iter()
            .map(|(id, observations)| {
                let product = self.product(&id);
                ProductDailySeries {
                    product_id: id,
                    product_name: product.map(|p| p.name.clone()).unwrap_or_else(|| "Unknown".into()),
                    category_name: product.and_then(|p| p.category_name.clone()),
                    series: MetricSeries::zero_filled(period.start, period.end, &observations),
                }
            })
            .collect()
    }

    fn baskets(&self, period: Period) -> Vec<BasketRecord> {
        self.receipts_in(period)
            .map(|receipt| {
                let products: BTreeSet<Uuid> = receipt.items.iter().map(|l| l.product_id).collect();
                let categories: BTreeSet<CategoryKey> = products
                    .iter()
                    .filter_map(|id| self.product(id))
                    .filter(|p| p.category_id.is_some() || p.category_name.is_some())
                    .map(|p| CategoryKey::new(p.category_id, p.category_name.as_deref()))
                    .collect();
                BasketRecord {
                    receipt_id: receipt.id,
                    products,
                    categories,
                    item_count: receipt.items.len() as u32,
                    total: receipt.total(),
                    hour: Some(receipt.opened_at.hour()),
                }
            })
            .collect()
    }

    fn catalog(&self) -> Catalog {
        let products = self
            .products
            .iter()
            .map(|p| {
                (
                    p.id,
                    ProductInfo {
                        name: p.name.clone(),
                        category_id: p.category_id,
                        category_name: p.category_name.clone(),
                        price: p.price,
                    },
                )
            })
            .collect();
        Catalog::new(products)
    }

    fn data_start(&self) -> Option<chrono::NaiveDate> {
        self.first_date()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    fn at(d: u32, h: u32) -> NaiveDateTime {
        day(d).and_hms_opt(h, 15, 0).unwrap()
    }

    fn fixture() -> (Dataset, Uuid, Uuid) {
        let latte = Uuid::from_u128(1);
        let cake = Uuid::from_u128(2);
        let dataset = Dataset {
            products: vec![
                ProductRecord {
                    id: latte,
                    name: "Латте".into(),
                    category_id: Some(Uuid::from_u128(10)),
                    category_name: Some("Кофе".into()),
                    price: dec!(250),
                    cost_price: dec!(60),
                },
                ProductRecord {
                    id: cake,
                    name: "Чизкейк".into(),
                    category_id: None,
                    category_name: None,
                    price: dec!(320),
                    cost_price: dec!(110),
                },
            ],
            receipts: vec![
                Receipt {
                    id: Uuid::from_u128(100),
                    opened_at: at(1, 9),
                    total: None,
                    is_deleted: false,
                    items: vec![
                        ReceiptLine { product_id: latte, quantity: dec!(2), total: dec!(500), cost_price: None },
                        ReceiptLine { product_id: cake, quantity: dec!(1), total: dec!(320), cost_price: Some(dec!(100)) },
                    ],
                },
                Receipt {
                    id: Uuid::from_u128(101),
                    opened_at: at(3, 9),
                    total: Some(dec!(240)),
                    is_deleted: false,
                    items: vec![ReceiptLine { product_id: latte, quantity: dec!(1), total: dec!(250), cost_price: None }],
                },
                Receipt {
                    id: Uuid::from_u128(102),
                    opened_at: at(3, 12),
                    total: None,
                    is_deleted: true,
                    items: vec![ReceiptLine { product_id: cake, quantity: dec!(5), total: dec!(1600), cost_price: None }],
                },
            ],
        };
        (dataset, latte, cake)
    }

    #[test]
    fn daily_metrics_are_zero_filled_without_deleted_receipts() {
        let (dataset, _, _) = fixture();
        let daily = dataset.daily_metrics(Period::new(day(1), day(3)).unwrap());
        assert_eq!(daily.len(), 3);
        assert_eq!(daily[0].revenue, dec!(820));
        assert_eq!(daily[1].revenue, Decimal::ZERO);
        assert_eq!(daily[1].avg_check, Decimal::ZERO);
        assert_eq!(daily[2].revenue, dec!(240));
        assert_eq!(daily[2].receipts, dec!(1));
    }

    #[test]
    fn product_cost_prefers_the_line_cost() {
        let (dataset, latte, cake) = fixture();
        let aggs = dataset.product_aggregates(Period::new(day(1), day(3)).unwrap());
        let latte_agg = aggs.iter().find(|a| a.product_id == latte).unwrap();
        assert_eq!(latte_agg.quantity, dec!(3));
        assert_eq!(latte_agg.revenue, dec!(750));
        assert_eq!(latte_agg.cost, dec!(180));
        let cake_agg = aggs.iter().find(|a| a.product_id == cake).unwrap();
        assert_eq!(cake_agg.cost, dec!(100));
        assert_eq!(cake_agg.quantity, dec!(1));
    }

    #[test]
    fn baskets_carry_categories_and_hours() {
        let (dataset, latte, cake) = fixture();
        let baskets = dataset.baskets(Period::new(day(1), day(1)).unwrap());
        assert_eq!(baskets.len(), 1);
        let basket = &baskets[0];
        assert!(basket.products.contains(&latte) && basket.products.contains(&cake));
        assert_eq!(basket.categories.len(), 1);
        assert_eq!(basket.item_count, 2);
        assert_eq!(basket.total, dec!(820));
        assert_eq!(basket.hour, Some(9));
    }

    #[test]
    fn product_series_cover_the_period() {
        let (dataset, latte, _) = fixture();
        let series = dataset.product_series(Period::new(day(1), day(4)).unwrap());
        let latte_series = series.iter().find(|s| s.product_id == latte).unwrap();
        assert_eq!(
            latte_series.series.values(),
            vec![dec!(2), dec!(0), dec!(1), dec!(0)]
        );
    }

    #[test]
    fn json_round_trip_of_the_snapshot() {
        let (dataset, _, _) = fixture();
        let json = serde_json::to_string(&dataset).unwrap();
        assert_eq!(Dataset::from_json_str(&json).unwrap(), dataset);
        assert_eq!(dataset.last_date(), Some(day(3)));
        assert_eq!(dataset.first_date(), Some(day(1)));
    }
}
