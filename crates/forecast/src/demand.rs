//! Per-product demand forecasts.
//!
//! Each product is forecast independently on the rayon pool. A product never
//! fails the report: short histories and failed fits fall back to a flat
//! average with a lower confidence score, and the outcome records which path
//! was taken.

use crate::analyzer::ForecastAnalyzer;
use crate::model::{FittedModel, Forecaster, ModelSpec};
use crate::revenue::horizon_dates;
use crate::types::{ForecastPoint, to_decimal};
use chrono::NaiveDate;
use core_types::stats::mean;
use core_types::{CategoryKey, MetricSeries, ProductDailySeries, TrendDirection};
use insights::forecast as text;
use rayon::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};
use uuid::Uuid;

const TOP_MOVERS: usize = 5;
const MAX_INSIGHTS: usize = 5;
const TREND_THRESHOLD: Decimal = Decimal::TEN;
const HIGH_CONFIDENCE: Decimal = dec!(80);
const RESTOCK_MIN_DAILY: Decimal = Decimal::TEN;

/// Which path produced a product forecast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForecastMethod {
    Fitted,
    InsufficientHistory,
    FitFailed,
}

/// Result of [`DemandForecast::fit_or_fallback`].
#[derive(Debug, Clone, PartialEq)]
pub enum ForecastOutcome {
    Fitted {
        points: Vec<ForecastPoint>,
        confidence: Decimal,
    },
    InsufficientHistory {
        points: Vec<ForecastPoint>,
        confidence: Decimal,
    },
    FitFailed {
        points: Vec<ForecastPoint>,
        confidence: Decimal,
        reason: String,
    },
}

impl ForecastOutcome {
    pub fn points(&self) -> &[ForecastPoint] {
        match self {
            ForecastOutcome::Fitted { points, .. }
            | ForecastOutcome::InsufficientHistory { points, .. }
            | ForecastOutcome::FitFailed { points, .. } => points,
        }
    }

    /// Confidence score in [30, 100] for fitted forecasts; 50 or 40 for the fallbacks.
    pub fn confidence(&self) -> Decimal {
        match self {
            ForecastOutcome::Fitted { confidence, .. }
            | ForecastOutcome::InsufficientHistory { confidence, .. }
            | ForecastOutcome::FitFailed { confidence, .. } => *confidence,
        }
    }

    pub fn method(&self) -> ForecastMethod {
        match self {
            ForecastOutcome::Fitted { .. } => ForecastMethod::Fitted,
            ForecastOutcome::InsufficientHistory { .. } => ForecastMethod::InsufficientHistory,
            ForecastOutcome::FitFailed { .. } => ForecastMethod::FitFailed,
        }
    }
}

/// Confidence from data volume and variability:
/// `clamp(100 - cv * 50 + min(50, n), 30, 100)` with the sample coefficient of
/// variation, taken as 1 when the mean is not positive.
pub fn demand_confidence(values: &[f64]) -> Decimal {
    let n = values.len();
    let mean = if n == 0 { 0.0 } else { values.iter().sum::<f64>() / n as f64 };
    let variability = if mean > 0.0 && n > 1 {
        let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
        var.sqrt() / mean
    } else {
        1.0
    };
    let score = (100.0 - variability * 50.0 + (n as f64).min(50.0)).clamp(30.0, 100.0);
    to_decimal(score, 1)
}

/// One model fit with the fallback policy applied.
pub struct DemandForecast<'a, F: Forecaster> {
    pub forecaster: &'a F,
    pub spec: &'a ModelSpec,
    pub min_history_points: usize,
    pub horizon_days: usize,
}

impl<F: Forecaster> DemandForecast<'_, F> {
    /// Forecasts the days after `last`. Never fails: too little history or a
    /// failed fit degrade to a flat average of the history.
    pub fn fit_or_fallback(&self, history: &MetricSeries, last: NaiveDate) -> ForecastOutcome {
        let dates = horizon_dates(last, self.horizon_days);
        let level = mean(&history.values());
        let flat = |lower: Decimal, upper: Decimal| -> Vec<ForecastPoint> {
            dates
                .iter()
                .map(|d| ForecastPoint::flat(*d, level, lower, upper))
                .collect()
        };

        if history.len() < self.min_history_points {
            return ForecastOutcome::InsufficientHistory {
                points: flat(dec!(0.5), dec!(1.5)),
                confidence: dec!(50),
            };
        }

        let data = history.to_f64();
        match self.forecaster.fit(&data, self.spec) {
            Ok(model) => {
                let points = model
                    .predict(&dates)
                    .iter()
                    .map(ForecastPoint::from_prediction)
                    .collect();
                let values: Vec<f64> = data.iter().map(|(_, y)| *y).collect();
                ForecastOutcome::Fitted {
                    points,
                    confidence: demand_confidence(&values),
                }
            }
            Err(e) => {
                warn!(error = %e, "Demand model fit failed, falling back to the average");
                ForecastOutcome::FitFailed {
                    points: flat(dec!(0.7), dec!(1.3)),
                    confidence: dec!(40),
                    reason: e.to_string(),
                }
            }
        }
    }
}

/// First half against second half of the history, in percent.
pub fn historical_trend(values: &[Decimal], min_points: usize) -> (TrendDirection, Decimal) {
    if values.len() < min_points {
        return (TrendDirection::Stable, Decimal::ZERO);
    }
    let mid = values.len() / 2;
    let first = mean(&values[..mid]);
    let second = mean(&values[mid..]);
    if first.is_zero() {
        return (TrendDirection::Stable, Decimal::ZERO);
    }
    let change = (second - first) / first * Decimal::ONE_HUNDRED;
    (
        TrendDirection::classify(change, TREND_THRESHOLD),
        change.round_dp(1),
    )
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductDemandForecast {
    pub product_id: Uuid,
    pub product_name: String,
    pub category_name: Option<String>,
    pub forecast: Vec<ForecastPoint>,
    pub total_forecast: Decimal,
    pub avg_daily_forecast: Decimal,
    pub historical_avg: Decimal,
    pub historical_total: Decimal,
    pub trend: TrendDirection,
    pub trend_percent: Decimal,
    pub confidence_score: Decimal,
    pub method: ForecastMethod,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryDemandForecast {
    pub category_name: String,
    pub product_ids: Vec<Uuid>,
    pub total_forecast: Decimal,
    /// Forecast total against the historical total of the same products.
    pub growth_percent: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemandForecastReport {
    pub forecast_start: NaiveDate,
    pub forecast_end: NaiveDate,
    pub horizon_days: usize,
    pub product_forecasts: Vec<ProductDemandForecast>,
    pub category_forecasts: Vec<CategoryDemandForecast>,
    pub top_growing: Vec<ProductDemandForecast>,
    pub top_declining: Vec<ProductDemandForecast>,
    pub insights: Vec<String>,
}

/// Rolls product forecasts up by category, largest forecast first.
pub fn category_rollup(products: &[ProductDemandForecast]) -> Vec<CategoryDemandForecast> {
    let mut by_category: BTreeMap<&str, Vec<&ProductDemandForecast>> = BTreeMap::new();
    for p in products {
        let name = p.category_name.as_deref().unwrap_or(CategoryKey::UNCATEGORIZED);
        by_category.entry(name).or_default().push(p);
    }

    let mut categories: Vec<CategoryDemandForecast> = by_category
        .into_iter()
        .map(|(name, members)| {
            let total: Decimal = members.iter().map(|p| p.total_forecast).sum();
            let historical: Decimal = members.iter().map(|p| p.historical_total).sum();
            let growth = if historical > Decimal::ZERO {
                (total - historical) / historical * Decimal::ONE_HUNDRED
            } else {
                Decimal::ZERO
            };
            CategoryDemandForecast {
                category_name: name.to_string(),
                product_ids: members.iter().map(|p| p.product_id).collect(),
                total_forecast: total.round_dp(2),
                growth_percent: growth.round_dp(1),
            }
        })
        .collect();
    categories.sort_by(|a, b| b.total_forecast.cmp(&a.total_forecast));
    categories
}

/// Up to five growing products (strongest first) and five declining ones
/// (steepest first).
pub fn top_movers(
    products: &[ProductDemandForecast],
) -> (Vec<ProductDemandForecast>, Vec<ProductDemandForecast>) {
    let mut by_trend: Vec<&ProductDemandForecast> = products.iter().collect();
    by_trend.sort_by(|a, b| b.trend_percent.cmp(&a.trend_percent));

    let growing = by_trend
        .iter()
        .filter(|p| p.trend == TrendDirection::Up)
        .take(TOP_MOVERS)
        .map(|p| (*p).clone())
        .collect();
    let declining = by_trend
        .iter()
        .rev()
        .filter(|p| p.trend == TrendDirection::Down)
        .take(TOP_MOVERS)
        .map(|p| (*p).clone())
        .collect();
    (growing, declining)
}

pub fn generate_insights(
    products: &[ProductDemandForecast],
    categories: &[CategoryDemandForecast],
    growing: &[ProductDemandForecast],
    declining: &[ProductDemandForecast],
) -> Vec<String> {
    let mut insights = Vec::new();

    if !growing.is_empty() {
        insights.push(text::growing_demand_insight(growing.iter().map(|p| p.product_name.as_str())));
    }
    if !declining.is_empty() {
        insights.push(text::declining_demand_insight(
            declining.iter().map(|p| p.product_name.as_str()),
        ));
    }

    let confident = products
        .iter()
        .filter(|p| p.confidence_score >= HIGH_CONFIDENCE)
        .count();
    if confident > 0 {
        insights.push(text::confident_forecasts_insight(confident, products.len()));
    }

    if let Some(top) = categories.first() {
        insights.push(text::top_category_insight(&top.category_name, top.total_forecast));
    }

    let restock = products
        .iter()
        .filter(|p| p.trend == TrendDirection::Up && p.avg_daily_forecast > RESTOCK_MIN_DAILY)
        .count();
    if restock > 0 {
        insights.push(text::restock_insight(restock));
    }

    insights.truncate(MAX_INSIGHTS);
    insights
}

impl<F: Forecaster> ForecastAnalyzer<F> {
    /// Demand forecast for one product over the days after `as_of`.
    pub fn forecast_product(&self, product: &ProductDailySeries, as_of: NaiveDate) -> ProductDemandForecast {
        let demand = &self.params.demand;
        let history = product.series.tail(demand.history_days);
        let values = history.values();
        let spec = ModelSpec::demand(&self.params);

        let outcome = DemandForecast {
            forecaster: &self.forecaster,
            spec: &spec,
            min_history_points: demand.min_history_points,
            horizon_days: demand.horizon_days,
        }
        .fit_or_fallback(&history, as_of);

        let (trend, trend_percent) = historical_trend(&values, demand.min_history_points);
        let total: Decimal = outcome.points().iter().map(|p| p.forecast).sum();
        let avg_daily = if outcome.points().is_empty() {
            Decimal::ZERO
        } else {
            total / Decimal::from(outcome.points().len())
        };

        ProductDemandForecast {
            product_id: product.product_id,
            product_name: product.product_name.clone(),
            category_name: product.category_name.clone(),
            total_forecast: total.round_dp(2),
            avg_daily_forecast: avg_daily.round_dp(2),
            historical_avg: mean(&values).round_dp(2),
            historical_total: values.iter().sum::<Decimal>().round_dp(2),
            trend,
            trend_percent,
            confidence_score: outcome.confidence(),
            method: outcome.method(),
            forecast: outcome.points().to_vec(),
        }
    }

    /// Demand forecasts for the `top_n` best-selling products, fitted in
    /// parallel. Output order follows the sales ranking.
    pub fn forecast_demand(&self, products: &[ProductDailySeries], as_of: NaiveDate) -> DemandForecastReport {
        let demand = &self.params.demand;
        let dates = horizon_dates(as_of, demand.horizon_days);
        let forecast_start = dates.first().copied().unwrap_or(as_of);
        let forecast_end = dates.last().copied().unwrap_or(as_of);

        let mut ranked: Vec<(&ProductDailySeries, Decimal)> = products
            .iter()
            .map(|p| (p, p.series.tail(demand.history_days).sum()))
            .filter(|(_, sold)| *sold > Decimal::ZERO)
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.truncate(demand.top_n);

        if ranked.is_empty() {
            return DemandForecastReport {
                forecast_start,
                forecast_end,
                horizon_days: demand.horizon_days,
                product_forecasts: Vec::new(),
                category_forecasts: Vec::new(),
                top_growing: Vec::new(),
                top_declining: Vec::new(),
                insights: vec![text::insufficient_demand_data()],
            };
        }

        let product_forecasts: Vec<ProductDemandForecast> = ranked
            .par_iter()
            .map(|(product, _)| self.forecast_product(product, as_of))
            .collect();

        let category_forecasts = category_rollup(&product_forecasts);
        let (top_growing, top_declining) = top_movers(&product_forecasts);
        let insights = generate_insights(
            &product_forecasts,
            &category_forecasts,
            &top_growing,
            &top_declining,
        );

        debug!(
            products = product_forecasts.len(),
            categories = category_forecasts.len(),
            fallbacks = product_forecasts
                .iter()
                .filter(|p| p.method != ForecastMethod::Fitted)
                .count(),
            "Demand forecast complete"
        );

        DemandForecastReport {
            forecast_start,
            forecast_end,
            horizon_days: demand.horizon_days,
            product_forecasts,
            category_forecasts,
            top_growing,
            top_declining,
            insights,
        }
    }
}
