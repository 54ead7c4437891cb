use crate::model::Prediction;
use chrono::NaiveDate;
use core_types::TrendDirection;
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::{Deserialize, Serialize};

/// Converts a model value to a fixed-point amount. Values a `Decimal` cannot
/// hold become zero.
pub(crate) fn to_decimal(value: f64, dp: u32) -> Decimal {
    Decimal::from_f64(value).unwrap_or(Decimal::ZERO).round_dp(dp)
}

/// A forecast (or fitted) value with its prediction interval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub forecast: Decimal,
    pub lower_bound: Decimal,
    pub upper_bound: Decimal,
    /// True for points inside the fitted history.
    pub is_historical: bool,
}

impl ForecastPoint {
    /// Clamps at zero after the interval is computed, so the ordering
    /// `lower <= forecast <= upper` survives.
    pub fn from_prediction(p: &Prediction) -> Self {
        Self {
            date: p.date,
            forecast: to_decimal(p.yhat.max(0.0), 2),
            lower_bound: to_decimal(p.lower.max(0.0), 2),
            upper_bound: to_decimal(p.upper.max(0.0), 2),
            is_historical: p.is_historical,
        }
    }

    /// A flat forecast around `level` with multiplicative bounds.
    pub fn flat(date: NaiveDate, level: Decimal, lower_factor: Decimal, upper_factor: Decimal) -> Self {
        let level = level.max(Decimal::ZERO).round_dp(2);
        Self {
            date,
            forecast: level,
            lower_bound: (level * lower_factor).round_dp(2).max(Decimal::ZERO),
            upper_bound: (level * upper_factor).round_dp(2),
            is_historical: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastAccuracy {
    /// Mean absolute percentage error over non-zero actuals.
    pub mape: Decimal,
    pub rmse: Decimal,
    pub mae: Decimal,
    /// Coefficient of determination, floored at zero.
    pub r_squared: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonalFactor {
    pub label: String,
    /// Multiplicative index: 1.25 means 25% above the trend.
    pub factor: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonalComponent {
    /// "weekly" or "yearly".
    pub name: String,
    /// Spread between the strongest and weakest factor.
    pub strength: Decimal,
    pub pattern: Vec<SeasonalFactor>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendComponent {
    pub direction: TrendDirection,
    /// Average daily change of the trend over the fitted and forecast frame.
    pub slope: Decimal,
    pub change_points: Vec<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevenueForecast {
    pub forecast_start: NaiveDate,
    pub forecast_end: NaiveDate,
    pub horizon_days: usize,
    pub historical: Vec<ForecastPoint>,
    pub forecast: Vec<ForecastPoint>,
    pub accuracy: Option<ForecastAccuracy>,
    pub seasonality: Vec<SeasonalComponent>,
    pub trend: TrendComponent,
    pub total_forecast: Decimal,
    pub avg_daily_forecast: Decimal,
    /// Average forecast day against the historical daily mean.
    pub growth_percent: Decimal,
    pub insights: Vec<String>,
}
