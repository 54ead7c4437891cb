use core_types::{CoreError, Metric};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use std::path::PathBuf;

/// The root configuration structure for the entire application.
///
/// Every section may be omitted from `config.toml`; missing sections fall back
/// to the defaults below.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub menu: MenuParams,
    pub basket: BasketParams,
    pub anomaly: AnomalyParams,
    pub forecast: ForecastParams,
    pub logging: LoggingConfig,
}

impl Config {
    /// Rejects out-of-range parameters. Values are never clamped.
    pub fn validate(&self) -> Result<(), CoreError> {
        self.menu.validate()?;
        self.basket.validate()?;
        self.anomaly.validate()?;
        self.forecast.validate()?;
        Ok(())
    }
}

/// Parameters for the ABC/XYZ classifier and the Go-List.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MenuParams {
    /// The metric products are ranked by.
    pub metric: Metric,
    /// Cumulative share (percent) up to which products are tier A.
    pub a_threshold: Decimal,
    /// Cumulative share (percent) up to which products are tier B.
    pub b_threshold: Decimal,
    /// Coefficient of variation (percent) below which demand is X.
    pub x_threshold: Decimal,
    /// Coefficient of variation (percent) below which demand is Y.
    pub y_threshold: Decimal,
    /// Fixed high/low margin split. The median positive margin is used when absent.
    pub margin_threshold: Option<Decimal>,
    /// Used when no product has a positive margin to take a median from.
    pub fallback_margin_threshold: Decimal,
    pub top_limit: usize,
    pub worst_min_quantity: Decimal,
}

impl Default for MenuParams {
    fn default() -> Self {
        Self {
            metric: Metric::Revenue,
            a_threshold: dec!(80),
            b_threshold: dec!(95),
            x_threshold: dec!(10),
            y_threshold: dec!(25),
            margin_threshold: None,
            fallback_margin_threshold: dec!(30),
            top_limit: 10,
            worst_min_quantity: dec!(5),
        }
    }
}

impl MenuParams {
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.a_threshold <= Decimal::ZERO || self.a_threshold > self.b_threshold {
            return Err(CoreError::invalid_parameter(
                "menu.a_threshold",
                "must be positive and not above b_threshold",
            ));
        }
        if self.b_threshold > dec!(100) {
            return Err(CoreError::invalid_parameter(
                "menu.b_threshold",
                "must not exceed 100",
            ));
        }
        if self.x_threshold <= Decimal::ZERO || self.x_threshold > self.y_threshold {
            return Err(CoreError::invalid_parameter(
                "menu.x_threshold",
                "must be positive and not above y_threshold",
            ));
        }
        if let Some(threshold) = self.margin_threshold {
            if threshold < dec!(-100) || threshold > dec!(100) {
                return Err(CoreError::invalid_parameter(
                    "menu.margin_threshold",
                    "must be a percentage between -100 and 100",
                ));
            }
        }
        Ok(())
    }
}

/// Parameters for the market-basket analyzer.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BasketParams {
    /// Minimum support of a pair, as a fraction of all baskets.
    pub min_support: Decimal,
    /// Minimum absolute co-occurrence count of a pair.
    pub min_occurrences: usize,
    /// Maximum number of pairs kept after sorting by lift.
    pub limit: usize,
    pub min_confidence: Decimal,
    pub min_lift: Decimal,
    /// Baskets with more distinct products are left out of pair enumeration.
    pub max_basket_items: usize,
    pub cross_sell_limit: usize,
    pub category_min_count: usize,
    pub category_limit: usize,
}

impl Default for BasketParams {
    fn default() -> Self {
        Self {
            min_support: dec!(0.005),
            min_occurrences: 3,
            limit: 50,
            min_confidence: dec!(0.1),
            min_lift: dec!(1.2),
            max_basket_items: 50,
            cross_sell_limit: 20,
            category_min_count: 5,
            category_limit: 20,
        }
    }
}

impl BasketParams {
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.min_support < Decimal::ZERO || self.min_support > Decimal::ONE {
            return Err(CoreError::invalid_parameter(
                "basket.min_support",
                "must be within [0, 1]",
            ));
        }
        if self.min_confidence < Decimal::ZERO || self.min_confidence > Decimal::ONE {
            return Err(CoreError::invalid_parameter(
                "basket.min_confidence",
                "must be within [0, 1]",
            ));
        }
        if self.min_lift < Decimal::ZERO {
            return Err(CoreError::invalid_parameter(
                "basket.min_lift",
                "must not be negative",
            ));
        }
        if self.max_basket_items < 2 {
            return Err(CoreError::invalid_parameter(
                "basket.max_basket_items",
                "must allow at least two products per basket",
            ));
        }
        Ok(())
    }
}

/// Parameters for the anomaly detector and its batch report.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnomalyParams {
    /// Length of the trailing baseline window, in days.
    pub window_days: usize,
    /// Days of daily history the batch report looks at.
    pub history_days: usize,
    pub include_products: bool,
    /// How many best-selling products get their own series scanned.
    pub top_products: usize,
    /// Product series shorter than this are skipped.
    pub min_product_points: usize,
    pub include_hourly: bool,
    /// Days of hourly history the batch report looks at.
    pub hourly_days: usize,
    /// Minimum readings at one hour-of-day before that hour is judged.
    pub hourly_min_readings: usize,
    /// Reporting floor for hourly anomalies.
    pub hourly_min_z: Decimal,
}

impl Default for AnomalyParams {
    fn default() -> Self {
        Self {
            window_days: 14,
            history_days: 30,
            include_products: true,
            top_products: 20,
            min_product_points: 7,
            include_hourly: true,
            hourly_days: 14,
            hourly_min_readings: 5,
            hourly_min_z: dec!(3),
        }
    }
}

impl AnomalyParams {
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.window_days < 2 {
            return Err(CoreError::invalid_parameter(
                "anomaly.window_days",
                "must be at least 2",
            ));
        }
        if self.hourly_min_readings < 2 {
            return Err(CoreError::invalid_parameter(
                "anomaly.hourly_min_readings",
                "must be at least 2",
            ));
        }
        if self.hourly_min_z < Decimal::ZERO {
            return Err(CoreError::invalid_parameter(
                "anomaly.hourly_min_z",
                "must not be negative",
            ));
        }
        Ok(())
    }
}

/// Parameters for revenue, demand and quick forecasts.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ForecastParams {
    pub horizon_days: usize,
    pub history_days: usize,
    /// Below this many points a revenue forecast is refused.
    pub min_history_points: usize,
    /// Daily trend slope (currency units) separating up/down from stable.
    pub trend_slope_threshold: Decimal,
    pub changepoint_prior_scale: f64,
    pub seasonality_prior_scale: f64,
    pub holidays_prior_scale: f64,
    pub n_changepoints: usize,
    /// Share of the history in which changepoints may be placed.
    pub changepoint_range: f64,
    pub interval_width: f64,
    pub backtest_days: usize,
    /// How many fitted historical points a revenue forecast returns.
    pub historical_points: usize,
    pub quick_days: usize,
    pub quick_history_days: usize,
    pub demand: DemandParams,
}

impl Default for ForecastParams {
    fn default() -> Self {
        Self {
            horizon_days: 30,
            history_days: 365,
            min_history_points: 30,
            trend_slope_threshold: dec!(100),
            changepoint_prior_scale: 0.05,
            seasonality_prior_scale: 10.0,
            holidays_prior_scale: 10.0,
            n_changepoints: 25,
            changepoint_range: 0.8,
            interval_width: 0.95,
            backtest_days: 30,
            historical_points: 90,
            quick_days: 7,
            quick_history_days: 90,
            demand: DemandParams::default(),
        }
    }
}

impl ForecastParams {
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.horizon_days == 0 {
            return Err(CoreError::invalid_parameter(
                "forecast.horizon_days",
                "must be at least 1",
            ));
        }
        if self.min_history_points < 2 {
            return Err(CoreError::invalid_parameter(
                "forecast.min_history_points",
                "must be at least 2",
            ));
        }
        if self.backtest_days == 0 {
            return Err(CoreError::invalid_parameter(
                "forecast.backtest_days",
                "must be at least 1",
            ));
        }
        if self.history_days < self.min_history_points {
            return Err(CoreError::invalid_parameter(
                "forecast.history_days",
                format!("must be at least min_history_points ({})", self.min_history_points),
            ));
        }
        if self.trend_slope_threshold < Decimal::ZERO {
            return Err(CoreError::invalid_parameter(
                "forecast.trend_slope_threshold",
                "must not be negative",
            ));
        }
        for (name, scale) in [
            ("forecast.changepoint_prior_scale", self.changepoint_prior_scale),
            ("forecast.seasonality_prior_scale", self.seasonality_prior_scale),
            ("forecast.holidays_prior_scale", self.holidays_prior_scale),
            ("forecast.demand.changepoint_prior_scale", self.demand.changepoint_prior_scale),
            ("forecast.demand.seasonality_prior_scale", self.demand.seasonality_prior_scale),
        ] {
            if !(scale.is_finite() && scale > 0.0) {
                return Err(CoreError::invalid_parameter(name, "must be a positive number"));
            }
        }
        if !(self.changepoint_range > 0.0 && self.changepoint_range <= 1.0) {
            return Err(CoreError::invalid_parameter(
                "forecast.changepoint_range",
                "must be within (0, 1]",
            ));
        }
        if !(self.interval_width > 0.0 && self.interval_width < 1.0) {
            return Err(CoreError::invalid_parameter(
                "forecast.interval_width",
                "must be within (0, 1)",
            ));
        }
        if self.demand.horizon_days == 0 || self.quick_days == 0 {
            return Err(CoreError::invalid_parameter(
                "forecast.demand.horizon_days",
                "demand and quick horizons must be at least 1",
            ));
        }
        Ok(())
    }
}

/// Parameters for per-product demand forecasts.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DemandParams {
    pub horizon_days: usize,
    pub history_days: usize,
    pub top_n: usize,
    /// Below this many points the model is bypassed for a flat average.
    pub min_history_points: usize,
    pub changepoint_prior_scale: f64,
    pub seasonality_prior_scale: f64,
}

impl Default for DemandParams {
    fn default() -> Self {
        Self {
            horizon_days: 14,
            history_days: 90,
            top_n: 30,
            min_history_points: 14,
            changepoint_prior_scale: 0.1,
            seasonality_prior_scale: 5.0,
        }
    }
}

/// Where and how verbosely to log.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// An `EnvFilter` directive; `RUST_LOG` takes precedence.
    pub level: String,
    /// When set, logs go to a daily rolling file in this directory instead of stderr.
    pub directory: Option<PathBuf>,
    pub file_prefix: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
            file_prefix: "mozg.log".to_string(),
        }
    }
}
