//! # MOZG Forecasting
//!
//! Daily revenue, quick and per-product demand forecasts built on one additive
//! decomposition model (piecewise-linear trend, Fourier seasonalities and
//! holiday effects) fitted by ridge least squares.
//!
//! ## Public API
//!
//! - `Forecaster` / `FittedModel`: the fitting capability and the fitted model.
//!   `DecompositionForecaster` is the default implementation.
//! - `ForecastAnalyzer`: runs `forecast_revenue`, `quick_forecast` and
//!   `forecast_demand` with configured hyperparameters.
//! - `DemandForecast::fit_or_fallback`: one fit with the fallback policy,
//!   reported as a `ForecastOutcome`.

pub mod accuracy;
pub mod analyzer;
pub mod demand;
pub mod error;
pub mod holidays;
pub mod math;
pub mod model;
pub mod quick;
pub mod revenue;
pub mod types;

pub use analyzer::ForecastAnalyzer;
pub use demand::{
    CategoryDemandForecast, DemandForecast, DemandForecastReport, ForecastMethod, ForecastOutcome,
    ProductDemandForecast,
};
pub use error::ForecastError;
pub use holidays::{Holiday, russian_holidays};
pub use model::{
    Changepoint, DecompositionForecaster, DecompositionModel, FittedModel, Forecaster, ModelSpec,
    Prediction,
};
pub use types::{
    ForecastAccuracy, ForecastPoint, RevenueForecast, SeasonalComponent, SeasonalFactor,
    TrendComponent,
};
