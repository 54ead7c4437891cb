//! Additive decomposition model.
//!
//! ```text
//! y(t) = trend(t) + weekly(t) + yearly(t) + holidays(t) + noise
//! ```
//!
//! The trend is piecewise linear with potential changepoints spread over the
//! early part of the history, seasonalities are Fourier series, and holidays
//! are indicator columns. Every term is linear in its coefficients, so the
//! whole model is fitted in one ridge regression on a max-abs-scaled target.
//! The per-column penalties play the role of the prior scales.

use crate::error::ForecastError;
use crate::holidays::Holiday;
use crate::math::normal::interval_z;
use crate::math::ridge::solve_ridge;
use chrono::{Datelike, NaiveDate};
use configuration::ForecastParams;
use core_types::CoreError;
use nalgebra::{DMatrix, DVector};
use std::collections::BTreeMap;
use std::f64::consts::PI;
use tracing::debug;

const WEEKLY_PERIOD: f64 = 7.0;
const WEEKLY_ORDER: usize = 3;
const YEARLY_PERIOD: f64 = 365.25;
const YEARLY_ORDER: usize = 10;
/// Yearly seasonality needs at least this many days of history.
pub const YEARLY_MIN_SPAN_DAYS: i64 = 365;
/// Residual scale the prior scales are expressed against.
const NOISE_REFERENCE: f64 = 0.1;

/// Hyperparameters of one fit.
#[derive(Debug, Clone)]
pub struct ModelSpec {
    pub changepoint_prior_scale: f64,
    pub seasonality_prior_scale: f64,
    pub holidays_prior_scale: f64,
    pub n_changepoints: usize,
    /// Share of the history in which changepoints may be placed.
    pub changepoint_range: f64,
    pub interval_width: f64,
    pub weekly: bool,
    /// Requested yearly seasonality. Only fitted when the history is long enough.
    pub yearly: bool,
    pub holidays: Vec<Holiday>,
}

impl ModelSpec {
    /// Full model for venue revenue.
    pub fn revenue(params: &ForecastParams, holidays: Vec<Holiday>) -> Self {
        Self {
            changepoint_prior_scale: params.changepoint_prior_scale,
            seasonality_prior_scale: params.seasonality_prior_scale,
            holidays_prior_scale: params.holidays_prior_scale,
            n_changepoints: params.n_changepoints,
            changepoint_range: params.changepoint_range,
            interval_width: params.interval_width,
            weekly: true,
            yearly: true,
            holidays,
        }
    }

    /// Weekly-only model with the more flexible demand priors.
    pub fn demand(params: &ForecastParams) -> Self {
        Self {
            changepoint_prior_scale: params.demand.changepoint_prior_scale,
            seasonality_prior_scale: params.demand.seasonality_prior_scale,
            yearly: false,
            holidays: Vec::new(),
            ..Self::revenue(params, Vec::new())
        }
    }

    /// Weekly-only model with the revenue priors.
    pub fn quick(params: &ForecastParams) -> Self {
        Self {
            yearly: false,
            ..Self::revenue(params, Vec::new())
        }
    }
}

/// Model output for one date, in the units of the fitted series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    pub date: NaiveDate,
    pub yhat: f64,
    pub lower: f64,
    pub upper: f64,
    pub trend: f64,
    pub weekly: f64,
    pub yearly: f64,
    pub holidays: f64,
    pub is_historical: bool,
}

/// A potential trend changepoint and the fitted change in daily slope there.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Changepoint {
    pub date: NaiveDate,
    pub rate_change: f64,
}

/// A model fitted to one history.
pub trait FittedModel: Send + Sync {
    /// Predicts arbitrary dates, inside or beyond the history.
    fn predict(&self, dates: &[NaiveDate]) -> Vec<Prediction>;

    /// All potential changepoints in chronological order.
    fn changepoints(&self) -> Vec<Changepoint>;

    fn has_weekly(&self) -> bool;

    fn has_yearly(&self) -> bool;
}

/// The forecasting capability the revenue, demand and quick forecasts use.
///
/// The `Send + Sync` bounds let one forecaster serve the parallel demand fits.
pub trait Forecaster: Send + Sync {
    type Model: FittedModel;

    /// Fits a model to consecutive daily observations.
    fn fit(&self, history: &[(NaiveDate, f64)], spec: &ModelSpec) -> Result<Self::Model, ForecastError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DecompositionForecaster;

#[derive(Debug, Clone)]
struct HolidayColumn {
    occurrences: Vec<Holiday>,
}

impl HolidayColumn {
    fn indicator(&self, day: NaiveDate) -> f64 {
        if self.occurrences.iter().any(|h| h.covers(day)) { 1.0 } else { 0.0 }
    }
}

/// Coefficients and scaling of a fitted decomposition.
#[derive(Debug, Clone)]
pub struct DecompositionModel {
    start: NaiveDate,
    end: NaiveDate,
    span_days: f64,
    y_scale: f64,
    changepoint_dates: Vec<NaiveDate>,
    changepoint_t: Vec<f64>,
    weekly_order: usize,
    yearly_order: usize,
    holiday_columns: Vec<HolidayColumn>,
    beta: DVector<f64>,
    /// Residual standard deviation on the scaled target.
    sigma: f64,
    mean_abs_delta: f64,
    z: f64,
}

fn fourier_terms(day: NaiveDate, period: f64, order: usize, out: &mut Vec<f64>) {
    let d = f64::from(day.num_days_from_ce());
    for k in 1..=order {
        let angle = 2.0 * PI * k as f64 * d / period;
        out.push(angle.sin());
        out.push(angle.cos());
    }
}

/// Changepoint indices spread uniformly over the first `range` of `n` points,
/// excluding the first point.
fn changepoint_indices(n: usize, requested: usize, range: f64) -> Vec<usize> {
    let hist_size = (n as f64 * range).floor() as usize;
    let count = requested.min(hist_size.saturating_sub(1));
    if count == 0 {
        return Vec::new();
    }
    let last = (hist_size - 1) as f64;
    (1..=count)
        .map(|k| (k as f64 * last / count as f64).round() as usize)
        .collect()
}

impl DecompositionModel {
    fn t(&self, day: NaiveDate) -> f64 {
        (day - self.start).num_days() as f64 / self.span_days
    }

    fn n_changepoints(&self) -> usize {
        self.changepoint_t.len()
    }

    fn weekly_offset(&self) -> usize {
        2 + self.n_changepoints()
    }

    fn yearly_offset(&self) -> usize {
        self.weekly_offset() + 2 * self.weekly_order
    }

    fn holiday_offset(&self) -> usize {
        self.yearly_offset() + 2 * self.yearly_order
    }

    fn n_columns(&self) -> usize {
        self.holiday_offset() + self.holiday_columns.len()
    }

    fn row(&self, day: NaiveDate) -> Vec<f64> {
        let t = self.t(day);
        let mut row = Vec::with_capacity(self.n_columns());
        row.push(1.0);
        row.push(t);
        row.extend(self.changepoint_t.iter().map(|s| (t - s).max(0.0)));
        fourier_terms(day, WEEKLY_PERIOD, self.weekly_order, &mut row);
        fourier_terms(day, YEARLY_PERIOD, self.yearly_order, &mut row);
        row.extend(self.holiday_columns.iter().map(|c| c.indicator(day)));
        row
    }

    fn dot(&self, row: &[f64], from: usize, to: usize) -> f64 {
        (from..to).map(|j| row[j] * self.beta[j]).sum()
    }

    /// Standard deviation of future trend drift on the scaled target.
    fn trend_sd(&self, t: f64) -> f64 {
        let dt = t - 1.0;
        if dt <= 0.0 || self.mean_abs_delta == 0.0 {
            return 0.0;
        }
        let expected_changes = self.n_changepoints() as f64 * dt;
        self.mean_abs_delta * (2.0 * expected_changes).sqrt() * dt
    }
}

impl FittedModel for DecompositionModel {
    fn predict(&self, dates: &[NaiveDate]) -> Vec<Prediction> {
        let weekly_at = self.weekly_offset();
        let yearly_at = self.yearly_offset();
        let holiday_at = self.holiday_offset();
        let end = self.n_columns();

        dates
            .iter()
            .map(|&date| {
                let row = self.row(date);
                let trend = self.dot(&row, 0, weekly_at);
                let weekly = self.dot(&row, weekly_at, yearly_at);
                let yearly = self.dot(&row, yearly_at, holiday_at);
                let holidays = self.dot(&row, holiday_at, end);
                let yhat = trend + weekly + yearly + holidays;

                let sd = (self.sigma.powi(2) + self.trend_sd(self.t(date)).powi(2)).sqrt();
                let half_width = self.z * sd;

                Prediction {
                    date,
                    yhat: yhat * self.y_scale,
                    lower: (yhat - half_width) * self.y_scale,
                    upper: (yhat + half_width) * self.y_scale,
                    trend: trend * self.y_scale,
                    weekly: weekly * self.y_scale,
                    yearly: yearly * self.y_scale,
                    holidays: holidays * self.y_scale,
                    is_historical: date <= self.end,
                }
            })
            .collect()
    }

    fn changepoints(&self) -> Vec<Changepoint> {
        self.changepoint_dates
            .iter()
            .enumerate()
            .map(|(i, &date)| Changepoint {
                date,
                rate_change: self.beta[2 + i] * self.y_scale / self.span_days,
            })
            .collect()
    }

    fn has_weekly(&self) -> bool {
        self.weekly_order > 0
    }

    fn has_yearly(&self) -> bool {
        self.yearly_order > 0
    }
}

impl Forecaster for DecompositionForecaster {
    type Model = DecompositionModel;

    fn fit(&self, history: &[(NaiveDate, f64)], spec: &ModelSpec) -> Result<DecompositionModel, ForecastError> {
        let (Some(&(start, _)), Some(&(end, _))) = (history.first(), history.last()) else {
            return Err(ForecastError::insufficient(2, 0));
        };
        if history.len() < 2 {
            return Err(ForecastError::insufficient(2, history.len()));
        }
        if history.iter().any(|(_, y)| !y.is_finite()) {
            return Err(ForecastError::FitFailed("history contains non-finite values".into()));
        }
        let z = interval_z(spec.interval_width).ok_or_else(|| {
            CoreError::invalid_parameter("interval_width", "must be within (0, 1)")
        })?;

        let span = (end - start).num_days();
        let y_scale = history
            .iter()
            .map(|(_, y)| y.abs())
            .fold(0.0_f64, f64::max);
        let y_scale = if y_scale > 0.0 { y_scale } else { 1.0 };

        let changepoint_dates: Vec<NaiveDate> =
            changepoint_indices(history.len(), spec.n_changepoints, spec.changepoint_range)
                .into_iter()
                .map(|i| history[i].0)
                .collect();

        // Occurrences grouped by name; names that never touch the history get no column.
        let mut by_name: BTreeMap<&str, Vec<Holiday>> = BTreeMap::new();
        for holiday in &spec.holidays {
            by_name.entry(holiday.name).or_default().push(holiday.clone());
        }
        let holiday_columns: Vec<HolidayColumn> = by_name
            .into_values()
            .map(|occurrences| HolidayColumn { occurrences })
            .filter(|c| history.iter().any(|(d, _)| c.indicator(*d) > 0.0))
            .collect();

        let mut model = DecompositionModel {
            start,
            end,
            span_days: span.max(1) as f64,
            y_scale,
            changepoint_t: Vec::new(),
            changepoint_dates,
            weekly_order: if spec.weekly { WEEKLY_ORDER } else { 0 },
            yearly_order: if spec.yearly && span + 1 >= YEARLY_MIN_SPAN_DAYS {
                YEARLY_ORDER
            } else {
                0
            },
            holiday_columns,
            beta: DVector::zeros(0),
            sigma: 0.0,
            mean_abs_delta: 0.0,
            z,
        };
        model.changepoint_t = model
            .changepoint_dates
            .iter()
            .map(|d| model.t(*d))
            .collect();

        let cols = model.n_columns();
        let rows: Vec<f64> = history.iter().flat_map(|(d, _)| model.row(*d)).collect();
        let x = DMatrix::from_row_slice(history.len(), cols, &rows);
        let y = DVector::from_iterator(history.len(), history.iter().map(|(_, v)| v / y_scale));

        let penalty = |scale: f64| (NOISE_REFERENCE / scale).powi(2);
        let mut penalties = vec![0.0; cols];
        for (j, p) in penalties.iter_mut().enumerate() {
            *p = if j < 2 {
                0.0
            } else if j < model.weekly_offset() {
                penalty(spec.changepoint_prior_scale)
            } else if j < model.holiday_offset() {
                penalty(spec.seasonality_prior_scale)
            } else {
                penalty(spec.holidays_prior_scale)
            };
        }

        let beta = solve_ridge(&x, &y, &penalties)
            .ok_or_else(|| ForecastError::FitFailed("least-squares system is singular".into()))?;

        let residuals = &y - &x * &beta;
        model.sigma = (residuals.norm_squared() / history.len() as f64).sqrt();
        let deltas = beta.rows(2, model.n_changepoints());
        model.mean_abs_delta = if deltas.is_empty() {
            0.0
        } else {
            deltas.iter().map(|d| d.abs()).sum::<f64>() / deltas.len() as f64
        };
        model.beta = beta;

        debug!(
            points = history.len(),
            columns = cols,
            changepoints = model.n_changepoints(),
            yearly = model.has_yearly(),
            holidays = model.holiday_columns.len(),
            sigma = model.sigma,
            "Decomposition model fitted"
        );
        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::holidays::russian_holidays;
    use crate::types::ForecastPoint;
    use chrono::Duration;
    use proptest::prelude::*;

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 6).unwrap()
    }

    fn series(values: impl IntoIterator<Item = f64>) -> Vec<(NaiveDate, f64)> {
        values
            .into_iter()
            .enumerate()
            .map(|(i, v)| (start() + Duration::days(i as i64), v))
            .collect()
    }

    fn spec() -> ModelSpec {
        ModelSpec::quick(&ForecastParams::default())
    }

    #[test]
    fn changepoints_stay_in_the_leading_range() {
        let idx = changepoint_indices(100, 25, 0.8);
        assert_eq!(idx.len(), 25);
        assert_eq!(*idx.last().unwrap(), 79);
        assert!(idx.windows(2).all(|w| w[0] < w[1]));
        assert!(changepoint_indices(2, 25, 0.8).is_empty());
    }

    #[test]
    fn linear_series_is_tracked() {
        let history = series((0..60).map(|i| 1000.0 + 10.0 * i as f64));
        let model = DecompositionForecaster.fit(&history, &spec()).unwrap();
        let next = start() + Duration::days(60);
        let p = model.predict(&[next])[0];
        assert!((p.yhat - 1600.0).abs() < 25.0, "yhat = {}", p.yhat);
        assert!(!p.is_historical);
    }

    #[test]
    fn weekly_pattern_lands_in_the_weekly_component() {
        let pattern = [1000.0, 1000.0, 1000.0, 1000.0, 1000.0, 2000.0, 2000.0];
        let history = series((0..56).map(|i| pattern[i % 7]));
        let model = DecompositionForecaster.fit(&history, &spec()).unwrap();
        let preds = model.predict(&history.iter().map(|(d, _)| *d).collect::<Vec<_>>());

        for (p, (_, actual)) in preds.iter().zip(&history) {
            assert!((p.yhat - actual).abs() < 20.0);
            assert!(p.is_historical);
        }
        let saturday = preds.iter().find(|p| p.date.weekday() == chrono::Weekday::Sat).unwrap();
        let monday = preds.iter().find(|p| p.date.weekday() == chrono::Weekday::Mon).unwrap();
        assert!(saturday.weekly > monday.weekly + 500.0);
    }

    #[test]
    fn yearly_term_needs_a_full_year() {
        let mut spec = spec();
        spec.yearly = true;
        let short = DecompositionForecaster.fit(&series((0..200).map(|_| 5.0)), &spec).unwrap();
        assert!(!short.has_yearly());
        let long = DecompositionForecaster.fit(&series((0..400).map(|_| 5.0)), &spec).unwrap();
        assert!(long.has_yearly());
    }

    #[test]
    fn holidays_outside_the_history_get_no_column() {
        let mut spec = spec();
        spec.holidays = russian_holidays(2025, 2026);
        let model = DecompositionForecaster.fit(&series((0..30).map(|_| 5.0)), &spec).unwrap();
        // Jan 6 to Feb 4 touches only new_year (through Jan 6) and christmas.
        assert_eq!(model.holiday_columns.len(), 2);
    }

    #[test]
    fn interval_widens_beyond_the_history() {
        let history = series((0..90).map(|i| 1000.0 + 5.0 * i as f64 + if i % 7 == 5 { 300.0 } else { 0.0 }));
        let model = DecompositionForecaster.fit(&history, &spec()).unwrap();
        let near = model.predict(&[start() + Duration::days(90)])[0];
        let far = model.predict(&[start() + Duration::days(180)])[0];
        assert!(near.lower <= near.yhat && near.yhat <= near.upper);
        assert!(far.upper - far.lower >= near.upper - near.lower);
    }

    #[test]
    fn rejects_degenerate_histories() {
        assert!(DecompositionForecaster.fit(&[], &spec()).is_err());
        assert!(DecompositionForecaster.fit(&series([1.0]), &spec()).is_err());
        assert!(matches!(
            DecompositionForecaster.fit(&series([1.0, f64::NAN, 2.0]), &spec()),
            Err(ForecastError::FitFailed(_))
        ));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn forecast_points_keep_interval_order(
            raw in proptest::collection::vec(0u32..50_000, 21..60),
            horizon in 1usize..40,
        ) {
            let history = series(raw.iter().map(|v| f64::from(*v)));
            let model = DecompositionForecaster.fit(&history, &spec()).unwrap();
            let last = history.last().unwrap().0;
            let mut dates: Vec<NaiveDate> = history.iter().map(|(d, _)| *d).collect();
            dates.extend((1..=horizon as i64).map(|i| last + Duration::days(i)));

            for p in model.predict(&dates) {
                prop_assert!(p.lower <= p.yhat && p.yhat <= p.upper);
                let point = ForecastPoint::from_prediction(&p);
                prop_assert!(point.lower_bound <= point.forecast);
                prop_assert!(point.forecast <= point.upper_bound);
                prop_assert!(point.lower_bound >= rust_decimal::Decimal::ZERO);
            }
        }
    }
}
