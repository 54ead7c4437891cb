use crate::analyzer::ForecastAnalyzer;
use crate::error::ForecastError;
use crate::holidays::russian_holidays;
use crate::model::{Changepoint, FittedModel, Forecaster, ModelSpec, Prediction};
use crate::types::{
    ForecastAccuracy, ForecastPoint, RevenueForecast, SeasonalComponent, SeasonalFactor,
    TrendComponent, to_decimal,
};
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use core_types::stats::mean;
use core_types::{MetricSeries, TrendDirection};
use insights::anomaly::weekday_name;
use insights::forecast as text;
use rust_decimal::Decimal;
use tracing::debug;

const MAX_CHANGEPOINTS: usize = 5;
const MAX_INSIGHTS: usize = 5;
/// Accuracy is only reported over a holdout at least this long.
const MIN_BACKTEST_POINTS: usize = 30;
/// Changepoints whose fitted slope change is below this (per day) are ignored.
const CHANGEPOINT_EPSILON: f64 = 1e-6;
/// Points whose trend is closer to zero than this give no seasonal ratio.
const MIN_TREND: f64 = 1e-6;

/// The dates after `last`, one per day.
pub(crate) fn horizon_dates(last: NaiveDate, days: usize) -> Vec<NaiveDate> {
    (1..=days as i64).map(|i| last + Duration::days(i)).collect()
}

/// Averages `component / trend` per group and turns it into an index around 1.
/// A group with no usable ratio is neutral (1.0).
fn seasonal_factors<K: PartialEq + Copy>(
    predictions: &[Prediction],
    groups: &[(K, String)],
    key: impl Fn(&Prediction) -> K,
    component: impl Fn(&Prediction) -> f64,
) -> Vec<SeasonalFactor> {
    groups
        .iter()
        .map(|(group, label)| {
            let ratios: Vec<f64> = predictions
                .iter()
                .filter(|p| key(p) == *group && p.trend.abs() >= MIN_TREND)
                .map(|p| component(p) / p.trend)
                .filter(|r| r.is_finite())
                .collect();
            let factor = if ratios.is_empty() {
                1.0
            } else {
                1.0 + ratios.iter().sum::<f64>() / ratios.len() as f64
            };
            SeasonalFactor {
                label: label.clone(),
                factor: to_decimal(if factor.is_finite() { factor } else { 1.0 }, 2),
            }
        })
        .collect()
}

fn component(name: &str, pattern: Vec<SeasonalFactor>) -> Option<SeasonalComponent> {
    let max = pattern.iter().map(|f| f.factor).max()?;
    let min = pattern.iter().map(|f| f.factor).min()?;
    Some(SeasonalComponent {
        name: name.to_string(),
        strength: (max - min).round_dp(2),
        pattern,
    })
}

const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Weekly and yearly components the model carries, as per-weekday and
/// per-month indices over the whole frame.
pub fn extract_seasonality<M: FittedModel>(model: &M, frame: &[Prediction]) -> Vec<SeasonalComponent> {
    let mut components = Vec::new();

    if model.has_weekly() {
        let groups: Vec<(Weekday, String)> = WEEKDAYS
            .iter()
            .map(|d| (*d, weekday_name(*d).to_string()))
            .collect();
        let pattern = seasonal_factors(frame, &groups, |p| p.date.weekday(), |p| p.weekly);
        components.extend(component("weekly", pattern));
    }

    if model.has_yearly() {
        let groups: Vec<(u32, String)> = (1..=12)
            .map(|m| (m, text::month_name(m).to_string()))
            .collect();
        let pattern = seasonal_factors(frame, &groups, |p| p.date.month(), |p| p.yearly);
        components.extend(component("yearly", pattern));
    }

    components
}

/// The largest changepoints by magnitude, reported chronologically.
fn significant_changepoints(mut changepoints: Vec<Changepoint>) -> Vec<NaiveDate> {
    changepoints.retain(|c| c.rate_change.abs() > CHANGEPOINT_EPSILON);
    changepoints.sort_by(|a, b| b.rate_change.abs().total_cmp(&a.rate_change.abs()));
    changepoints.truncate(MAX_CHANGEPOINTS);
    let mut dates: Vec<NaiveDate> = changepoints.into_iter().map(|c| c.date).collect();
    dates.sort();
    dates
}

/// Average daily trend change over the frame, classified against `threshold`.
pub fn extract_trend<M: FittedModel>(model: &M, frame: &[Prediction], threshold: Decimal) -> TrendComponent {
    let slope = match (frame.first(), frame.last()) {
        (Some(first), Some(last)) if frame.len() > 1 => (last.trend - first.trend) / frame.len() as f64,
        _ => 0.0,
    };
    let slope = to_decimal(slope, 2);
    TrendComponent {
        direction: TrendDirection::classify(slope, threshold),
        slope,
        change_points: significant_changepoints(model.changepoints()),
    }
}

/// Up to five insights on growth, trend, the weekly pattern and accuracy.
pub fn generate_insights(forecast: &RevenueForecast) -> Vec<String> {
    let mut insights = Vec::new();

    if forecast.growth_percent > Decimal::TEN {
        insights.push(text::growth_insight(forecast.growth_percent));
    } else if forecast.growth_percent < -Decimal::TEN {
        insights.push(text::decline_insight(forecast.growth_percent));
    }

    match forecast.trend.direction {
        TrendDirection::Up => insights.push(text::uptrend_insight(forecast.trend.slope)),
        TrendDirection::Down => insights.push(text::downtrend_insight(forecast.trend.slope)),
        TrendDirection::Stable => {}
    }

    if let Some(weekly) = forecast.seasonality.iter().find(|c| c.name == "weekly") {
        // First occurrence wins on ties.
        let best = weekly
            .pattern
            .iter()
            .fold(None::<&SeasonalFactor>, |acc, f| match acc {
                Some(b) if b.factor >= f.factor => Some(b),
                _ => Some(f),
            });
        let worst = weekly
            .pattern
            .iter()
            .fold(None::<&SeasonalFactor>, |acc, f| match acc {
                Some(w) if w.factor <= f.factor => Some(w),
                _ => Some(f),
            });
        if let (Some(best), Some(worst)) = (best, worst) {
            insights.push(text::weekday_pattern_insight(
                &best.label,
                best.factor,
                &worst.label,
                worst.factor,
            ));
        }
    }

    if let Some(accuracy) = &forecast.accuracy {
        if accuracy.mape < Decimal::TEN {
            insights.push(text::high_accuracy_insight(accuracy.mape));
        } else if accuracy.mape > Decimal::from(25) {
            insights.push(text::low_accuracy_insight(accuracy.mape));
        }
    }

    insights.truncate(MAX_INSIGHTS);
    insights
}

impl<F: Forecaster> ForecastAnalyzer<F> {
    /// Daily revenue forecast over the configured horizon.
    ///
    /// Fits on the trailing `history_days` points; fewer than
    /// `min_history_points` is an `InsufficientData` error.
    pub fn forecast_revenue(&self, history: &MetricSeries) -> Result<RevenueForecast, ForecastError> {
        history.validate()?;
        let params = &self.params;
        let series = history.tail(params.history_days);
        let Some(last) = series.last_date().filter(|_| series.len() >= params.min_history_points) else {
            return Err(ForecastError::insufficient(params.min_history_points, series.len()));
        };
        let data = series.to_f64();

        let future = horizon_dates(last, params.horizon_days);
        let first_year = data.first().map(|(d, _)| d.year()).unwrap_or(last.year());
        let last_year = future.last().map(|d| d.year()).unwrap_or(last.year()) + 1;
        let spec = ModelSpec::revenue(params, russian_holidays(first_year, last_year));

        let model = self.forecaster.fit(&data, &spec)?;

        let mut dates: Vec<NaiveDate> = data.iter().map(|(d, _)| *d).collect();
        dates.extend(future.iter().copied());
        let frame = model.predict(&dates);
        let (fitted, ahead) = frame.split_at(data.len());

        let historical: Vec<ForecastPoint> = fitted[fitted.len().saturating_sub(params.historical_points)..]
            .iter()
            .map(ForecastPoint::from_prediction)
            .collect();
        let forecast: Vec<ForecastPoint> = ahead.iter().map(ForecastPoint::from_prediction).collect();

        let backtest_from = data.len().saturating_sub(params.backtest_days);
        let accuracy = (data.len() - backtest_from >= MIN_BACKTEST_POINTS).then(|| {
            let actual: Vec<f64> = data[backtest_from..].iter().map(|(_, y)| *y).collect();
            let predicted: Vec<f64> = fitted[backtest_from..].iter().map(|p| p.yhat).collect();
            ForecastAccuracy::compute(&actual, &predicted)
        });

        let seasonality = extract_seasonality(&model, &frame);
        let trend = extract_trend(&model, &frame, params.trend_slope_threshold);

        let total: Decimal = forecast.iter().map(|p| p.forecast).sum();
        let avg_daily = if forecast.is_empty() {
            Decimal::ZERO
        } else {
            total / Decimal::from(forecast.len())
        };
        let historical_avg = mean(&series.values());
        let growth_percent = if historical_avg > Decimal::ZERO {
            ((avg_daily - historical_avg) / historical_avg * Decimal::ONE_HUNDRED).round_dp(1)
        } else {
            Decimal::ZERO
        };

        let mut result = RevenueForecast {
            forecast_start: forecast.first().map(|p| p.date).unwrap_or(last),
            forecast_end: forecast.last().map(|p| p.date).unwrap_or(last),
            horizon_days: params.horizon_days,
            historical,
            forecast,
            accuracy,
            seasonality,
            trend,
            total_forecast: total.round_dp(2),
            avg_daily_forecast: avg_daily.round_dp(2),
            growth_percent,
            insights: Vec::new(),
        };
        result.insights = generate_insights(&result);

        debug!(
            points = data.len(),
            horizon = params.horizon_days,
            total = %result.total_forecast,
            trend = %result.trend.direction,
            "Revenue forecast complete"
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use configuration::ForecastParams;
    use core_types::CoreError;
    use rust_decimal_macros::dec;

    fn start() -> NaiveDate {
        // A Monday.
        NaiveDate::from_ymd_opt(2025, 3, 3).unwrap()
    }

    fn weekly_series(weeks: usize) -> MetricSeries {
        let pattern = [
            dec!(10000),
            dec!(10000),
            dec!(10000),
            dec!(10000),
            dec!(12000),
            dec!(16000),
            dec!(14000),
        ];
        let values: Vec<Decimal> = (0..weeks * 7).map(|i| pattern[i % 7]).collect();
        MetricSeries::from_values(start(), &values)
    }

    fn analyzer() -> ForecastAnalyzer {
        ForecastAnalyzer::new(ForecastParams::default()).unwrap()
    }

    fn prediction(day: i64, trend: f64, weekly: f64) -> Prediction {
        Prediction {
            date: start() + Duration::days(day),
            yhat: trend + weekly,
            lower: 0.0,
            upper: 0.0,
            trend,
            weekly,
            yearly: 0.0,
            holidays: 0.0,
            is_historical: true,
        }
    }

    #[test]
    fn near_zero_trend_gives_neutral_seasonal_factors() {
        let groups: Vec<(Weekday, String)> =
            WEEKDAYS.iter().map(|d| (*d, weekday_name(*d).to_string())).collect();
        let mut frame: Vec<Prediction> = (0..14).map(|i| prediction(i, 1e-12, 50.0)).collect();
        // One real Monday: the weekly part is 20% of the trend.
        frame.push(prediction(14, 1000.0, 200.0));

        let factors = seasonal_factors(&frame, &groups, |p| p.date.weekday(), |p| p.weekly);

        assert_eq!(factors.len(), 7);
        assert_eq!(factors[0].factor, dec!(1.2));
        assert!(factors[1..].iter().all(|f| f.factor == Decimal::ONE));
    }

    #[test]
    fn short_history_is_refused() {
        let series = MetricSeries::from_values(start(), &[dec!(100); 29]);
        let err = analyzer().forecast_revenue(&series).unwrap_err();
        assert!(matches!(
            err,
            ForecastError::Core(CoreError::InsufficientData { required: 30, actual: 29 })
        ));
    }

    #[test]
    fn periodic_week_gives_stable_trend_and_weekly_strength() {
        let result = analyzer().forecast_revenue(&weekly_series(12)).unwrap();

        assert_eq!(result.trend.direction, TrendDirection::Stable);
        let weekly = result.seasonality.iter().find(|c| c.name == "weekly").unwrap();
        assert!(weekly.strength > Decimal::ZERO);
        assert_eq!(weekly.pattern.len(), 7);
        assert_eq!(weekly.pattern[5].label, "Суббота");
        assert!(result.seasonality.iter().all(|c| c.name != "yearly"));

        assert_eq!(result.forecast.len(), 30);
        assert_eq!(result.historical.len(), 84);
        assert_eq!(result.forecast_start, start() + Duration::days(84));
        assert!(result.historical.iter().all(|p| p.is_historical));
        assert!(result.forecast.iter().all(|p| !p.is_historical));
    }

    #[test]
    fn periodic_week_is_reproduced_accurately() {
        let result = analyzer().forecast_revenue(&weekly_series(12)).unwrap();
        let accuracy = result.accuracy.clone().unwrap();
        assert!(accuracy.mape < dec!(2), "mape {}", accuracy.mape);
        assert!(result.growth_percent.abs() < dec!(2));
        assert!(result.insights.iter().any(|i| i.contains("Лучший день: Суббота")));
    }

    #[test]
    fn intervals_are_ordered() {
        let result = analyzer().forecast_revenue(&weekly_series(10)).unwrap();
        for p in result.historical.iter().chain(&result.forecast) {
            assert!(p.lower_bound <= p.forecast && p.forecast <= p.upper_bound);
            assert!(p.lower_bound >= Decimal::ZERO);
        }
    }

    #[test]
    fn strong_growth_is_an_uptrend() {
        let values: Vec<Decimal> = (0..60).map(|i| Decimal::from(5000 + 400 * i)).collect();
        let result = analyzer()
            .forecast_revenue(&MetricSeries::from_values(start(), &values))
            .unwrap();
        assert_eq!(result.trend.direction, TrendDirection::Up);
        assert!(result.trend.slope > dec!(100));
        assert!(result.growth_percent > Decimal::TEN);
        assert!(result.insights[0].starts_with("📈"));
        assert!(result.trend.change_points.len() <= 5);
    }

    #[test]
    fn only_trailing_history_is_used() {
        let mut params = ForecastParams::default();
        params.history_days = 35;
        params.historical_points = 90;
        let analyzer = ForecastAnalyzer::new(params).unwrap();
        let result = analyzer.forecast_revenue(&weekly_series(10)).unwrap();
        assert_eq!(result.historical.len(), 35);
    }

    #[test]
    fn short_history_reports_no_accuracy() {
        let mut params = ForecastParams::default();
        params.min_history_points = 20;
        let analyzer = ForecastAnalyzer::new(params).unwrap();
        let values: Vec<Decimal> = (0..20).map(|i| Decimal::from(1000 + 10 * i)).collect();

        let result = analyzer
            .forecast_revenue(&MetricSeries::from_values(start(), &values))
            .unwrap();

        assert!(result.accuracy.is_none());
        assert!(result.insights.iter().all(|i| !i.contains("MAPE")));
    }

    #[test]
    fn short_backtest_window_reports_no_accuracy() {
        let mut params = ForecastParams::default();
        params.backtest_days = 14;
        let analyzer = ForecastAnalyzer::new(params).unwrap();

        let result = analyzer.forecast_revenue(&weekly_series(12)).unwrap();

        assert!(result.accuracy.is_none());
        assert!(result.insights.iter().all(|i| !i.contains("MAPE")));
    }

    #[test]
    fn missing_backtest_window_is_rejected() {
        let mut params = ForecastParams::default();
        params.backtest_days = 0;
        assert!(ForecastAnalyzer::new(params).is_err());
    }

    #[test]
    fn changepoints_are_top_five_in_date_order() {
        let day = |d| start() + Duration::days(d);
        let cps = vec![
            Changepoint { date: day(1), rate_change: 0.5 },
            Changepoint { date: day(2), rate_change: -9.0 },
            Changepoint { date: day(3), rate_change: 0.0 },
            Changepoint { date: day(4), rate_change: 3.0 },
            Changepoint { date: day(5), rate_change: 2.0 },
            Changepoint { date: day(6), rate_change: -4.0 },
            Changepoint { date: day(7), rate_change: 1.0 },
        ];
        assert_eq!(
            significant_changepoints(cps),
            vec![day(2), day(4), day(5), day(6), day(7)]
        );
    }
}
