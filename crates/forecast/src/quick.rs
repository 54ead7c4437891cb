use crate::analyzer::ForecastAnalyzer;
use crate::error::ForecastError;
use crate::model::{FittedModel, Forecaster, ModelSpec};
use crate::revenue::horizon_dates;
use crate::types::ForecastPoint;
use chrono::NaiveDate;
use core_types::MetricSeries;
use core_types::stats::mean;
use rust_decimal_macros::dec;

/// Below this many points the quick forecast is a flat average.
const QUICK_MIN_POINTS: usize = 14;

impl<F: Forecaster> ForecastAnalyzer<F> {
    /// Short forecast for dashboard widgets: weekly seasonality only, no
    /// accuracy or component analysis. The horizon starts the day after `as_of`;
    /// with no history at all every point is zero.
    pub fn quick_forecast(&self, history: &MetricSeries, as_of: NaiveDate) -> Result<Vec<ForecastPoint>, ForecastError> {
        history.validate()?;
        let series = history.tail(self.params.quick_history_days);
        let dates = horizon_dates(as_of, self.params.quick_days);

        if series.len() < QUICK_MIN_POINTS {
            let level = mean(&series.values());
            return Ok(dates
                .into_iter()
                .map(|d| ForecastPoint::flat(d, level, dec!(0.8), dec!(1.2)))
                .collect());
        }

        let model = self
            .forecaster
            .fit(&series.to_f64(), &ModelSpec::quick(&self.params))?;
        Ok(model
            .predict(&dates)
            .iter()
            .map(ForecastPoint::from_prediction)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use configuration::ForecastParams;
    use rust_decimal::Decimal;

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 4, 7).unwrap()
    }

    fn analyzer() -> ForecastAnalyzer {
        ForecastAnalyzer::new(ForecastParams::default()).unwrap()
    }

    #[test]
    fn short_history_is_a_flat_average() {
        let series = MetricSeries::from_values(start(), &[dec!(100), dec!(200), dec!(300)]);
        let points = analyzer()
            .quick_forecast(&series, start() + Duration::days(2))
            .unwrap();
        assert_eq!(points.len(), 7);
        assert_eq!(points[0].date, start() + Duration::days(3));
        assert_eq!(points[0].forecast, dec!(200));
        assert_eq!(points[0].lower_bound, dec!(160));
        assert_eq!(points[0].upper_bound, dec!(240));
    }

    #[test]
    fn fitted_quick_forecast_follows_the_week() {
        let pattern = [dec!(500), dec!(500), dec!(500), dec!(500), dec!(700), dec!(900), dec!(800)];
        let values: Vec<Decimal> = (0..42).map(|i| pattern[i % 7]).collect();
        let series = MetricSeries::from_values(start(), &values);
        let points = analyzer()
            .quick_forecast(&series, start() + Duration::days(41))
            .unwrap();
        assert_eq!(points.len(), 7);
        // The horizon starts on a Monday; Saturday is the sixth point.
        assert!(points[5].forecast > points[0].forecast);
        for p in &points {
            assert!(p.lower_bound <= p.forecast && p.forecast <= p.upper_bound);
        }
    }

    #[test]
    fn empty_history_forecasts_zero() {
        let points = analyzer()
            .quick_forecast(&MetricSeries::default(), start())
            .unwrap();
        assert_eq!(points.len(), 7);
        assert_eq!(points[0].date, start() + Duration::days(1));
        for p in &points {
            assert_eq!(p.forecast, Decimal::ZERO);
            assert_eq!(p.lower_bound, Decimal::ZERO);
            assert_eq!(p.upper_bound, Decimal::ZERO);
        }
    }
}
