use chrono::{Duration, NaiveDate};
use core_types::{
    BasketRecord, Catalog, CoreError, DailyMetrics, HourlyReading, MetricSeries, ProductAggregate,
    ProductDailySeries,
};
use serde::{Deserialize, Serialize};

/// An inclusive range of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Period {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, CoreError> {
        if start > end {
            return Err(CoreError::invalid_parameter(
                "period",
                format!("start {start} is after end {end}"),
            ));
        }
        Ok(Self { start, end })
    }

    /// The `days` days ending on `end`, inclusive.
    pub fn ending(end: NaiveDate, days: usize) -> Self {
        let back = days.saturating_sub(1) as i64;
        Self {
            start: end - Duration::days(back),
            end,
        }
    }

    pub fn days(&self) -> usize {
        ((self.end - self.start).num_days() + 1) as usize
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        day >= self.start && day <= self.end
    }

    /// Moves the start forward to `first` when it lies inside the period.
    pub fn clamp_start(self, first: Option<NaiveDate>) -> Self {
        match first {
            Some(first) if first > self.start && first <= self.end => Self { start: first, ..self },
            _ => self,
        }
    }
}

/// Supplies the aggregated series the analyzers run on.
///
/// Daily series must come back zero-filled over the whole period, in
/// chronological order.
pub trait SeriesProvider {
    fn daily_metrics(&self, period: Period) -> Vec<DailyMetrics>;

    fn revenue_series(&self, period: Period) -> MetricSeries {
        let points = self
            .daily_metrics(period)
            .into_iter()
            .map(|d| core_types::SeriesPoint::new(d.date, d.revenue))
            .collect();
        MetricSeries::new(points)
    }

    fn hourly_readings(&self, period: Period) -> Vec<HourlyReading>;

    fn product_aggregates(&self, period: Period) -> Vec<ProductAggregate>;

    fn product_series(&self, period: Period) -> Vec<ProductDailySeries>;

    fn baskets(&self, period: Period) -> Vec<BasketRecord>;

    fn catalog(&self) -> Catalog;

    /// First day with any data, when known. History requests are clamped to
    /// it so forecasts and rolling baselines do not see days before trading began.
    fn data_start(&self) -> Option<NaiveDate> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    #[test]
    fn period_is_inclusive() {
        let period = Period::new(day(1), day(7)).unwrap();
        assert_eq!(period.days(), 7);
        assert!(period.contains(day(7)));
        assert!(!period.contains(day(8)));
        assert_eq!(Period::ending(day(7), 7), period);
    }

    #[test]
    fn clamp_only_moves_the_start_forward() {
        let period = Period::new(day(1), day(10)).unwrap();
        assert_eq!(period.clamp_start(Some(day(4))).start, day(4));
        assert_eq!(period.clamp_start(Some(day(11))), period);
        assert_eq!(period.clamp_start(None), period);
    }

    #[test]
    fn reversed_period_is_rejected() {
        assert!(Period::new(day(2), day(1)).is_err());
    }
}
