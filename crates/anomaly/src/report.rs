use crate::detector::{AnomalyDetector, SeriesKind};
use crate::error::AnomalyError;
use crate::hourly::detect_hourly;
use crate::types::Anomaly;
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use core_types::{
    AnomalyKind, CoreError, DailyMetrics, HourlyReading, MetricSeries, ProductDailySeries, SeriesPoint,
    Severity,
};
use insights::anomaly as text;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet};

const MAX_INSIGHTS: usize = 5;
const RECENT_DAYS: i64 = 7;
const FREQUENT_DROPS: usize = 3;

/// Everything the batch report scans.
#[derive(Debug, Clone, Default)]
pub struct AnomalyInputs {
    /// Venue-wide daily totals, chronological and gap-free.
    pub daily: Vec<DailyMetrics>,
    pub products: Vec<ProductDailySeries>,
    pub hourly: Vec<HourlyReading>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnomalyStats {
    pub total_anomalies: usize,
    pub by_type: BTreeMap<AnomalyKind, usize>,
    pub by_severity: BTreeMap<Severity, usize>,
    pub most_common_day: Option<String>,
    pub most_affected_metric: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyReport {
    pub period_start: Option<NaiveDate>,
    pub period_end: Option<NaiveDate>,
    /// Most severe first, then most recent first.
    pub anomalies: Vec<Anomaly>,
    pub stats: AnomalyStats,
    pub critical_count: usize,
    pub high_count: usize,
    pub requires_attention: bool,
    pub insights: Vec<String>,
}

fn daily_series(daily: &[DailyMetrics]) -> [(SeriesKind, MetricSeries); 3] {
    let build = |pick: fn(&DailyMetrics) -> rust_decimal::Decimal| {
        MetricSeries::new(daily.iter().map(|d| SeriesPoint::new(d.date, pick(d))).collect())
    };
    [
        (SeriesKind::Revenue, build(|d| d.revenue)),
        (SeriesKind::Receipts, build(|d| d.receipts)),
        (SeriesKind::AvgCheck, build(|d| d.avg_check)),
    ]
}

/// Aggregate counts over a list of anomalies.
pub fn calculate_stats(anomalies: &[Anomaly]) -> AnomalyStats {
    let mut by_type: BTreeMap<AnomalyKind, usize> = BTreeMap::new();
    let mut by_severity: BTreeMap<Severity, usize> = BTreeMap::new();
    let mut by_day: BTreeMap<u32, usize> = BTreeMap::new();
    for anomaly in anomalies {
        *by_type.entry(anomaly.kind).or_default() += 1;
        *by_severity.entry(anomaly.severity).or_default() += 1;
        *by_day
            .entry(anomaly.date.weekday().num_days_from_monday())
            .or_default() += 1;
    }

    // Ties go to the earliest weekday and the first kind in declaration order.
    let most_common_day = by_day
        .iter()
        .max_by_key(|(day, count)| (**count, Reverse(**day)))
        .and_then(|(day, _)| Weekday::try_from(*day as u8).ok())
        .map(|day| text::weekday_name(day).to_string());
    let most_affected_metric = by_type
        .iter()
        .max_by_key(|(kind, count)| (**count, Reverse(**kind)))
        .map(|(kind, _)| text::affected_metric_label(*kind))
        .unwrap_or(text::REVENUE_METRIC)
        .to_string();

    AnomalyStats {
        total_anomalies: anomalies.len(),
        by_type,
        by_severity,
        most_common_day,
        most_affected_metric,
    }
}

/// Up to five report-level insights. Recency is measured from `as_of`.
pub fn generate_insights(anomalies: &[Anomaly], stats: &AnomalyStats, as_of: NaiveDate) -> Vec<String> {
    let mut insights = Vec::new();

    let critical = anomalies.iter().filter(|a| a.severity == Severity::Critical).count();
    if critical > 0 {
        insights.push(text::critical_insight(critical));
    }

    let recent = anomalies
        .iter()
        .filter(|a| (as_of - a.date).num_days() <= RECENT_DAYS)
        .count();
    if recent > 0 {
        insights.push(text::recent_insight(recent));
    }

    let drops = anomalies.iter().filter(|a| a.kind == AnomalyKind::RevenueDrop).count();
    if drops > FREQUENT_DROPS {
        insights.push(text::frequent_drops_insight(drops));
    }

    let products: BTreeSet<_> = anomalies.iter().filter_map(|a| a.product_id).collect();
    if !products.is_empty() {
        insights.push(text::product_anomalies_insight(products.len()));
    }

    if let Some(day) = &stats.most_common_day {
        insights.push(text::weekday_insight(day));
    }

    insights.truncate(MAX_INSIGHTS);
    insights
}

impl AnomalyDetector {
    /// Runs every enabled detector and assembles the report.
    ///
    /// Every day from `from` to `as_of` is evaluated; without `from` the
    /// evaluated range is the `history_days` days ending at `as_of`. Up to
    /// `window_days` earlier days only warm up the rolling baselines. Products
    /// are the `top_products` best sellers by quantity over that range. Hourly
    /// readings are limited to the `hourly_days` days ending at `as_of`.
    pub fn generate_report(
        &self,
        inputs: &AnomalyInputs,
        as_of: NaiveDate,
        from: Option<NaiveDate>,
    ) -> Result<AnomalyReport, AnomalyError> {
        let params = self.params();
        let evaluate_from =
            from.unwrap_or(as_of - Duration::days(params.history_days.saturating_sub(1) as i64));
        if evaluate_from > as_of {
            return Err(CoreError::invalid_parameter(
                "period",
                format!("start {evaluate_from} is after {as_of}"),
            )
            .into());
        }
        let warm_up_from = evaluate_from - Duration::days(params.window_days as i64);
        let in_range = |a: &Anomaly| a.date >= evaluate_from;
        let mut anomalies = Vec::new();

        let daily: Vec<DailyMetrics> = inputs
            .daily
            .iter()
            .filter(|d| d.date >= warm_up_from && d.date <= as_of)
            .copied()
            .collect();
        for (kind, series) in daily_series(&daily) {
            anomalies.extend(self.detect(&series, &kind)?.into_iter().filter(in_range));
        }

        if params.include_products {
            let mut trimmed: Vec<ProductDailySeries> = inputs
                .products
                .iter()
                .map(|product| ProductDailySeries {
                    series: product.series.between(warm_up_from, as_of),
                    ..product.clone()
                })
                .collect();
            trimmed.sort_by(|a, b| {
                b.series
                    .between(evaluate_from, as_of)
                    .sum()
                    .cmp(&a.series.between(evaluate_from, as_of).sum())
            });
            for product in trimmed.iter().take(params.top_products) {
                anomalies.extend(self.detect_product(product)?.into_iter().filter(in_range));
            }
        }

        if params.include_hourly {
            let cutoff = as_of - Duration::days(params.hourly_days as i64);
            let recent: Vec<HourlyReading> = inputs
                .hourly
                .iter()
                .filter(|r| r.date > cutoff && r.date <= as_of)
                .copied()
                .collect();
            anomalies.extend(detect_hourly(&recent, params.hourly_min_readings, params.hourly_min_z));
        }

        anomalies.sort_by(|a, b| (b.severity, b.date).cmp(&(a.severity, a.date)));

        let stats = calculate_stats(&anomalies);
        let critical_count = stats.by_severity.get(&Severity::Critical).copied().unwrap_or(0);
        let high_count = stats.by_severity.get(&Severity::High).copied().unwrap_or(0);
        let insights = generate_insights(&anomalies, &stats, as_of);

        tracing::debug!(
            total = anomalies.len(),
            critical = critical_count,
            high = high_count,
            %evaluate_from,
            %as_of,
            "Anomaly report generated"
        );

        let evaluated = daily.iter().filter(|d| d.date >= evaluate_from);
        Ok(AnomalyReport {
            period_start: evaluated.clone().next().map(|d| d.date),
            period_end: evaluated.last().map(|d| d.date),
            anomalies,
            stats,
            critical_count,
            high_count,
            requires_attention: critical_count > 0 || high_count > 2,
            insights,
        })
    }
}
