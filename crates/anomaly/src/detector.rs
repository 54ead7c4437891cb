use crate::error::AnomalyError;
use crate::types::{Anomaly, Verdict};
use configuration::AnomalyParams;
use core_types::stats::{mean, population_std};
use core_types::{AnomalyKind, CoreError, MetricSeries, ProductDailySeries};
use insights::anomaly as text;
use uuid::Uuid;

/// Which metric a daily series measures. Decides the anomaly kinds and labels.
#[derive(Debug, Clone, PartialEq)]
pub enum SeriesKind {
    Revenue,
    Receipts,
    AvgCheck,
    Product { id: Uuid, name: String },
}

impl SeriesKind {
    pub fn spike_kind(&self) -> AnomalyKind {
        match self {
            SeriesKind::Revenue => AnomalyKind::RevenueSpike,
            SeriesKind::Receipts => AnomalyKind::TrafficSpike,
            SeriesKind::AvgCheck => AnomalyKind::AvgCheckSpike,
            SeriesKind::Product { .. } => AnomalyKind::ProductSpike,
        }
    }

    pub fn drop_kind(&self) -> AnomalyKind {
        match self {
            SeriesKind::Revenue => AnomalyKind::RevenueDrop,
            SeriesKind::Receipts => AnomalyKind::TrafficDrop,
            SeriesKind::AvgCheck => AnomalyKind::AvgCheckDrop,
            SeriesKind::Product { .. } => AnomalyKind::ProductDrop,
        }
    }

    pub fn metric_name(&self) -> String {
        match self {
            SeriesKind::Revenue => text::REVENUE_METRIC.to_string(),
            SeriesKind::Receipts => text::RECEIPTS_METRIC.to_string(),
            SeriesKind::AvgCheck => text::AVG_CHECK_METRIC.to_string(),
            SeriesKind::Product { name, .. } => text::product_metric(name),
        }
    }
}

/// Rolling z-score detection over one gap-free daily series.
///
/// Every point from index `window` on is compared with the `window` points
/// before it (the point itself is not part of its own baseline). A flat
/// baseline gives no verdict. Shorter series produce nothing.
pub fn detect(
    series: &MetricSeries,
    window: usize,
    kind: &SeriesKind,
) -> Result<Vec<Anomaly>, AnomalyError> {
    if window < 2 {
        return Err(CoreError::invalid_parameter("window_days", "must be at least 2").into());
    }
    series.validate()?;

    let values = series.values();
    let metric_name = kind.metric_name();
    let (product_id, product_name) = match kind {
        SeriesKind::Product { id, name } => (Some(*id), Some(name.clone())),
        _ => (None, None),
    };

    let mut anomalies = Vec::new();
    for i in window..values.len() {
        let baseline = &values[i - window..i];
        let mu = mean(baseline);
        let sigma = population_std(baseline);
        let Some(verdict) = Verdict::score(values[i], mu, sigma) else {
            continue;
        };

        let anomaly_kind = if verdict.is_spike() {
            kind.spike_kind()
        } else {
            kind.drop_kind()
        };
        anomalies.push(Anomaly {
            kind: anomaly_kind,
            severity: verdict.severity,
            date: series.points[i].date,
            hour: None,
            actual_value: verdict.actual,
            expected_value: verdict.expected,
            deviation_percent: verdict.deviation_percent,
            z_score: verdict.z_score,
            description: text::description(&metric_name, verdict.is_spike(), verdict.deviation_percent),
            metric_name: metric_name.clone(),
            possible_causes: text::possible_causes(anomaly_kind),
            recommended_actions: text::recommended_actions(anomaly_kind, verdict.severity),
            product_id,
            product_name: product_name.clone(),
        });
    }

    tracing::debug!(
        metric = %metric_name,
        points = values.len(),
        window,
        found = anomalies.len(),
        "Rolling detection complete"
    );
    Ok(anomalies)
}

/// Detector bound to one set of parameters.
#[derive(Debug, Clone)]
pub struct AnomalyDetector {
    params: AnomalyParams,
}

impl AnomalyDetector {
    pub fn new(params: AnomalyParams) -> Result<Self, AnomalyError> {
        params.validate()?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &AnomalyParams {
        &self.params
    }

    pub fn detect(&self, series: &MetricSeries, kind: &SeriesKind) -> Result<Vec<Anomaly>, AnomalyError> {
        detect(series, self.params.window_days, kind)
    }

    /// Product sales anomalies for one product. Series shorter than the configured
    /// minimum are skipped.
    pub fn detect_product(&self, product: &ProductDailySeries) -> Result<Vec<Anomaly>, AnomalyError> {
        if product.series.len() < self.params.min_product_points {
            tracing::debug!(product = %product.product_name, "Product series too short, skipped");
            return Ok(Vec::new());
        }
        let kind = SeriesKind::Product {
            id: product.product_id,
            name: product.product_name.clone(),
        };
        self.detect(&product.series, &kind)
    }
}
