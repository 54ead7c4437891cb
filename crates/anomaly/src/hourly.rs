use crate::types::{Anomaly, Verdict};
use core_types::stats::{mean, population_std};
use core_types::{AnomalyKind, HourlyReading};
use insights::anomaly as text;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// Compares every reading with all readings at the same hour of day.
///
/// Unlike the rolling detector, the baseline includes the reading being judged,
/// so a single hour with few observations cannot dominate its own verdict.
/// Hours with fewer than `min_readings` observations are not judged, and only
/// verdicts with |z| >= `min_z` are reported.
pub fn detect_hourly(readings: &[HourlyReading], min_readings: usize, min_z: Decimal) -> Vec<Anomaly> {
    let mut by_hour: BTreeMap<u32, Vec<Decimal>> = BTreeMap::new();
    for reading in readings {
        by_hour.entry(reading.hour).or_default().push(reading.revenue);
    }

    let baselines: BTreeMap<u32, (Decimal, Decimal)> = by_hour
        .into_iter()
        .filter(|(_, values)| values.len() >= min_readings)
        .map(|(hour, values)| (hour, (mean(&values), population_std(&values))))
        .collect();

    let mut anomalies = Vec::new();
    for reading in readings {
        let Some(&(mu, sigma)) = baselines.get(&reading.hour) else {
            continue;
        };
        let Some(verdict) = Verdict::score(reading.revenue, mu, sigma) else {
            continue;
        };
        if verdict.z_score.abs() < min_z {
            continue;
        }

        let borrowed_kind = if verdict.is_spike() {
            AnomalyKind::RevenueSpike
        } else {
            AnomalyKind::RevenueDrop
        };
        anomalies.push(Anomaly {
            kind: AnomalyKind::HourlyAnomaly,
            severity: verdict.severity,
            date: reading.date,
            hour: Some(reading.hour),
            actual_value: verdict.actual,
            expected_value: verdict.expected,
            deviation_percent: verdict.deviation_percent,
            z_score: verdict.z_score,
            metric_name: text::hourly_metric(reading.hour),
            description: text::hourly_description(
                reading.hour,
                verdict.is_spike(),
                verdict.deviation_percent,
            ),
            possible_causes: text::possible_causes(borrowed_kind),
            recommended_actions: text::hourly_actions(),
            product_id: None,
            product_name: None,
        });
    }

    tracing::debug!(
        readings = readings.len(),
        hours = baselines.len(),
        found = anomalies.len(),
        "Hourly detection complete"
    );
    anomalies
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};
    use core_types::Severity;
    use rust_decimal_macros::dec;

    fn readings(hour: u32, values: &[Decimal]) -> Vec<HourlyReading> {
        let start = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        values
            .iter()
            .enumerate()
            .map(|(i, v)| HourlyReading {
                date: start + Duration::days(i as i64),
                hour,
                revenue: *v,
            })
            .collect()
    }

    #[test]
    fn outlier_hour_is_reported_against_its_own_hour() {
        let mut values = vec![dec!(1000); 20];
        values.push(dec!(11000));
        let mut input = readings(13, &values);
        // A different hour with a very different level must not interfere.
        input.extend(readings(9, &[dec!(50); 21]));

        let found = detect_hourly(&input, 5, dec!(3));
        assert_eq!(found.len(), 1);
        let anomaly = &found[0];
        assert_eq!(anomaly.hour, Some(13));
        assert_eq!(anomaly.kind, AnomalyKind::HourlyAnomaly);
        // Baseline includes the outlier: mean 1476.19, z = sqrt(20) = 4.47
        assert_eq!(anomaly.expected_value, dec!(1476.19));
        assert_eq!(anomaly.z_score, dec!(4.47));
        assert_eq!(anomaly.severity, Severity::High);
        assert_eq!(anomaly.metric_name, "Выручка в 13:00");
        assert_eq!(anomaly.recommended_actions.len(), 2);
    }

    #[test]
    fn sparse_hours_and_mild_deviations_are_ignored() {
        // Only four readings at this hour.
        let sparse = readings(8, &[dec!(10), dec!(10), dec!(10), dec!(1000)]);
        assert!(detect_hourly(&sparse, 5, dec!(3)).is_empty());

        // With five points one outlier cannot reach |z| >= 3: max z = 2.
        let mild = readings(8, &[dec!(10), dec!(10), dec!(10), dec!(10), dec!(1000)]);
        assert!(detect_hourly(&mild, 5, dec!(3)).is_empty());
    }
}
