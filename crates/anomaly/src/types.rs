use chrono::NaiveDate;
use core_types::{AnomalyKind, Severity};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One detected deviation from the expected level of a metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anomaly {
    pub kind: AnomalyKind,
    pub severity: Severity,
    pub date: NaiveDate,
    /// Set for hour-of-day anomalies only.
    pub hour: Option<u32>,
    pub actual_value: Decimal,
    /// Mean of the baseline the value was compared against.
    pub expected_value: Decimal,
    pub deviation_percent: Decimal,
    pub z_score: Decimal,
    pub metric_name: String,
    pub description: String,
    pub possible_causes: Vec<String>,
    pub recommended_actions: Vec<String>,
    pub product_id: Option<Uuid>,
    pub product_name: Option<String>,
}

impl Anomaly {
    pub fn is_spike(&self) -> bool {
        self.z_score > Decimal::ZERO
    }
}

/// The statistical part of a verdict, before any presentation text is attached.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Verdict {
    pub severity: Severity,
    pub actual: Decimal,
    pub expected: Decimal,
    pub deviation_percent: Decimal,
    pub z_score: Decimal,
}

impl Verdict {
    /// Scores `value` against a baseline with mean `mu` and population std `sigma`.
    /// `None` when `sigma` is zero, the value is within the low threshold, or
    /// the arithmetic overflows `Decimal`.
    pub fn score(value: Decimal, mu: Decimal, sigma: Decimal) -> Option<Self> {
        if sigma.is_zero() {
            return None;
        }
        let diff = value.checked_sub(mu)?;
        let z = diff.checked_div(sigma)?;
        let severity = Severity::from_z_score(z)?;
        let deviation = if mu.is_zero() {
            Decimal::ZERO
        } else {
            diff.checked_div(mu)?.checked_mul(Decimal::ONE_HUNDRED)?
        };
        Some(Self {
            severity,
            actual: value.round_dp(2),
            expected: mu.round_dp(2),
            deviation_percent: deviation.round_dp(1),
            z_score: z.round_dp(2),
        })
    }

    /// |z| is at least the low threshold here, so the rounded sign is the true sign.
    pub fn is_spike(&self) -> bool {
        self.z_score > Decimal::ZERO
    }
}
