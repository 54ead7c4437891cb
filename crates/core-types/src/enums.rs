use crate::error::CoreError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The metric an ABC analysis ranks products by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    #[default]
    Revenue,
    Profit,
    Quantity,
}

impl FromStr for Metric {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "revenue" => Ok(Metric::Revenue),
            "profit" => Ok(Metric::Profit),
            "quantity" => Ok(Metric::Quantity),
            other => Err(CoreError::invalid_parameter(
                "metric",
                format!("unknown metric '{other}', expected revenue, profit or quantity"),
            )),
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Metric::Revenue => "revenue",
            Metric::Profit => "profit",
            Metric::Quantity => "quantity",
        };
        f.write_str(name)
    }
}

/// Pareto tier of a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AbcCategory {
    A,
    B,
    C,
}

impl AbcCategory {
    pub const ALL: [AbcCategory; 3] = [AbcCategory::A, AbcCategory::B, AbcCategory::C];
}

impl fmt::Display for AbcCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Demand-stability tier of a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum XyzCategory {
    X,
    Y,
    Z,
}

impl fmt::Display for XyzCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Go-List cell: ABC tier crossed with high/low margin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoListCategory {
    Stars,
    Workhorses,
    Potential,
    Standard,
    Puzzles,
    Dogs,
}

impl GoListCategory {
    pub const ALL: [GoListCategory; 6] = [
        GoListCategory::Stars,
        GoListCategory::Workhorses,
        GoListCategory::Potential,
        GoListCategory::Standard,
        GoListCategory::Puzzles,
        GoListCategory::Dogs,
    ];

    pub fn from_abc(abc: AbcCategory, high_margin: bool) -> Self {
        match (abc, high_margin) {
            (AbcCategory::A, true) => GoListCategory::Stars,
            (AbcCategory::A, false) => GoListCategory::Workhorses,
            (AbcCategory::B, true) => GoListCategory::Potential,
            (AbcCategory::B, false) => GoListCategory::Standard,
            (AbcCategory::C, true) => GoListCategory::Puzzles,
            (AbcCategory::C, false) => GoListCategory::Dogs,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GoListCategory::Stars => "stars",
            GoListCategory::Workhorses => "workhorses",
            GoListCategory::Potential => "potential",
            GoListCategory::Standard => "standard",
            GoListCategory::Puzzles => "puzzles",
            GoListCategory::Dogs => "dogs",
        }
    }
}

impl fmt::Display for GoListCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Severity of a statistical anomaly. Ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub const LOW_Z: Decimal = dec!(2.0);
    pub const MEDIUM_Z: Decimal = dec!(3.0);
    pub const HIGH_Z: Decimal = dec!(4.0);
    pub const CRITICAL_Z: Decimal = dec!(5.0);

    /// Maps a z-score to a severity. The highest threshold met wins; `None`
    /// below the low threshold.
    pub fn from_z_score(z: Decimal) -> Option<Self> {
        let abs_z = z.abs();
        if abs_z >= Self::CRITICAL_Z {
            Some(Severity::Critical)
        } else if abs_z >= Self::HIGH_Z {
            Some(Severity::High)
        } else if abs_z >= Self::MEDIUM_Z {
            Some(Severity::Medium)
        } else if abs_z >= Self::LOW_Z {
            Some(Severity::Low)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What kind of metric deviated and in which direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyKind {
    RevenueSpike,
    RevenueDrop,
    TrafficSpike,
    TrafficDrop,
    AvgCheckSpike,
    AvgCheckDrop,
    ProductSpike,
    ProductDrop,
    HourlyAnomaly,
}

impl AnomalyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnomalyKind::RevenueSpike => "revenue_spike",
            AnomalyKind::RevenueDrop => "revenue_drop",
            AnomalyKind::TrafficSpike => "traffic_spike",
            AnomalyKind::TrafficDrop => "traffic_drop",
            AnomalyKind::AvgCheckSpike => "avg_check_spike",
            AnomalyKind::AvgCheckDrop => "avg_check_drop",
            AnomalyKind::ProductSpike => "product_spike",
            AnomalyKind::ProductDrop => "product_drop",
            AnomalyKind::HourlyAnomaly => "hourly_anomaly",
        }
    }

    pub fn is_spike(&self) -> bool {
        matches!(
            self,
            AnomalyKind::RevenueSpike
                | AnomalyKind::TrafficSpike
                | AnomalyKind::AvgCheckSpike
                | AnomalyKind::ProductSpike
        )
    }
}

impl fmt::Display for AnomalyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction of a fitted or observed trend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Up,
    Down,
    Stable,
}

impl TrendDirection {
    /// Classifies a value against a symmetric dead band.
    pub fn classify(value: Decimal, threshold: Decimal) -> Self {
        if value > threshold {
            TrendDirection::Up
        } else if value < -threshold {
            TrendDirection::Down
        } else {
            TrendDirection::Stable
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TrendDirection::Up => "up",
            TrendDirection::Down => "down",
            TrendDirection::Stable => "stable",
        }
    }
}

impl fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_uses_highest_threshold_met() {
        assert_eq!(Severity::from_z_score(dec!(1.99)), None);
        assert_eq!(Severity::from_z_score(dec!(2.0)), Some(Severity::Low));
        assert_eq!(Severity::from_z_score(dec!(-3.5)), Some(Severity::Medium));
        assert_eq!(Severity::from_z_score(dec!(4.0)), Some(Severity::High));
        assert_eq!(Severity::from_z_score(dec!(-10)), Some(Severity::Critical));
    }

    #[test]
    fn unknown_metric_is_rejected() {
        assert_eq!("Profit".parse::<Metric>().unwrap(), Metric::Profit);
        let err = "margin".parse::<Metric>().unwrap_err();
        assert!(matches!(err, CoreError::InvalidParameter { .. }));
    }

    #[test]
    fn go_list_cross_tab_covers_all_cells() {
        assert_eq!(GoListCategory::from_abc(AbcCategory::A, true), GoListCategory::Stars);
        assert_eq!(GoListCategory::from_abc(AbcCategory::B, false), GoListCategory::Standard);
        assert_eq!(GoListCategory::from_abc(AbcCategory::C, false), GoListCategory::Dogs);
    }

    #[test]
    fn anomaly_kind_names_are_snake_case() {
        assert_eq!(AnomalyKind::AvgCheckDrop.as_str(), "avg_check_drop");
        assert!(AnomalyKind::ProductSpike.is_spike());
        assert!(!AnomalyKind::HourlyAnomaly.is_spike());
    }

    #[test]
    fn trend_direction_has_dead_band() {
        assert_eq!(TrendDirection::classify(dec!(150), dec!(100)), TrendDirection::Up);
        assert_eq!(TrendDirection::classify(dec!(-100), dec!(100)), TrendDirection::Stable);
        assert_eq!(TrendDirection::classify(dec!(-101), dec!(100)), TrendDirection::Down);
    }
}
