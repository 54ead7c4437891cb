use crate::settings::Config;
use core_types::{CoreError, Metric};
use rust_decimal::Decimal;

/// Per-invocation overrides of the recognized analysis parameters.
///
/// Anything left as `None` keeps the value from the loaded [`Config`].
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "clap", derive(clap::Args))]
pub struct Overrides {
    /// Ranking metric for ABC analysis: revenue, profit or quantity.
    #[cfg_attr(feature = "clap", arg(long))]
    pub metric: Option<Metric>,

    /// Trailing window for the rolling anomaly baseline.
    #[cfg_attr(feature = "clap", arg(long))]
    pub window_days: Option<usize>,

    /// Minimum pair support as a fraction of all baskets.
    #[cfg_attr(feature = "clap", arg(long))]
    pub min_support: Option<Decimal>,

    #[cfg_attr(feature = "clap", arg(long))]
    pub min_occurrences: Option<usize>,

    #[cfg_attr(feature = "clap", arg(long))]
    pub min_confidence: Option<Decimal>,

    #[cfg_attr(feature = "clap", arg(long))]
    pub min_lift: Option<Decimal>,

    /// Days to forecast ahead.
    #[cfg_attr(feature = "clap", arg(long))]
    pub horizon_days: Option<usize>,

    /// Days of history fed to the revenue forecaster.
    #[cfg_attr(feature = "clap", arg(long))]
    pub history_days: Option<usize>,

    /// Fixed high/low margin split for the Go-List, in percent.
    #[cfg_attr(feature = "clap", arg(long))]
    pub margin_threshold: Option<Decimal>,
}

impl Overrides {
    /// Writes every supplied value into `config` and re-validates the result.
    pub fn apply(&self, config: &mut Config) -> Result<(), CoreError> {
        if let Some(metric) = self.metric {
            config.menu.metric = metric;
        }
        if let Some(window) = self.window_days {
            config.anomaly.window_days = window;
        }
        if let Some(support) = self.min_support {
            config.basket.min_support = support;
        }
        if let Some(occurrences) = self.min_occurrences {
            config.basket.min_occurrences = occurrences;
        }
        if let Some(confidence) = self.min_confidence {
            config.basket.min_confidence = confidence;
        }
        if let Some(lift) = self.min_lift {
            config.basket.min_lift = lift;
        }
        if let Some(horizon) = self.horizon_days {
            config.forecast.horizon_days = horizon;
        }
        if let Some(history) = self.history_days {
            config.forecast.history_days = history;
        }
        if self.margin_threshold.is_some() {
            config.menu.margin_threshold = self.margin_threshold;
        }
        config.validate()
    }
}
