//! # MOZG Anomaly Detection
//!
//! Z-score detection over daily metrics (rolling trailing window), per-product
//! sales and hour-of-day revenue (cross-sectional baseline), plus the batch
//! report that merges them and derives statistics and insights.

pub mod detector;
pub mod error;
pub mod hourly;
pub mod report;
pub mod types;

pub use detector::{AnomalyDetector, SeriesKind, detect};
pub use error::AnomalyError;
pub use hourly::detect_hourly;
pub use report::{AnomalyInputs, AnomalyReport, AnomalyStats};
pub use types::Anomaly;
