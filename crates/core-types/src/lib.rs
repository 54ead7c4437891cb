//! # MOZG Core Types
//!
//! Value objects shared by every analyzer. Everything here is immutable input
//! or output data: the Series Provider fills these structs, the analyzers read
//! them, and the report assembler packages the results.

pub mod enums;
pub mod error;
pub mod stats;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use enums::{
    AbcCategory, AnomalyKind, GoListCategory, Metric, Severity, TrendDirection, XyzCategory,
};
pub use error::CoreError;
pub use structs::{
    BasketRecord, Catalog, CategoryKey, DailyMetrics, HourlyReading, MetricSeries, ProductAggregate,
    ProductDailySeries, ProductInfo, SeriesPoint,
};
