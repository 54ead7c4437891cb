//! # MOZG Menu Engineering
//!
//! Product-level menu analysis: ABC ranking by contribution, XYZ ranking by
//! demand stability, the Go-List cross-tab of ABC tier and margin, plus the
//! margin, best/worst seller and category breakdowns built on the same
//! per-product aggregates.

pub mod abc;
pub mod analyzer;
pub mod error;
pub mod go_list;
pub mod margin;
pub mod xyz;

pub use abc::{AbcAnalysis, AbcSummary, ProductAbc};
pub use analyzer::MenuAnalyzer;
pub use error::MenuError;
pub use go_list::{GoListItem, GoListResult, GoListSummary};
pub use margin::{CategorySales, ProductMargin};
pub use xyz::ProductXyz;
