//! # MOZG Reports
//!
//! The seam between data and analysis. A `SeriesProvider` materializes the
//! aggregated series for a period; the `ReportAssembler` runs one analyzer (or
//! the fixed full-report composition) over them and packages typed results.
//! `Dataset` is an in-memory provider loaded from a JSON snapshot.

pub mod assembler;
pub mod dataset;
pub mod error;
pub mod provider;

pub use assembler::{FullReport, MenuReport, ReportAssembler};
pub use dataset::{Dataset, ProductRecord, Receipt, ReceiptLine};
pub use error::ReportError;
pub use provider::{Period, SeriesProvider};
