//! # MOZG Insights
//!
//! Russian-language recommendation texts and number formatting. Analyzers
//! decide *when* a text applies; the wording lives here.

pub mod anomaly;
pub mod basket;
pub mod forecast;
pub mod format;
pub mod menu;

pub use format::{fixed, group_thousands, truncate_chars};
