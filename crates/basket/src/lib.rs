//! # MOZG Basket Analysis
//!
//! Market-basket mining over receipts: which products (and categories) are
//! bought together, how strongly, and what that is worth as a cross-sell.
//! Only 2-itemsets are mined.

pub mod affinity;
pub mod analyzer;
pub mod cooccurrence;
pub mod cross_sell;
pub mod error;
pub mod pairs;
pub mod profile;
pub mod report;

pub use affinity::CategoryAffinity;
pub use analyzer::BasketAnalyzer;
pub use cross_sell::CrossSellRecommendation;
pub use error::BasketError;
pub use pairs::ProductPair;
pub use profile::{BasketProfile, HourlyBasketPattern};
pub use report::BasketReport;
