use crate::abc::{self, AbcAnalysis};
use crate::error::MenuError;
use crate::go_list::{self, GoListResult};
use crate::margin::{self, CategorySales, ProductMargin};
use crate::xyz::{self, ProductXyz};
use configuration::MenuParams;
use core_types::{Metric, ProductAggregate, ProductDailySeries};
use rust_decimal::Decimal;

/// Runs the menu analyses with one set of thresholds.
#[derive(Debug, Clone)]
pub struct MenuAnalyzer {
    params: MenuParams,
}

impl MenuAnalyzer {
    /// Creates a new `MenuAnalyzer`, rejecting inconsistent thresholds.
    pub fn new(params: MenuParams) -> Result<Self, MenuError> {
        params.validate()?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &MenuParams {
        &self.params
    }

    /// ABC ranking by the configured metric.
    pub fn classify_abc(&self, aggregates: &[ProductAggregate]) -> Result<AbcAnalysis, MenuError> {
        self.classify_abc_by(aggregates, self.params.metric)
    }

    pub fn classify_abc_by(
        &self,
        aggregates: &[ProductAggregate],
        metric: Metric,
    ) -> Result<AbcAnalysis, MenuError> {
        abc::classify_abc(
            aggregates,
            metric,
            self.params.a_threshold,
            self.params.b_threshold,
        )
    }

    pub fn classify_xyz(&self, series: &[ProductDailySeries]) -> Vec<ProductXyz> {
        xyz::classify_xyz(series, self.params.x_threshold, self.params.y_threshold)
    }

    /// Go-List over an ABC result. The configured margin threshold is used when
    /// `margin_threshold` is `None`; the median positive margin when neither is set.
    pub fn go_list(&self, abc: &AbcAnalysis, margin_threshold: Option<Decimal>) -> GoListResult {
        go_list::go_list(
            abc,
            margin_threshold.or(self.params.margin_threshold),
            self.params.fallback_margin_threshold,
        )
    }

    pub fn margin_analysis(&self, aggregates: &[ProductAggregate], min_quantity: Decimal) -> Vec<ProductMargin> {
        margin::margin_analysis(aggregates, min_quantity)
    }

    pub fn top_sellers(&self, aggregates: &[ProductAggregate], by: Metric) -> Vec<ProductMargin> {
        margin::top_sellers(aggregates, self.params.top_limit, by)
    }

    pub fn worst_sellers(&self, aggregates: &[ProductAggregate]) -> Vec<ProductMargin> {
        margin::worst_sellers(
            aggregates,
            self.params.top_limit,
            self.params.worst_min_quantity,
        )
    }

    pub fn category_breakdown(&self, aggregates: &[ProductAggregate]) -> Vec<CategorySales> {
        margin::category_breakdown(aggregates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn rejects_unordered_thresholds() {
        let params = MenuParams {
            a_threshold: dec!(97),
            ..Default::default()
        };
        assert!(matches!(MenuAnalyzer::new(params), Err(MenuError::Core(_))));
    }

    #[test]
    fn configured_threshold_applies_when_none_passed() {
        let params = MenuParams {
            margin_threshold: Some(dec!(99)),
            ..Default::default()
        };
        let analyzer = MenuAnalyzer::new(params).unwrap();
        let aggregates = vec![ProductAggregate {
            product_id: uuid::Uuid::from_u128(1),
            name: "Латте".into(),
            category_id: None,
            category_name: None,
            quantity: dec!(10),
            revenue: dec!(1000),
            cost: dec!(200),
        }];
        let abc = analyzer.classify_abc(&aggregates).unwrap();
        assert_eq!(analyzer.go_list(&abc, None).margin_threshold, Some(dec!(99)));
        assert_eq!(analyzer.go_list(&abc, Some(dec!(10))).margin_threshold, Some(dec!(10)));
    }
}
