use core_types::stats::{mean, population_std};
use core_types::{ProductDailySeries, XyzCategory};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Demand stability of one product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductXyz {
    pub product_id: Uuid,
    pub product_name: String,
    pub avg_daily_quantity: Decimal,
    pub std_dev: Decimal,
    /// Coefficient of variation in percent.
    pub coefficient_of_variation: Decimal,
    pub xyz_category: XyzCategory,
}

/// Coefficient of variation of a series, in percent. Zero when the mean is not positive.
pub fn coefficient_of_variation(values: &[Decimal]) -> Decimal {
    let mu = mean(values);
    if mu <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    population_std(values) / mu * Decimal::ONE_HUNDRED
}

/// Classifies each product's daily quantity series by its coefficient of
/// variation. The result is sorted most stable first; ties keep input order.
pub fn classify_xyz(
    series: &[ProductDailySeries],
    x_threshold: Decimal,
    y_threshold: Decimal,
) -> Vec<ProductXyz> {
    let mut results: Vec<ProductXyz> = series
        .iter()
        .map(|product| {
            let values = product.series.values();
            let cv = coefficient_of_variation(&values);
            let xyz_category = if cv < x_threshold {
                XyzCategory::X
            } else if cv < y_threshold {
                XyzCategory::Y
            } else {
                XyzCategory::Z
            };
            ProductXyz {
                product_id: product.product_id,
                product_name: product.product_name.clone(),
                avg_daily_quantity: mean(&values).round_dp(2),
                std_dev: population_std(&values).round_dp(2),
                coefficient_of_variation: cv.round_dp(2),
                xyz_category,
            }
        })
        .collect();

    results.sort_by(|a, b| a.coefficient_of_variation.cmp(&b.coefficient_of_variation));
    tracing::debug!(products = results.len(), "XYZ classification complete");
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use core_types::MetricSeries;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn series(n: u128, values: &[Decimal]) -> ProductDailySeries {
        let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        ProductDailySeries {
            product_id: Uuid::from_u128(n),
            product_name: format!("P{n}"),
            category_name: None,
            series: MetricSeries::from_values(start, values),
        }
    }

    #[test]
    fn classifies_and_sorts_by_stability() {
        let input = vec![
            // mean 10, std 5 -> CV 50
            series(1, &[dec!(5), dec!(15), dec!(5), dec!(15)]),
            // constant -> CV 0
            series(2, &[dec!(8), dec!(8), dec!(8), dec!(8)]),
            // mean 10, std 2 -> CV 20
            series(3, &[dec!(8), dec!(12), dec!(8), dec!(12)]),
        ];
        let result = classify_xyz(&input, dec!(10), dec!(25));
        let order: Vec<_> = result.iter().map(|p| (p.product_id.as_u128(), p.xyz_category)).collect();
        assert_eq!(
            order,
            vec![(2, XyzCategory::X), (3, XyzCategory::Y), (1, XyzCategory::Z)]
        );
        assert_eq!(result[2].coefficient_of_variation, dec!(50));
    }

    #[test]
    fn zero_mean_has_zero_cv() {
        let result = classify_xyz(&[series(1, &[dec!(0), dec!(0)])], dec!(10), dec!(25));
        assert_eq!(result[0].coefficient_of_variation, Decimal::ZERO);
        assert_eq!(result[0].xyz_category, XyzCategory::X);
    }

    proptest! {
        #[test]
        fn cv_is_scale_invariant(raw in proptest::collection::vec(1u32..10_000, 2..30)) {
            let values: Vec<Decimal> = raw.iter().map(|v| Decimal::from(*v)).collect();
            let doubled: Vec<Decimal> = values.iter().map(|v| v * Decimal::TWO).collect();
            let a = coefficient_of_variation(&values);
            let b = coefficient_of_variation(&doubled);
            prop_assert!((a - b).abs() < dec!(0.0001));
        }
    }
}
