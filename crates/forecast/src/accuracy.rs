//! Backtest error metrics.

use crate::types::{ForecastAccuracy, to_decimal};

impl ForecastAccuracy {
    /// Compares paired actual and predicted values. Non-finite pairs are
    /// ignored; an empty comparison scores zero everywhere.
    pub fn compute(actual: &[f64], predicted: &[f64]) -> Self {
        let pairs: Vec<(f64, f64)> = actual
            .iter()
            .zip(predicted)
            .map(|(a, p)| (*a, *p))
            .filter(|(a, p)| a.is_finite() && p.is_finite())
            .collect();

        if pairs.is_empty() {
            return Self::zero();
        }
        let n = pairs.len() as f64;

        let ape: Vec<f64> = pairs
            .iter()
            .filter(|(a, _)| *a != 0.0)
            .map(|(a, p)| ((a - p) / a).abs() * 100.0)
            .collect();
        let mape = if ape.is_empty() {
            0.0
        } else {
            ape.iter().sum::<f64>() / ape.len() as f64
        };

        let ss_res: f64 = pairs.iter().map(|(a, p)| (a - p).powi(2)).sum();
        let mae = pairs.iter().map(|(a, p)| (a - p).abs()).sum::<f64>() / n;
        let rmse = (ss_res / n).sqrt();

        let mean = pairs.iter().map(|(a, _)| a).sum::<f64>() / n;
        let ss_tot: f64 = pairs.iter().map(|(a, _)| (a - mean).powi(2)).sum();
        let r_squared = if ss_tot != 0.0 { 1.0 - ss_res / ss_tot } else { 0.0 };

        Self {
            mape: to_decimal(mape, 2),
            rmse: to_decimal(rmse, 2),
            mae: to_decimal(mae, 2),
            r_squared: to_decimal(r_squared.max(0.0), 3),
        }
    }

    fn zero() -> Self {
        Self {
            mape: Default::default(),
            rmse: Default::default(),
            mae: Default::default(),
            r_squared: Default::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    #[test]
    fn identical_series_are_perfect() {
        let actual = [100.0, 120.0, 90.0, 150.0];
        let acc = ForecastAccuracy::compute(&actual, &actual);
        assert_eq!(acc.mape, Decimal::ZERO);
        assert_eq!(acc.rmse, Decimal::ZERO);
        assert_eq!(acc.mae, Decimal::ZERO);
        assert_eq!(acc.r_squared, dec!(1));
    }

    #[test]
    fn known_errors() {
        let acc = ForecastAccuracy::compute(&[100.0, 200.0], &[110.0, 180.0]);
        assert_eq!(acc.mape, dec!(10));
        assert_eq!(acc.mae, dec!(15));
        assert_eq!(acc.rmse, dec!(15.81));
        // ss_res = 500, ss_tot = 5000
        assert_eq!(acc.r_squared, dec!(0.9));
    }

    #[test]
    fn zero_actuals_are_skipped_for_mape() {
        let acc = ForecastAccuracy::compute(&[0.0, 100.0], &[10.0, 90.0]);
        assert_eq!(acc.mape, dec!(10));
    }

    #[test]
    fn constant_actuals_score_zero_r_squared() {
        let acc = ForecastAccuracy::compute(&[5.0, 5.0, 5.0], &[5.0, 5.0, 5.0]);
        assert_eq!(acc.r_squared, Decimal::ZERO);
    }

    #[test]
    fn worse_than_the_mean_is_floored() {
        let acc = ForecastAccuracy::compute(&[1.0, 2.0, 3.0], &[3.0, 2.0, 1.0]);
        assert_eq!(acc.r_squared, Decimal::ZERO);
    }
}
