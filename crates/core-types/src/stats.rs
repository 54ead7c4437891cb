//! Decimal statistics shared by the analyzers.
//!
//! Every helper guards its denominators and returns a neutral zero instead of
//! failing on empty or degenerate input.

use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;

pub fn mean(values: &[Decimal]) -> Decimal {
    if values.is_empty() {
        return Decimal::ZERO;
    }
    values.iter().sum::<Decimal>() / Decimal::from(values.len())
}

/// Population variance (divides by `n`).
pub fn population_variance(values: &[Decimal]) -> Decimal {
    if values.is_empty() {
        return Decimal::ZERO;
    }
    let mu = mean(values);
    values
        .iter()
        .map(|v| (*v - mu) * (*v - mu))
        .sum::<Decimal>()
        / Decimal::from(values.len())
}

/// Population standard deviation. Falls back to zero if the square root is
/// not representable.
pub fn population_std(values: &[Decimal]) -> Decimal {
    let variance = population_variance(values);
    if variance <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    variance.sqrt().unwrap_or(Decimal::ZERO)
}

/// Median of the values; `None` for an empty slice.
pub fn median(values: &[Decimal]) -> Option<Decimal> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort();
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / Decimal::TWO)
    } else {
        Some(sorted[mid])
    }
}

/// `numerator / denominator`, or zero when the denominator is zero.
pub fn safe_div(numerator: Decimal, denominator: Decimal) -> Decimal {
    if denominator.is_zero() {
        Decimal::ZERO
    } else {
        numerator / denominator
    }
}

/// `part` as a percentage of `total`; zero unless `total` is positive.
pub fn percent_of(part: Decimal, total: Decimal) -> Decimal {
    if total > Decimal::ZERO {
        part / total * Decimal::ONE_HUNDRED
    } else {
        Decimal::ZERO
    }
}

/// Share of `count` in `total` as a percentage, for integer counts.
pub fn count_percent(count: usize, total: usize) -> Decimal {
    if total == 0 {
        return Decimal::ZERO;
    }
    Decimal::from(count) / Decimal::from(total) * Decimal::ONE_HUNDRED
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    #[test]
    fn population_std_matches_known_value() {
        let values = [dec!(2), dec!(4), dec!(4), dec!(4), dec!(5), dec!(5), dec!(7), dec!(9)];
        assert_eq!(mean(&values), dec!(5));
        assert_eq!(population_std(&values), dec!(2));
    }

    #[test]
    fn degenerate_inputs_are_neutral() {
        assert_eq!(mean(&[]), Decimal::ZERO);
        assert_eq!(population_std(&[dec!(3), dec!(3)]), Decimal::ZERO);
        assert_eq!(median(&[]), None);
        assert_eq!(safe_div(dec!(1), Decimal::ZERO), Decimal::ZERO);
        assert_eq!(percent_of(dec!(5), Decimal::ZERO), Decimal::ZERO);
        assert_eq!(count_percent(1, 0), Decimal::ZERO);
    }

    #[test]
    fn median_averages_even_lengths() {
        assert_eq!(median(&[dec!(10), dec!(1), dec!(5), dec!(7)]), Some(dec!(6)));
        assert_eq!(median(&[dec!(3), dec!(1), dec!(2)]), Some(dec!(2)));
    }

    proptest! {
        #[test]
        fn std_is_never_negative(raw in proptest::collection::vec(0u32..100_000, 1..40)) {
            let values: Vec<Decimal> = raw.into_iter().map(Decimal::from).collect();
            prop_assert!(population_std(&values) >= Decimal::ZERO);
        }
    }
}
