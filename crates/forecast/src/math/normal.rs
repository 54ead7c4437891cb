use statrs::distribution::{ContinuousCDF, Normal};

/// Two-sided standard normal multiplier for a central interval of the given
/// coverage, e.g. 1.96 for 0.95. `None` outside (0, 1).
pub fn interval_z(width: f64) -> Option<f64> {
    if !(width > 0.0 && width < 1.0) {
        return None;
    }
    let normal = Normal::new(0.0, 1.0).ok()?;
    let z = normal.inverse_cdf(0.5 + width / 2.0);
    z.is_finite().then_some(z)
}
