use crate::error::ForecastError;
use crate::model::{DecompositionForecaster, Forecaster};
use configuration::ForecastParams;

/// Runs revenue, quick and demand forecasts with one set of hyperparameters.
///
/// Generic over the [`Forecaster`] so the fitting method can be swapped; the
/// additive decomposition is the default.
#[derive(Debug, Clone)]
pub struct ForecastAnalyzer<F: Forecaster = DecompositionForecaster> {
    pub(crate) params: ForecastParams,
    pub(crate) forecaster: F,
}

impl ForecastAnalyzer<DecompositionForecaster> {
    pub fn new(params: ForecastParams) -> Result<Self, ForecastError> {
        Self::with_forecaster(params, DecompositionForecaster)
    }
}

impl<F: Forecaster> ForecastAnalyzer<F> {
    pub fn with_forecaster(params: ForecastParams, forecaster: F) -> Result<Self, ForecastError> {
        params.validate()?;
        Ok(Self { params, forecaster })
    }

    pub fn params(&self) -> &ForecastParams {
        &self.params
    }

    pub fn forecaster(&self) -> &F {
        &self.forecaster
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_horizon() {
        let params = ForecastParams {
            horizon_days: 0,
            ..ForecastParams::default()
        };
        assert!(ForecastAnalyzer::new(params).is_err());
    }
}
