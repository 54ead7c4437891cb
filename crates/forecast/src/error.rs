use core_types::CoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ForecastError {
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The least-squares system could not be solved to finite coefficients.
    #[error("Model fit failed: {0}")]
    FitFailed(String),
}

impl ForecastError {
    pub fn insufficient(required: usize, actual: usize) -> Self {
        ForecastError::Core(CoreError::InsufficientData { required, actual })
    }
}
