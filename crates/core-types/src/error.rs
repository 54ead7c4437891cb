use thiserror::Error;

/// The error taxonomy shared by every analyzer.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Insufficient data: need at least {required} points, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("Computation error: {0}")]
    Computation(String),
}

impl CoreError {
    pub fn invalid_parameter(name: &str, reason: impl Into<String>) -> Self {
        CoreError::InvalidParameter {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}
