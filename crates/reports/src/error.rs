use anomaly::AnomalyError;
use basket::BasketError;
use core_types::CoreError;
use forecast::ForecastError;
use menu::MenuError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Menu analysis failed: {0}")]
    Menu(#[from] MenuError),

    #[error("Basket analysis failed: {0}")]
    Basket(#[from] BasketError),

    #[error("Anomaly detection failed: {0}")]
    Anomaly(#[from] AnomalyError),

    #[error("Forecast failed: {0}")]
    Forecast(#[from] ForecastError),

    #[error("Failed to read dataset '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("An error occurred during JSON serialization/deserialization: {0}")]
    JsonError(#[from] serde_json::Error),
}
