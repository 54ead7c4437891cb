use crate::error::ConfigError;

// Declare the modules that make up this crate.
pub mod error;
pub mod logging;
pub mod overrides;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use logging::init_logging;
pub use overrides::Overrides;
pub use settings::{
    AnomalyParams, BasketParams, Config, DemandParams, ForecastParams, LoggingConfig, MenuParams,
};

/// Loads the application configuration from `config.toml` in the working directory.
///
/// The file is optional. Any key can also be set through the environment with the
/// `MOZG` prefix and `__` as the section separator, e.g. `MOZG__BASKET__MIN_SUPPORT=0.01`.
/// The result is validated before it is returned.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from("config.toml")
}

/// Same as [`load_config`] but reads the given file instead of `config.toml`.
pub fn load_config_from(path: &str) -> Result<Config, ConfigError> {
    let builder = config::Config::builder()
        .add_source(config::File::with_name(path).required(false))
        .add_source(
            config::Environment::with_prefix("MOZG")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    // Attempt to deserialize the entire configuration into our `Config` struct
    let config = builder.try_deserialize::<Config>()?;
    config.validate()?;

    tracing::debug!(
        metric = %config.menu.metric,
        window_days = config.anomaly.window_days,
        horizon_days = config.forecast.horizon_days,
        "Configuration loaded"
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn scratch(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("mozg-{}-{name}", std::process::id()))
    }

    #[test]
    fn missing_file_gives_validated_defaults() {
        let path = scratch("absent.toml");
        let config: Config = load_config_from(&path.to_string_lossy()).unwrap();
        assert_eq!(config.anomaly.window_days, AnomalyParams::default().window_days);
        assert_eq!(config.forecast.backtest_days, ForecastParams::default().backtest_days);
    }

    #[test]
    fn file_values_are_validated() {
        let path = scratch("bad.toml");
        std::fs::write(&path, "[forecast]\nbacktest_days = 0\n").unwrap();
        let result = load_config_from(&path.to_string_lossy());
        std::fs::remove_file(&path).unwrap();
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }
}
