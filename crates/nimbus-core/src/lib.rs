pub mod config;
pub mod error;

pub use config::{
    ApiConfig, Config, FavoritesConfig, ForecastConfig, SearchConfig, UiConfig, ValidationResult,
};
pub use error::{AppError, ConfigError, NetworkError, StorageError, WeatherError};

use anyhow::Result;

/// Default log filter when `RUST_LOG` is not set.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Initialize the core application (logging).
///
/// `default_filter` is used when `RUST_LOG` is absent, e.g. `"debug"` for
/// verbose runs.
pub fn init(default_filter: &str) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    tracing::debug!("Nimbus core initialized");
    Ok(())
}
