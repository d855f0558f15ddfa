//! Nimbus: city weather in the terminal.

mod terminal;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use nimbus_core::{AppError, Config, ConfigError};
use nimbus_ui::{channel, AutocompleteSettings, FavoritesModel, ForecastModel, WeatherModel};
use nimbus_weather::{
    FavoritesStore, JsonFileStore, KeyValueStore, OpenWeatherClient, ProviderSettings, WeatherApi,
};

/// Nimbus CLI
#[derive(Parser)]
#[command(name = "nimbus")]
#[command(author, version, about = "Current weather, forecasts and favorite cities")]
struct Cli {
    /// Log debug output (or set RUST_LOG)
    #[arg(short, long)]
    verbose: bool,

    /// Config file (default: <config dir>/nimbus/config.toml)
    #[arg(long, env = "NIMBUS_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive current weather screen
    Weather {
        /// Search this city right away
        city: Option<String>,
    },

    /// Interactive forecast screen
    Forecast {
        /// City to load instead of the configured default
        city: Option<String>,
    },

    /// Show weather cards for saved cities
    Favorites {
        #[command(subcommand)]
        action: Option<FavoritesAction>,
    },
}

#[derive(Subcommand)]
enum FavoritesAction {
    /// Save a city label
    Add { name: String },
    /// Forget a city label
    Remove { name: String },
}

/// Load and validate the config, surfacing config problems as [`AppError`].
fn load_config(path: Option<&Path>) -> Result<Config> {
    match Config::load_validated(path) {
        Ok((config, _)) => Ok(config),
        Err(e) => match e.downcast::<ConfigError>() {
            Ok(config_err) => {
                let err = AppError::from(config_err);
                tracing::error!("{}", err.user_message());
                Err(err.into())
            }
            Err(e) => Err(e),
        },
    }
}

fn provider_settings(config: &Config) -> ProviderSettings {
    ProviderSettings {
        api_key: config.api.effective_api_key(),
        geocode_url: config.api.geocode_url.clone(),
        weather_url: config.api.weather_url.clone(),
        forecast_url: config.api.forecast_url.clone(),
        icon_base_url: config.api.icon_base_url.clone(),
        timeout: config.api.timeout_secs.map(Duration::from_secs),
    }
}

fn weather_api(config: &Config) -> Result<Arc<dyn WeatherApi>> {
    let client = OpenWeatherClient::new(provider_settings(config))
        .context("Failed to build weather client")?;
    Ok(Arc::new(client))
}

fn storage(config: &Config) -> Arc<dyn KeyValueStore> {
    let path = config.storage_path();
    tracing::debug!("Favorites storage at {}", path.display());
    Arc::new(JsonFileStore::new(path))
}

fn load_favorites(config: &Config, seed: &[String]) -> Result<FavoritesStore> {
    FavoritesStore::load(storage(config), seed)
        .map_err(nimbus_ui::error_mapping::from_store)
        .context("Failed to load favorites")
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "debug"
    } else {
        nimbus_core::DEFAULT_LOG_FILTER
    };
    nimbus_core::init(filter)?;

    let config = load_config(cli.config.as_deref())?;
    tracing::info!("Nimbus started (config dir {})", config.config_dir.display());

    let settings = AutocompleteSettings::from(&config.search);
    let unit = config.ui.temperature_unit;

    match cli.command {
        Commands::Weather { city } => {
            let (tx, rx) = channel();
            // The current weather screen never seeds
            let favorites = load_favorites(&config, &[])?;
            let mut screen =
                WeatherModel::new(weather_api(&config)?, tx, settings, unit, favorites);
            if let Some(city) = city {
                screen.set_input(&city);
                screen.search();
            }
            terminal::run(screen, rx).await
        }
        Commands::Forecast { city } => {
            let (tx, rx) = channel();
            let default_city = city.unwrap_or_else(|| config.forecast.default_city.clone());
            let mut screen =
                ForecastModel::new(weather_api(&config)?, tx, settings, unit, default_city);
            screen.start();
            terminal::run(screen, rx).await
        }
        Commands::Favorites { action } => {
            let (tx, rx) = channel();
            let mut favorites = load_favorites(&config, &config.favorites.seed)?;
            if let Some(FavoritesAction::Add { name }) = &action {
                let outcome = favorites
                    .add(name)
                    .map_err(nimbus_ui::error_mapping::from_store)?;
                tracing::debug!("Add {}: {:?}", name, outcome);
            }

            let mut screen = FavoritesModel::new(weather_api(&config)?, tx, favorites, unit);
            match action {
                // Persists, then re-renders the remaining cards
                Some(FavoritesAction::Remove { name }) => {
                    if !screen.remove(&name)? {
                        println!("{} is not a favorite", name);
                    }
                }
                _ => screen.render_all(),
            }
            terminal::show_favorites(screen, rx).await
        }
    }
}
