use anyhow::{Context, Result};
use nimbus_weather::TemperatureUnit;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

use crate::error::ConfigError;

/// Environment variable consulted for the provider API key when the config
/// file does not set one.
pub const API_KEY_ENV: &str = "OPENWEATHER_API_KEY";

/// Largest result count the geocoding endpoint honours.
pub const MAX_SUGGESTION_LIMIT: u8 = 5;

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a user-friendly message summarizing all errors
    pub fn error_summary(&self) -> String {
        if self.errors.is_empty() {
            return String::new();
        }
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application configuration directory
    pub config_dir: PathBuf,

    /// Weather provider endpoints and credentials
    pub api: ApiConfig,

    /// Autocomplete timing and size
    #[serde(default)]
    pub search: SearchConfig,

    /// Forecast screen settings
    #[serde(default)]
    pub forecast: ForecastConfig,

    /// Favorites persistence
    #[serde(default)]
    pub favorites: FavoritesConfig,

    /// Display preferences
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// OpenWeatherMap API key (`appid`)
    #[serde(default)]
    pub api_key: String,

    /// Direct geocoding endpoint
    #[serde(default = "default_geocode_url")]
    pub geocode_url: String,

    /// Current weather endpoint
    #[serde(default = "default_weather_url")]
    pub weather_url: String,

    /// 5 day / 3 hour forecast endpoint
    #[serde(default = "default_forecast_url")]
    pub forecast_url: String,

    /// Base for icon URLs; `{base}/{code}@2x.png`
    #[serde(default = "default_icon_base_url")]
    pub icon_base_url: String,

    /// HTTP timeout. Unset means the transport default.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_geocode_url() -> String {
    "https://api.openweathermap.org/geo/1.0/direct".to_string()
}

fn default_weather_url() -> String {
    "https://api.openweathermap.org/data/2.5/weather".to_string()
}

fn default_forecast_url() -> String {
    "https://api.openweathermap.org/data/2.5/forecast".to_string()
}

fn default_icon_base_url() -> String {
    "https://openweathermap.org/img/wn".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            geocode_url: default_geocode_url(),
            weather_url: default_weather_url(),
            forecast_url: default_forecast_url(),
            icon_base_url: default_icon_base_url(),
            timeout_secs: None,
        }
    }
}

impl ApiConfig {
    /// The configured key, falling back to the environment when the file
    /// leaves it empty.
    pub fn effective_api_key(&self) -> String {
        if self.api_key.trim().is_empty() {
            std::env::var(API_KEY_ENV).unwrap_or_default()
        } else {
            self.api_key.clone()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Quiet period after the last keystroke before a lookup fires
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Delay before a blurred input hides its suggestions
    #[serde(default = "default_blur_grace_ms")]
    pub blur_grace_ms: u64,

    /// Number of suggestions requested per lookup
    #[serde(default = "default_suggestion_limit")]
    pub suggestion_limit: u8,
}

fn default_debounce_ms() -> u64 {
    300
}

fn default_blur_grace_ms() -> u64 {
    200
}

fn default_suggestion_limit() -> u8 {
    MAX_SUGGESTION_LIMIT
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            blur_grace_ms: default_blur_grace_ms(),
            suggestion_limit: default_suggestion_limit(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastConfig {
    /// City loaded when the forecast screen opens
    #[serde(default = "default_forecast_city")]
    pub default_city: String,
}

fn default_forecast_city() -> String {
    "Dubai".to_string()
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            default_city: default_forecast_city(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FavoritesConfig {
    /// Shown by the favorites screen when nothing has been saved yet
    #[serde(default = "default_seed")]
    pub seed: Vec<String>,

    /// Key-value file, relative to `config_dir` unless absolute
    #[serde(default = "default_storage_file")]
    pub storage_file: PathBuf,
}

fn default_seed() -> Vec<String> {
    vec!["Dubai".to_string(), "London".to_string()]
}

fn default_storage_file() -> PathBuf {
    PathBuf::from("storage.json")
}

impl Default for FavoritesConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            storage_file: default_storage_file(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UiConfig {
    /// Unit the toggle starts in
    #[serde(default)]
    pub temperature_unit: TemperatureUnit,
}

impl Default for Config {
    fn default() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("nimbus");

        Self {
            config_dir,
            api: ApiConfig::default(),
            search: SearchConfig::default(),
            forecast: ForecastConfig::default(),
            favorites: FavoritesConfig::default(),
            ui: UiConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from the default location, creating it if it doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        Self::load_from(&config_path)
    }

    /// Load configuration from an explicit path, writing defaults there if
    /// the file is missing.
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            let mut config = Self::default();
            if let Some(parent) = config_path.parent() {
                config.config_dir = parent.to_path_buf();
            }
            config.save_to(config_path)?;
            return Ok(config);
        }

        let contents =
            std::fs::read_to_string(config_path).context("Failed to read config file")?;

        let config: Config = toml::from_str(&contents)
            .map_err(|e| ConfigError::ParseError(format!("{}: {}", config_path.display(), e)))?;

        Ok(config)
    }

    /// Load configuration and validate it
    ///
    /// Returns the config along with any validation warnings.
    /// Returns an error if validation fails with critical errors.
    pub fn load_validated(path: Option<&Path>) -> Result<(Self, ValidationResult)> {
        let config = match path {
            Some(p) => Self::load_from(p)?,
            None => Self::load()?,
        };
        let validation = config.validate();

        if !validation.is_valid() {
            return Err(ConfigError::Invalid(validation.error_summary()).into());
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok((config, validation))
    }

    /// Validate the configuration
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        self.validate_url(&self.api.geocode_url, "api.geocode_url", &mut result);
        self.validate_url(&self.api.weather_url, "api.weather_url", &mut result);
        self.validate_url(&self.api.forecast_url, "api.forecast_url", &mut result);
        self.validate_url(&self.api.icon_base_url, "api.icon_base_url", &mut result);

        if self.api.effective_api_key().trim().is_empty() {
            result.add_warning(
                "api.api_key",
                format!("No API key configured (set it here or via {})", API_KEY_ENV),
            );
        }

        if self.api.timeout_secs == Some(0) {
            result.add_error("api.timeout_secs", "Timeout must be greater than 0");
        }

        if self.search.suggestion_limit == 0 || self.search.suggestion_limit > MAX_SUGGESTION_LIMIT
        {
            result.add_error(
                "search.suggestion_limit",
                format!("Must be between 1 and {}", MAX_SUGGESTION_LIMIT),
            );
        }

        if self.search.debounce_ms == 0 {
            result.add_warning(
                "search.debounce_ms",
                "Debounce disabled (0 ms); every keystroke triggers a lookup",
            );
        }

        if self.forecast.default_city.trim().is_empty() {
            result.add_warning("forecast.default_city", "No default forecast city");
        }

        result
    }

    /// Validate a URL field
    fn validate_url(&self, url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }

                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }

                if url.port() == Some(0) {
                    result.add_error(field_name, "Port cannot be 0");
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    /// Resolved path of the favorites key-value file
    pub fn storage_path(&self) -> PathBuf {
        if self.favorites.storage_file.is_absolute() {
            self.favorites.storage_file.clone()
        } else {
            self.config_dir.join(&self.favorites.storage_file)
        }
    }

    fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(config_path, contents).context("Failed to write config file")?;

        Ok(())
    }

    /// Get the path to the configuration file
    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("nimbus");

        Ok(config_dir.join("config.toml"))
    }
}
