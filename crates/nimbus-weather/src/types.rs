use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Temperature display unit. Fetches are always metric; this only affects
/// rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

/// A ranked candidate returned by the geocoding endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceMatch {
    pub name: String,
    #[serde(default)]
    pub state: Option<String>,
    pub country: String,
    pub lat: f64,
    pub lon: f64,
}

/// What a weather or forecast request is keyed on.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationQuery {
    /// Free-text city name, sent as `q`
    CityName(String),
    /// Explicit coordinates, sent as `lat`/`lon`
    Coordinates { lat: f64, lon: f64 },
}

impl std::fmt::Display for LocationQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LocationQuery::CityName(name) => write!(f, "{}", name),
            LocationQuery::Coordinates { lat, lon } => write!(f, "{:.4}, {:.4}", lat, lon),
        }
    }
}

/// Last successfully fetched current conditions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    /// Provider temperature in Celsius; the only input to unit conversion
    pub raw_temp_celsius: Option<f64>,
    pub description: String,
    /// "name, country"
    pub city_label: String,
    pub icon_url: Option<String>,
}

/// One card of the daily forecast (the midday slot of its date).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastEntry {
    pub date: NaiveDate,
    /// Full weekday name, e.g. "Monday"
    pub day_label: String,
    pub raw_temp_celsius: f64,
    pub description: String,
    pub icon_url: Option<String>,
}

/// Last successfully fetched forecast, already reduced to one entry per day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSnapshot {
    pub city_label: String,
    pub entries: Vec<ForecastEntry>,
}

/// Colour band of a favorites card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureBand {
    Hot,
    Warm,
    Mild,
    Cold,
}

impl TemperatureBand {
    /// Classify a (rounded) Celsius temperature. Lower bounds are inclusive.
    pub fn from_celsius(temp: i64) -> Self {
        if temp >= 30 {
            Self::Hot
        } else if temp >= 20 {
            Self::Warm
        } else if temp >= 10 {
            Self::Mild
        } else {
            Self::Cold
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hot => "hot",
            Self::Warm => "warm",
            Self::Mild => "mild",
            Self::Cold => "cold",
        }
    }
}

/// Outcome of a provider call that did not produce data.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FetchError {
    /// Provider answered with a non-success status
    #[error("Not found (HTTP {0})")]
    NotFound(u16),
    /// A newer request replaced this one before it completed
    #[error("Request superseded")]
    Superseded,
    /// Connection, TLS or timeout failure
    #[error("Transport error: {0}")]
    Transport(String),
    /// Success status but a body we could not decode
    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            FetchError::Parse(e.to_string())
        } else if let Some(status) = e.status() {
            FetchError::NotFound(status.as_u16())
        } else {
            FetchError::Transport(e.to_string())
        }
    }
}
