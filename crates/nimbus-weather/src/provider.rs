//! OpenWeatherMap client.
//!
//! Every weather and forecast request is sent with `units=metric`, so stored
//! temperatures are always Celsius.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;

use crate::forecast::ForecastResponse;
use crate::geocode::direct_geocode;
use crate::types::{FetchError, ForecastSnapshot, LocationQuery, PlaceMatch, WeatherSnapshot};

/// Everything the client needs to reach the provider.
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    pub api_key: String,
    pub geocode_url: String,
    pub weather_url: String,
    pub forecast_url: String,
    pub icon_base_url: String,
    pub timeout: Option<Duration>,
}

impl ProviderSettings {
    /// Point all endpoints at one base URL (mock servers, proxies).
    pub fn with_base_url(base_url: &str, api_key: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        Self {
            api_key: api_key.to_string(),
            geocode_url: format!("{}/geo/1.0/direct", base),
            weather_url: format!("{}/data/2.5/weather", base),
            forecast_url: format!("{}/data/2.5/forecast", base),
            icon_base_url: format!("{}/img/wn", base),
            timeout: None,
        }
    }

    /// `None` when the provider sent no icon code.
    pub fn icon_url(&self, code: &str) -> Option<String> {
        if code.is_empty() {
            return None;
        }
        Some(icon_url(&self.icon_base_url, code))
    }
}

/// `{base}/{code}@2x.png`
pub fn icon_url(base: &str, code: &str) -> String {
    format!("{}/{}@2x.png", base.trim_end_matches('/'), code)
}

/// Capitalize the first character, leaving the rest untouched.
pub fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Provider operations the screens depend on.
#[async_trait]
pub trait WeatherApi: Send + Sync {
    /// Ranked place candidates for a free-text query.
    async fn geocode(&self, query: &str, limit: u8) -> Result<Vec<PlaceMatch>, FetchError>;

    /// Current conditions by city name or coordinates.
    async fn current_weather(&self, query: &LocationQuery) -> Result<WeatherSnapshot, FetchError>;

    /// Forecast reduced to one midday entry per day.
    async fn forecast(&self, query: &LocationQuery) -> Result<ForecastSnapshot, FetchError>;
}

#[derive(Debug, Deserialize)]
struct CurrentResponse {
    main: CurrentMain,
    #[serde(default)]
    weather: Vec<CurrentCondition>,
    name: String,
    sys: CurrentSys,
}

#[derive(Debug, Deserialize)]
struct CurrentMain {
    temp: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct CurrentCondition {
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct CurrentSys {
    #[serde(default)]
    country: String,
}

#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    client: Arc<Client>,
    settings: ProviderSettings,
}

impl OpenWeatherClient {
    pub fn new(settings: ProviderSettings) -> Result<Self, FetchError> {
        let mut builder = Client::builder();
        if let Some(timeout) = settings.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        Ok(Self {
            client: Arc::new(client),
            settings,
        })
    }

    pub fn settings(&self) -> &ProviderSettings {
        &self.settings
    }

    fn location_params(query: &LocationQuery) -> Vec<(&'static str, String)> {
        match query {
            LocationQuery::CityName(name) => vec![("q", name.clone())],
            LocationQuery::Coordinates { lat, lon } => {
                vec![("lat", lat.to_string()), ("lon", lon.to_string())]
            }
        }
    }

    /// GET `url` for `query` with metric units and decode the JSON body.
    async fn get_metric<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        query: &LocationQuery,
    ) -> Result<T, FetchError> {
        let mut params = Self::location_params(query);
        params.push(("units", "metric".to_string()));
        params.push(("appid", self.settings.api_key.clone()));

        let response = self
            .client
            .get(url)
            .query(&params)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("Request for {} failed: {}", query, e);
                FetchError::from(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!("{} returned status {} for {}", url, status, query);
            return Err(FetchError::NotFound(status.as_u16()));
        }

        response
            .json()
            .await
            .map_err(|e| FetchError::Parse(format!("JSON parse error: {}", e)))
    }
}

#[async_trait]
impl WeatherApi for OpenWeatherClient {
    #[instrument(skip(self), level = "debug")]
    async fn geocode(&self, query: &str, limit: u8) -> Result<Vec<PlaceMatch>, FetchError> {
        direct_geocode(
            &self.client,
            &self.settings.geocode_url,
            &self.settings.api_key,
            query,
            limit,
        )
        .await
    }

    #[instrument(skip(self), level = "debug")]
    async fn current_weather(&self, query: &LocationQuery) -> Result<WeatherSnapshot, FetchError> {
        let body: CurrentResponse = self.get_metric(&self.settings.weather_url, query).await?;

        let (description, icon) = body
            .weather
            .into_iter()
            .next()
            .map(|w| (w.description, w.icon))
            .unwrap_or_default();

        let snapshot = WeatherSnapshot {
            raw_temp_celsius: body.main.temp,
            description: capitalize(&description),
            city_label: format!("{}, {}", body.name, body.sys.country),
            icon_url: self.settings.icon_url(&icon),
        };
        tracing::info!("Fetched current weather for {}", snapshot.city_label);
        Ok(snapshot)
    }

    #[instrument(skip(self), level = "debug")]
    async fn forecast(&self, query: &LocationQuery) -> Result<ForecastSnapshot, FetchError> {
        let body: ForecastResponse = self.get_metric(&self.settings.forecast_url, query).await?;
        let total = body.list.len();
        let snapshot = body.into_snapshot(|code| self.settings.icon_url(code));
        tracing::info!(
            "Fetched forecast for {}: {} of {} entries at midday",
            snapshot.city_label,
            snapshot.entries.len(),
            total
        );
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("broken clouds"), "Broken clouds");
        assert_eq!(capitalize(""), "");
        assert_eq!(capitalize("élan"), "Élan");
    }

    #[test]
    fn test_icon_url() {
        assert_eq!(
            icon_url("https://openweathermap.org/img/wn", "10d"),
            "https://openweathermap.org/img/wn/10d@2x.png"
        );
        assert_eq!(icon_url("http://x/", "01n"), "http://x/01n@2x.png");
    }

    #[test]
    fn test_settings_with_base_url() {
        let s = ProviderSettings::with_base_url("http://127.0.0.1:9000/", "key");
        assert_eq!(s.geocode_url, "http://127.0.0.1:9000/geo/1.0/direct");
        assert_eq!(s.forecast_url, "http://127.0.0.1:9000/data/2.5/forecast");
        assert_eq!(s.api_key, "key");
        assert_eq!(s.icon_url(""), None);
        assert_eq!(
            s.icon_url("02n").as_deref(),
            Some("http://127.0.0.1:9000/img/wn/02n@2x.png")
        );
    }

    #[test]
    fn test_location_params() {
        let params = OpenWeatherClient::location_params(&LocationQuery::Coordinates {
            lat: 25.5,
            lon: 55.25,
        });
        assert_eq!(
            params,
            vec![("lat", "25.5".to_string()), ("lon", "55.25".to_string())]
        );
    }
}
