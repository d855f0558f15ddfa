//! In-memory provider and helpers shared by the model tests.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use nimbus_weather::{
    FetchError, ForecastEntry, ForecastSnapshot, LocationQuery, PlaceMatch, WeatherApi,
    WeatherSnapshot,
};
use parking_lot::Mutex;

use crate::services::{MessageReceiver, ScreenMessage};

/// Scripted [`WeatherApi`]. Unknown cities answer `NotFound(404)`, unknown
/// geocode queries answer an empty list.
#[derive(Default)]
pub struct FakeApi {
    places: HashMap<String, Vec<PlaceMatch>>,
    geocode_errors: HashMap<String, FetchError>,
    delays: HashMap<String, Duration>,
    weather: HashMap<String, WeatherSnapshot>,
    coordinate_weather: Option<WeatherSnapshot>,
    forecasts: HashMap<String, ForecastSnapshot>,
    forecast_errors: HashMap<String, FetchError>,
    geocode_calls: Mutex<Vec<String>>,
    weather_calls: Mutex<Vec<LocationQuery>>,
    forecast_calls: Mutex<Vec<LocationQuery>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_places(mut self, query: &str, places: Vec<PlaceMatch>) -> Self {
        self.places.insert(query.to_string(), places);
        self
    }

    pub fn with_geocode_error(mut self, query: &str, err: FetchError) -> Self {
        self.geocode_errors.insert(query.to_string(), err);
        self
    }

    /// Delay the geocode answer for `query`.
    pub fn with_delay(mut self, query: &str, delay: Duration) -> Self {
        self.delays.insert(query.to_string(), delay);
        self
    }

    pub fn with_weather(mut self, city: &str, snapshot: WeatherSnapshot) -> Self {
        self.weather.insert(city.to_string(), snapshot);
        self
    }

    /// Answer for any coordinate query.
    pub fn with_coordinate_weather(mut self, snapshot: WeatherSnapshot) -> Self {
        self.coordinate_weather = Some(snapshot);
        self
    }

    pub fn with_forecast(mut self, city: &str, snapshot: ForecastSnapshot) -> Self {
        self.forecasts.insert(city.to_string(), snapshot);
        self
    }

    pub fn with_forecast_error(mut self, city: &str, err: FetchError) -> Self {
        self.forecast_errors.insert(city.to_string(), err);
        self
    }

    pub fn geocode_calls(&self) -> Vec<String> {
        self.geocode_calls.lock().clone()
    }

    pub fn weather_calls(&self) -> Vec<LocationQuery> {
        self.weather_calls.lock().clone()
    }

    pub fn forecast_calls(&self) -> Vec<LocationQuery> {
        self.forecast_calls.lock().clone()
    }
}

#[async_trait]
impl WeatherApi for FakeApi {
    async fn geocode(&self, query: &str, _limit: u8) -> Result<Vec<PlaceMatch>, FetchError> {
        self.geocode_calls.lock().push(query.to_string());
        if let Some(delay) = self.delays.get(query) {
            tokio::time::sleep(*delay).await;
        }
        if let Some(err) = self.geocode_errors.get(query) {
            return Err(err.clone());
        }
        Ok(self.places.get(query).cloned().unwrap_or_default())
    }

    async fn current_weather(&self, query: &LocationQuery) -> Result<WeatherSnapshot, FetchError> {
        self.weather_calls.lock().push(query.clone());
        let found = match query {
            LocationQuery::CityName(name) => self.weather.get(name).cloned(),
            LocationQuery::Coordinates { .. } => self.coordinate_weather.clone(),
        };
        found.ok_or(FetchError::NotFound(404))
    }

    async fn forecast(&self, query: &LocationQuery) -> Result<ForecastSnapshot, FetchError> {
        self.forecast_calls.lock().push(query.clone());
        let LocationQuery::CityName(name) = query else {
            return Err(FetchError::NotFound(404));
        };
        if let Some(err) = self.forecast_errors.get(name) {
            return Err(err.clone());
        }
        self.forecasts
            .get(name)
            .cloned()
            .ok_or(FetchError::NotFound(404))
    }
}

/// A geocode match; every fake place sits at 25.2, 55.3.
pub fn place(name: &str, state: Option<&str>, country: &str) -> PlaceMatch {
    PlaceMatch {
        name: name.to_string(),
        state: state.map(str::to_string),
        country: country.to_string(),
        lat: 25.2,
        lon: 55.3,
    }
}

pub fn snapshot(celsius: f64, description: &str, city_label: &str) -> WeatherSnapshot {
    WeatherSnapshot {
        raw_temp_celsius: Some(celsius),
        description: description.to_string(),
        city_label: city_label.to_string(),
        icon_url: Some("https://openweathermap.org/img/wn/01d@2x.png".to_string()),
    }
}

/// `days` consecutive midday entries at 30 °C starting Monday 2024-03-04.
pub fn forecast(city_label: &str, days: u32) -> ForecastSnapshot {
    let monday = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
    let entries = monday
        .iter_days()
        .take(days as usize)
        .map(|date| ForecastEntry {
            date,
            day_label: date.format("%A").to_string(),
            raw_temp_celsius: 30.0,
            description: "clear sky".to_string(),
            icon_url: Some("https://openweathermap.org/img/wn/01d@2x.png".to_string()),
        })
        .collect();
    ForecastSnapshot {
        city_label: city_label.to_string(),
        entries,
    }
}

/// Deliver messages until nothing arrives for a (virtual) second.
pub async fn drain(rx: &mut MessageReceiver, mut apply: impl FnMut(ScreenMessage)) {
    loop {
        tokio::select! {
            msg = rx.recv() => match msg {
                Some(msg) => apply(msg),
                None => return,
            },
            _ = tokio::time::sleep(Duration::from_secs(1)) => return,
        }
    }
}
