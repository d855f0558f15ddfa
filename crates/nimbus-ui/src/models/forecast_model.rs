//! Forecast screen.
//!
//! Same autocomplete contract as the current weather screen, except that
//! Enter without a highlighted suggestion searches the typed text.

use std::sync::Arc;

use nimbus_weather::{
    FetchError, ForecastEntry, ForecastSnapshot, LocationQuery, TemperatureUnit, WeatherApi,
};

use super::autocomplete_model::{
    AutocompleteModel, AutocompleteSettings, EnterBehavior, Key, SearchRequest, Selection,
};
use crate::error_mapping;
use crate::services::{request_forecast_fetch, MessageSender, ScreenMessage};

pub const EMPTY_CITY_MESSAGE: &str = "Enter a city name.";
pub const MISSING_COORDINATES_MESSAGE: &str = "Coordinates missing";
pub const NO_FORECAST_MESSAGE: &str = "No forecast available";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ForecastStatus {
    #[default]
    Idle,
    Loading,
    Ready,
    Failed,
}

/// One rendered day.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastCard {
    pub day: String,
    /// "21°C - clear sky"
    pub summary: String,
    pub icon_url: Option<String>,
}

impl ForecastCard {
    fn render(entry: &ForecastEntry, unit: TemperatureUnit) -> Self {
        Self {
            day: entry.day_label.clone(),
            summary: format!(
                "{} - {}",
                unit.format_compact(entry.raw_temp_celsius),
                entry.description
            ),
            icon_url: entry.icon_url.clone(),
        }
    }
}

/// What the forecast panel shows.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ForecastDisplay {
    pub status: ForecastStatus,
    pub error: Option<String>,
    pub header: Option<String>,
    pub cards: Vec<ForecastCard>,
    /// Set when a forecast arrived without any midday entry
    pub empty_message: Option<String>,
}

pub struct ForecastModel {
    api: Arc<dyn WeatherApi>,
    tx: MessageSender,
    autocomplete: AutocompleteModel,
    input: String,
    unit: TemperatureUnit,
    default_city: String,
    snapshot: Option<ForecastSnapshot>,
    display: ForecastDisplay,
}

impl ForecastModel {
    pub fn new(
        api: Arc<dyn WeatherApi>,
        tx: MessageSender,
        settings: AutocompleteSettings,
        unit: TemperatureUnit,
        default_city: impl Into<String>,
    ) -> Self {
        let autocomplete = AutocompleteModel::new(
            api.clone(),
            tx.clone(),
            settings,
            EnterBehavior::SelectOrSearch,
        );
        Self {
            api,
            tx,
            autocomplete,
            input: String::new(),
            unit,
            default_city: default_city.into(),
            snapshot: None,
            display: ForecastDisplay::default(),
        }
    }

    /// Screen opened: load the default city.
    pub fn start(&mut self) {
        self.input = self.default_city.clone();
        self.search();
    }

    pub fn autocomplete(&self) -> &AutocompleteModel {
        &self.autocomplete
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn unit(&self) -> TemperatureUnit {
        self.unit
    }

    pub fn snapshot(&self) -> Option<&ForecastSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn display(&self) -> &ForecastDisplay {
        &self.display
    }

    pub fn set_input(&mut self, text: &str) {
        self.input = text.to_string();
        self.autocomplete.on_input(text);
    }

    /// Returns whether the key was consumed.
    pub fn on_key(&mut self, key: Key) -> bool {
        let outcome = self.autocomplete.on_key(key);
        if let Some(request) = outcome.search {
            self.route(request);
        }
        outcome.consumed
    }

    pub fn pick(&mut self, index: usize) {
        if let Some(selection) = self.autocomplete.select_at(index) {
            self.route(SearchRequest::Selected(selection));
        }
    }

    pub fn on_blur(&self) {
        self.autocomplete.on_blur();
    }

    pub fn on_click_outside(&mut self) {
        self.autocomplete.on_click_outside();
    }

    /// Search button or Enter without a highlight.
    pub fn search(&mut self) {
        let text = self.input.trim().to_string();
        self.fetch_by_city_name(&text);
    }

    fn route(&mut self, request: SearchRequest) {
        match request {
            SearchRequest::Selected(Selection {
                display_name,
                lat,
                lon,
            }) => {
                self.input = display_name;
                self.fetch_by_coordinates(lat, lon);
            }
            SearchRequest::FreeText => self.search(),
        }
    }

    pub fn fetch_by_city_name(&mut self, city: &str) {
        if city.is_empty() {
            self.display.error = Some(EMPTY_CITY_MESSAGE.to_string());
            return;
        }
        self.autocomplete.clear();
        self.start_fetch(LocationQuery::CityName(city.to_string()));
    }

    pub fn fetch_by_coordinates(&mut self, lat: f64, lon: f64) {
        if !lat.is_finite() || !lon.is_finite() {
            self.display.error = Some(MISSING_COORDINATES_MESSAGE.to_string());
            return;
        }
        self.start_fetch(LocationQuery::Coordinates { lat, lon });
    }

    fn start_fetch(&mut self, query: LocationQuery) {
        tracing::debug!("Fetching forecast for {}", query);
        self.display = ForecastDisplay {
            status: ForecastStatus::Loading,
            ..Default::default()
        };
        request_forecast_fetch(&self.tx, self.api.clone(), query);
    }

    pub fn handle(&mut self, msg: ScreenMessage) {
        match msg {
            ScreenMessage::Autocomplete(m) => self.autocomplete.handle(m),
            ScreenMessage::ForecastDone { query, result } => self.apply_forecast(query, result),
            other => tracing::debug!("Forecast screen ignoring {:?}", other),
        }
    }

    fn apply_forecast(
        &mut self,
        query: LocationQuery,
        result: Result<ForecastSnapshot, FetchError>,
    ) {
        match result {
            Ok(snapshot) => {
                tracing::debug!(
                    "Forecast for {} has {} days",
                    snapshot.city_label,
                    snapshot.entries.len()
                );
                self.snapshot = Some(snapshot);
                self.render();
            }
            Err(e) => {
                let error = error_mapping::from_fetch(e, &query);
                tracing::info!("No forecast for {}: {}", query, error);
                self.snapshot = None;
                self.display = ForecastDisplay {
                    status: ForecastStatus::Failed,
                    error: Some(error.user_message().to_string()),
                    ..Default::default()
                };
            }
        }
    }

    fn render(&mut self) {
        let Some(snapshot) = &self.snapshot else {
            return;
        };
        let cards: Vec<ForecastCard> = snapshot
            .entries
            .iter()
            .map(|entry| ForecastCard::render(entry, self.unit))
            .collect();
        let empty_message = cards
            .is_empty()
            .then(|| NO_FORECAST_MESSAGE.to_string());

        self.display = ForecastDisplay {
            status: ForecastStatus::Ready,
            error: None,
            header: Some(snapshot.city_label.clone()),
            cards,
            empty_message,
        };
    }

    /// Switch the display unit and re-render the stored forecast.
    pub fn set_unit(&mut self, unit: TemperatureUnit) {
        self.unit = unit;
        self.render();
    }
}
