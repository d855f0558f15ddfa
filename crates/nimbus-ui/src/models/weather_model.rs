//! Current weather screen.
//!
//! One city input with autocomplete (Enter only selects), a manual search,
//! the °C/°F toggle and "add to favorites".

use std::sync::Arc;

use nimbus_core::AppError;
use nimbus_weather::{
    AddOutcome, FavoritesStore, FetchError, LocationQuery, TemperatureUnit, WeatherApi,
    WeatherSnapshot,
};

use super::autocomplete_model::{
    AutocompleteModel, AutocompleteSettings, EnterBehavior, Key, SearchRequest, Selection,
};
use crate::error_mapping;
use crate::services::{request_weather_fetch, MessageSender, ScreenMessage};

/// Placeholder temperature shown without data.
pub const NO_TEMPERATURE: &str = "--";
/// Placeholder city shown after a failed fetch.
pub const NO_CITY: &str = "—";

/// What the current weather panel shows.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WeatherDisplay {
    pub temperature: String,
    pub description: String,
    pub city: String,
    pub icon_url: Option<String>,
}

impl WeatherDisplay {
    fn not_found(query: &LocationQuery) -> Self {
        Self {
            temperature: NO_TEMPERATURE.to_string(),
            description: error_mapping::not_found_text(query).to_string(),
            city: NO_CITY.to_string(),
            icon_url: None,
        }
    }

    fn from_snapshot(snapshot: &WeatherSnapshot, unit: TemperatureUnit) -> Self {
        Self {
            temperature: snapshot
                .raw_temp_celsius
                .map(|c| unit.format_spaced(c))
                .unwrap_or_else(|| NO_TEMPERATURE.to_string()),
            description: snapshot.description.clone(),
            city: snapshot.city_label.clone(),
            icon_url: snapshot.icon_url.clone(),
        }
    }
}

/// Result of [`WeatherModel::add_favorite`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddFavoriteOutcome {
    Added(String),
    AlreadyPresent(String),
    /// No weather shown yet
    NothingToAdd,
}

pub struct WeatherModel {
    api: Arc<dyn WeatherApi>,
    tx: MessageSender,
    autocomplete: AutocompleteModel,
    input: String,
    unit: TemperatureUnit,
    loading: bool,
    snapshot: Option<WeatherSnapshot>,
    display: WeatherDisplay,
    favorites: FavoritesStore,
}

impl WeatherModel {
    pub fn new(
        api: Arc<dyn WeatherApi>,
        tx: MessageSender,
        settings: AutocompleteSettings,
        unit: TemperatureUnit,
        favorites: FavoritesStore,
    ) -> Self {
        let autocomplete =
            AutocompleteModel::new(api.clone(), tx.clone(), settings, EnterBehavior::SelectOnly);
        Self {
            api,
            tx,
            autocomplete,
            input: String::new(),
            unit,
            loading: false,
            snapshot: None,
            display: WeatherDisplay {
                temperature: NO_TEMPERATURE.to_string(),
                ..Default::default()
            },
            favorites,
        }
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

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn snapshot(&self) -> Option<&WeatherSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn display(&self) -> &WeatherDisplay {
        &self.display
    }

    pub fn favorites(&self) -> &[String] {
        self.favorites.list()
    }

    /// The user edited the input.
    pub fn set_input(&mut self, text: &str) {
        self.input = text.to_string();
        self.autocomplete.on_input(text);
    }

    pub fn on_key(&mut self, key: Key) -> bool {
        let outcome = self.autocomplete.on_key(key);
        if let Some(request) = outcome.search {
            self.route(request);
        }
        outcome.consumed
    }

    /// Click on suggestion `index`.
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

    /// Search button: fetch by the typed city name.
    pub fn search(&mut self) {
        self.autocomplete.clear();
        let text = self.input.clone();
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

    /// Empty names are ignored silently.
    pub fn fetch_by_city_name(&mut self, text: &str) {
        let name = text.trim();
        if name.is_empty() {
            tracing::debug!("Ignoring weather search with empty city");
            return;
        }
        self.start_fetch(LocationQuery::CityName(name.to_string()));
    }

    pub fn fetch_by_coordinates(&mut self, lat: f64, lon: f64) {
        if !lat.is_finite() || !lon.is_finite() {
            tracing::debug!("Ignoring weather search without coordinates");
            return;
        }
        self.start_fetch(LocationQuery::Coordinates { lat, lon });
    }

    fn start_fetch(&mut self, query: LocationQuery) {
        tracing::debug!("Fetching current weather for {}", query);
        self.loading = true;
        request_weather_fetch(&self.tx, self.api.clone(), query);
    }

    pub fn handle(&mut self, msg: ScreenMessage) {
        match msg {
            ScreenMessage::Autocomplete(m) => self.autocomplete.handle(m),
            ScreenMessage::WeatherDone { query, result } => self.apply_weather(query, result),
            other => tracing::debug!("Weather screen ignoring {:?}", other),
        }
    }

    fn apply_weather(&mut self, query: LocationQuery, result: Result<WeatherSnapshot, FetchError>) {
        self.loading = false;
        match result {
            Ok(snapshot) => {
                self.display = WeatherDisplay::from_snapshot(&snapshot, self.unit);
                self.snapshot = Some(snapshot);
            }
            Err(e) => {
                tracing::info!(
                    "No weather for {}: {}",
                    query,
                    error_mapping::from_fetch(e, &query)
                );
                self.snapshot = None;
                self.display = WeatherDisplay::not_found(&query);
            }
        }
    }

    /// Switch the display unit and re-render the stored snapshot.
    pub fn set_unit(&mut self, unit: TemperatureUnit) {
        self.unit = unit;
        if let Some(snapshot) = &self.snapshot {
            self.display = WeatherDisplay::from_snapshot(snapshot, unit);
        }
    }

    /// Add the city currently shown.
    pub fn add_favorite(&mut self) -> Result<AddFavoriteOutcome, AppError> {
        let Some(label) = self.snapshot.as_ref().map(|s| s.city_label.clone()) else {
            return Ok(AddFavoriteOutcome::NothingToAdd);
        };
        match self.favorites.add(&label).map_err(error_mapping::from_store)? {
            AddOutcome::Added => Ok(AddFavoriteOutcome::Added(label)),
            AddOutcome::AlreadyPresent => Ok(AddFavoriteOutcome::AlreadyPresent(label)),
        }
    }
}
