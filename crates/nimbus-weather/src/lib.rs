//! Weather provider access for Nimbus
//!
//! OpenWeatherMap geocoding, current conditions and 5 day forecast, plus the
//! pure display helpers (units, bands, midday filtering) and the persisted
//! favorites list.

pub mod favorites;
pub mod forecast;
pub mod geocode;
pub mod provider;
pub mod types;
pub mod units;

pub use favorites::{
    AddOutcome, FavoritesStore, JsonFileStore, KeyValueStore, MemoryStore, StoreError,
};
pub use provider::{OpenWeatherClient, ProviderSettings, WeatherApi};
pub use types::*;
