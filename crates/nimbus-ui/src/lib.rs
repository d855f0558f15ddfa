//! Headless screen models for Nimbus.
//!
//! Models own all screen state and are driven from one task: the host feeds
//! them user events and every [`services::ScreenMessage`] it receives.

pub mod error_mapping;
pub mod models;
pub mod services;

#[cfg(test)]
pub(crate) mod test_support;

pub use models::{AutocompleteSettings, FavoritesModel, ForecastModel, Key, WeatherModel};
pub use services::{channel, MessageReceiver, MessageSender, ScreenMessage};
