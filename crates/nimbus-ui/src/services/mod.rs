//! Async backends for the screen models.
//!
//! Each `request_*`/`schedule_*` function spawns network or timer work on the
//! current tokio runtime and reports back with a [`ScreenMessage`]. Models
//! apply messages on the main sequence, so model state is never touched from
//! a spawned task.

pub mod favorites_service;
pub mod forecast_service;
pub mod suggestion_service;
pub mod weather_service;

use std::future::Future;

use nimbus_weather::{FetchError, ForecastSnapshot, LocationQuery, PlaceMatch, WeatherSnapshot};
use tokio::sync::mpsc;

pub use favorites_service::request_card as request_favorite_card;
pub use forecast_service::request_fetch as request_forecast_fetch;
pub use suggestion_service::{request_suggestions, schedule_blur, schedule_debounce};
pub use weather_service::request_fetch as request_weather_fetch;

/// Channel every screen model drains.
pub type MessageSender = mpsc::UnboundedSender<ScreenMessage>;
pub type MessageReceiver = mpsc::UnboundedReceiver<ScreenMessage>;

pub fn channel() -> (MessageSender, MessageReceiver) {
    mpsc::unbounded_channel()
}

/// Messages sent from async operations back to the owning screen
#[derive(Debug)]
pub enum ScreenMessage {
    Autocomplete(AutocompleteMessage),
    /// Current weather fetch finished
    WeatherDone {
        query: LocationQuery,
        result: Result<WeatherSnapshot, FetchError>,
    },
    /// Forecast fetch finished
    ForecastDone {
        query: LocationQuery,
        result: Result<ForecastSnapshot, FetchError>,
    },
    /// One favorites card finished loading
    FavoriteCardDone {
        city: String,
        result: Result<WeatherSnapshot, FetchError>,
    },
}

/// Timer and lookup events of one autocomplete session
#[derive(Debug)]
pub enum AutocompleteMessage {
    /// The quiet period after the last keystroke passed
    DebounceElapsed { generation: u64, query: String },
    /// A geocode lookup finished, was cancelled, or failed
    SuggestionsDone {
        generation: u64,
        query: String,
        result: Result<Vec<PlaceMatch>, FetchError>,
    },
    /// The blur grace delay passed
    BlurElapsed,
}

/// Spawn onto the ambient runtime. Returns false when called outside one.
pub(crate) fn spawn_task<F>(task: F) -> bool
where
    F: Future<Output = ()> + Send + 'static,
{
    match tokio::runtime::Handle::try_current() {
        Ok(handle) => {
            handle.spawn(task);
            true
        }
        Err(e) => {
            tracing::error!("No async runtime available: {}", e);
            false
        }
    }
}

pub(crate) fn runtime_unavailable() -> FetchError {
    FetchError::Transport("async runtime not available".to_string())
}
