//! Autocomplete session for one city input.
//!
//! Owns the suggestion list, the keyboard highlight, the debounce timer and
//! the in-flight geocode lookup. Screens embed one instance each and route
//! the returned [`SearchRequest`]s to their own fetcher.
//!
//! Ordering rules:
//! - a keystroke cancels the pending debounce; only the last one in a burst
//!   fires a lookup;
//! - starting a lookup cancels the previous one, and any result tagged with
//!   an older generation is dropped on arrival, so a superseded lookup never
//!   overwrites newer state.

use std::sync::Arc;
use std::time::Duration;

use nimbus_core::SearchConfig;
use nimbus_weather::{FetchError, PlaceMatch, WeatherApi};
use tokio_util::sync::CancellationToken;

use crate::services::{
    request_suggestions, schedule_blur, schedule_debounce, AutocompleteMessage, MessageSender,
};

/// Keys the input field reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowDown,
    ArrowUp,
    Enter,
    Escape,
}

/// What Enter does when no suggestion is highlighted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnterBehavior {
    /// Nothing (current weather screen)
    SelectOnly,
    /// Search the typed text (forecast screen)
    SelectOrSearch,
}

/// A suggestion the user picked.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub display_name: String,
    pub lat: f64,
    pub lon: f64,
}

/// Fetch the owning screen should start.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchRequest {
    /// Write `display_name` into the input and fetch by coordinates
    Selected(Selection),
    /// Fetch by the input's current text
    FreeText,
}

/// Result of a key press.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct KeyOutcome {
    /// The key was handled and its default action suppressed
    pub consumed: bool,
    pub search: Option<SearchRequest>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutocompleteSettings {
    pub debounce: Duration,
    pub blur_grace: Duration,
    pub limit: u8,
}

impl Default for AutocompleteSettings {
    fn default() -> Self {
        Self::from(&SearchConfig::default())
    }
}

impl From<&SearchConfig> for AutocompleteSettings {
    fn from(config: &SearchConfig) -> Self {
        Self {
            debounce: Duration::from_millis(config.debounce_ms),
            blur_grace: Duration::from_millis(config.blur_grace_ms),
            limit: config.suggestion_limit,
        }
    }
}

pub struct AutocompleteModel {
    api: Arc<dyn WeatherApi>,
    tx: MessageSender,
    settings: AutocompleteSettings,
    enter_behavior: EnterBehavior,
    suggestions: Vec<PlaceMatch>,
    highlighted: Option<usize>,
    debounce_generation: u64,
    debounce_token: Option<CancellationToken>,
    lookup_generation: u64,
    lookup_token: Option<CancellationToken>,
}

impl std::fmt::Debug for AutocompleteModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AutocompleteModel")
            .field("suggestions", &self.suggestions)
            .field("highlighted", &self.highlighted)
            .field("lookup_generation", &self.lookup_generation)
            .finish_non_exhaustive()
    }
}

impl AutocompleteModel {
    pub fn new(
        api: Arc<dyn WeatherApi>,
        tx: MessageSender,
        settings: AutocompleteSettings,
        enter_behavior: EnterBehavior,
    ) -> Self {
        Self {
            api,
            tx,
            settings,
            enter_behavior,
            suggestions: Vec::new(),
            highlighted: None,
            debounce_generation: 0,
            debounce_token: None,
            lookup_generation: 0,
            lookup_token: None,
        }
    }

    pub fn suggestions(&self) -> &[PlaceMatch] {
        &self.suggestions
    }

    /// Display labels in list order.
    pub fn labels(&self) -> Vec<String> {
        self.suggestions.iter().map(PlaceMatch::display_name).collect()
    }

    pub fn highlighted(&self) -> Option<usize> {
        self.highlighted
    }

    /// Highlight as a signed index, -1 meaning none.
    pub fn highlighted_index(&self) -> isize {
        self.highlighted.map_or(-1, |i| i as isize)
    }

    pub fn is_visible(&self) -> bool {
        !self.suggestions.is_empty()
    }

    pub fn lookup_in_flight(&self) -> bool {
        self.lookup_token.is_some()
    }

    /// Raw input change. Empty text clears right away; anything else
    /// restarts the quiet period.
    pub fn on_input(&mut self, text: &str) {
        if let Some(token) = self.debounce_token.take() {
            token.cancel();
        }

        let query = text.trim();
        if query.is_empty() {
            self.clear();
            return;
        }

        self.debounce_generation += 1;
        let token = CancellationToken::new();
        schedule_debounce(
            &self.tx,
            self.settings.debounce,
            self.debounce_generation,
            query.to_string(),
            token.clone(),
        );
        self.debounce_token = Some(token);
    }

    /// Start a lookup for `query`, superseding any lookup in flight.
    pub fn fetch_suggestions(&mut self, query: &str) {
        let query = query.trim();
        if query.is_empty() {
            self.clear();
            return;
        }

        if let Some(previous) = self.lookup_token.take() {
            tracing::debug!("Superseding lookup {}", self.lookup_generation);
            previous.cancel();
        }

        self.lookup_generation += 1;
        let token = CancellationToken::new();
        request_suggestions(
            &self.tx,
            self.api.clone(),
            query.to_string(),
            self.settings.limit,
            self.lookup_generation,
            token.clone(),
        );
        self.lookup_token = Some(token);
    }

    /// Apply a timer or lookup event.
    pub fn handle(&mut self, msg: AutocompleteMessage) {
        match msg {
            AutocompleteMessage::DebounceElapsed { generation, query } => {
                if generation != self.debounce_generation {
                    tracing::trace!("Ignoring stale debounce {}", generation);
                    return;
                }
                self.debounce_token = None;
                self.fetch_suggestions(&query);
            }
            AutocompleteMessage::SuggestionsDone {
                generation,
                query,
                result,
            } => self.apply_lookup(generation, &query, result),
            AutocompleteMessage::BlurElapsed => self.clear(),
        }
    }

    fn apply_lookup(
        &mut self,
        generation: u64,
        query: &str,
        result: Result<Vec<PlaceMatch>, FetchError>,
    ) {
        if generation != self.lookup_generation {
            tracing::debug!(
                "Discarding lookup {} for {:?}; latest is {}",
                generation,
                query,
                self.lookup_generation
            );
            return;
        }

        match result {
            Err(FetchError::Superseded) => {
                // The newer lookup owns the state now
            }
            Ok(places) => {
                self.lookup_token = None;
                if places.is_empty() {
                    self.clear();
                } else {
                    self.suggestions = places;
                    self.highlighted = None;
                }
            }
            Err(FetchError::NotFound(status)) => {
                self.lookup_token = None;
                tracing::debug!("Geocode for {:?} returned status {}", query, status);
                self.clear();
            }
            Err(e @ (FetchError::Transport(_) | FetchError::Parse(_))) => {
                self.lookup_token = None;
                tracing::warn!("Geocode error for {:?}: {}", query, e);
                self.clear();
            }
        }
    }

    pub fn highlight_next(&mut self) {
        if self.suggestions.is_empty() {
            return;
        }
        let last = self.suggestions.len() - 1;
        self.highlighted = Some(match self.highlighted {
            None => 0,
            Some(i) => (i + 1).min(last),
        });
    }

    pub fn highlight_previous(&mut self) {
        if self.suggestions.is_empty() {
            return;
        }
        self.highlighted = Some(match self.highlighted {
            None => 0,
            Some(i) => i.saturating_sub(1),
        });
    }

    /// Resolve the suggestion at `index` and clear the list. Out of range
    /// (stale) indexes do nothing.
    pub fn select_at(&mut self, index: usize) -> Option<Selection> {
        let place = self.suggestions.get(index)?;
        let selection = Selection {
            display_name: place.display_name(),
            lat: place.lat,
            lon: place.lon,
        };
        self.clear();
        Some(selection)
    }

    /// Empty the list and reset the highlight.
    pub fn clear(&mut self) {
        self.suggestions.clear();
        self.highlighted = None;
    }

    /// Keyboard contract of the input field.
    pub fn on_key(&mut self, key: Key) -> KeyOutcome {
        if self.suggestions.is_empty() {
            return match (key, self.enter_behavior) {
                (Key::Enter, EnterBehavior::SelectOrSearch) => KeyOutcome {
                    consumed: false,
                    search: Some(SearchRequest::FreeText),
                },
                _ => KeyOutcome::default(),
            };
        }

        match key {
            Key::ArrowDown => {
                self.highlight_next();
                KeyOutcome {
                    consumed: true,
                    search: None,
                }
            }
            Key::ArrowUp => {
                self.highlight_previous();
                KeyOutcome {
                    consumed: true,
                    search: None,
                }
            }
            Key::Enter => {
                let selection = match self.highlighted {
                    Some(i) => self.select_at(i),
                    None => None,
                };
                match selection {
                    Some(selection) => KeyOutcome {
                        consumed: true,
                        search: Some(SearchRequest::Selected(selection)),
                    },
                    None if self.enter_behavior == EnterBehavior::SelectOrSearch => KeyOutcome {
                        consumed: false,
                        search: Some(SearchRequest::FreeText),
                    },
                    None => KeyOutcome::default(),
                }
            }
            Key::Escape => {
                self.clear();
                KeyOutcome::default()
            }
        }
    }

    /// Input lost focus; hide the list after the grace delay so a click on
    /// a suggestion still lands.
    pub fn on_blur(&self) {
        schedule_blur(&self.tx, self.settings.blur_grace);
    }

    /// Click anywhere outside the input and its list.
    pub fn on_click_outside(&mut self) {
        self.clear();
    }
}
