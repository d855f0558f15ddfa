//! Favorites screen: one independently fetched card per saved city.

use std::sync::Arc;

use nimbus_core::AppError;
use nimbus_weather::{
    units::round_half_up, FavoritesStore, FetchError, TemperatureBand, TemperatureUnit,
    WeatherApi, WeatherSnapshot,
};

use crate::error_mapping;
use crate::services::{request_favorite_card, MessageSender, ScreenMessage};

#[derive(Debug, Clone, PartialEq)]
pub enum CardState {
    Loading,
    Ready {
        /// "21°C - clear sky"
        summary: String,
        icon_url: Option<String>,
        band: TemperatureBand,
        raw_temp_celsius: f64,
        description: String,
    },
    /// Fetch failed; the card is not shown
    Failed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FavoriteCard {
    pub city: String,
    pub state: CardState,
}

impl FavoriteCard {
    pub fn is_visible(&self) -> bool {
        matches!(self.state, CardState::Ready { .. })
    }
}

pub struct FavoritesModel {
    api: Arc<dyn WeatherApi>,
    tx: MessageSender,
    store: FavoritesStore,
    unit: TemperatureUnit,
    cards: Vec<FavoriteCard>,
}

impl FavoritesModel {
    pub fn new(
        api: Arc<dyn WeatherApi>,
        tx: MessageSender,
        store: FavoritesStore,
        unit: TemperatureUnit,
    ) -> Self {
        Self {
            api,
            tx,
            store,
            unit,
            cards: Vec::new(),
        }
    }

    pub fn favorites(&self) -> &[String] {
        self.store.list()
    }

    pub fn cards(&self) -> &[FavoriteCard] {
        &self.cards
    }

    /// Cards that loaded, in list order.
    pub fn visible_cards(&self) -> impl Iterator<Item = &FavoriteCard> {
        self.cards.iter().filter(|c| c.is_visible())
    }

    /// Number of cards still waiting for their fetch.
    pub fn pending(&self) -> usize {
        self.cards
            .iter()
            .filter(|c| c.state == CardState::Loading)
            .count()
    }

    /// Rebuild every card and fetch each city independently.
    pub fn render_all(&mut self) {
        self.cards = self
            .store
            .list()
            .iter()
            .map(|city| FavoriteCard {
                city: city.clone(),
                state: CardState::Loading,
            })
            .collect();

        tracing::debug!("Rendering {} favorites", self.cards.len());
        for card in &self.cards {
            request_favorite_card(&self.tx, self.api.clone(), card.city.clone());
        }
    }

    /// Card remove action: persist, then re-render everything.
    pub fn remove(&mut self, city: &str) -> Result<bool, AppError> {
        let removed = self.store.remove(city).map_err(error_mapping::from_store)?;
        self.render_all();
        Ok(removed)
    }

    pub fn handle(&mut self, msg: ScreenMessage) {
        match msg {
            ScreenMessage::FavoriteCardDone { city, result } => self.apply_card(&city, result),
            other => tracing::debug!("Favorites screen ignoring {:?}", other),
        }
    }

    fn apply_card(&mut self, city: &str, result: Result<WeatherSnapshot, FetchError>) {
        if !self.store.contains(city) {
            tracing::debug!("Dropping card result for removed favorite {}", city);
            return;
        }

        let state = match result {
            Ok(snapshot) => self.ready_state(&snapshot),
            Err(e) => {
                tracing::warn!("Favorite {} failed to load: {}", city, e);
                CardState::Failed
            }
        };

        for card in self.cards.iter_mut().filter(|c| c.city == city) {
            card.state = state.clone();
        }
    }

    fn ready_state(&self, snapshot: &WeatherSnapshot) -> CardState {
        let Some(celsius) = snapshot.raw_temp_celsius else {
            return CardState::Failed;
        };
        CardState::Ready {
            summary: format!("{} - {}", self.unit.format_compact(celsius), snapshot.description),
            icon_url: snapshot.icon_url.clone(),
            band: TemperatureBand::from_celsius(round_half_up(celsius)),
            raw_temp_celsius: celsius,
            description: snapshot.description.clone(),
        }
    }

    pub fn set_unit(&mut self, unit: TemperatureUnit) {
        self.unit = unit;
        for card in &mut self.cards {
            if let CardState::Ready {
                summary,
                raw_temp_celsius,
                description,
                ..
            } = &mut card.state
            {
                *summary = format!("{} - {}", unit.format_compact(*raw_temp_celsius), description);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{channel, MessageReceiver};
    use crate::test_support::{drain, snapshot, FakeApi};
    use nimbus_weather::{KeyValueStore, MemoryStore};

    fn seeded(
        api: Arc<FakeApi>,
        seed: &[&str],
    ) -> (FavoritesModel, MessageReceiver, Arc<MemoryStore>) {
        let (tx, rx) = channel();
        let backend = Arc::new(MemoryStore::default());
        let seed: Vec<String> = seed.iter().map(|s| s.to_string()).collect();
        let store = FavoritesStore::load(backend.clone(), &seed).unwrap();
        (
            FavoritesModel::new(api, tx, store, TemperatureUnit::Celsius),
            rx,
            backend,
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_cards_get_bands_from_rounded_celsius() {
        let api = Arc::new(
            FakeApi::new()
                .with_weather("Dubai", snapshot(29.5, "clear sky", "Dubai, AE"))
                .with_weather("London", snapshot(9.4, "drizzle", "London, GB"))
                .with_weather("Paris", snapshot(19.96, "mist", "Paris, FR")),
        );
        let (mut model, mut rx, _) = seeded(api, &["Dubai", "London", "Paris"]);

        model.render_all();
        assert_eq!(model.pending(), 3);
        drain(&mut rx, |m| model.handle(m)).await;

        let bands: Vec<(String, TemperatureBand)> = model
            .visible_cards()
            .filter_map(|c| match &c.state {
                CardState::Ready { band, .. } => Some((c.city.clone(), *band)),
                _ => None,
            })
            .collect();
        assert_eq!(
            bands,
            vec![
                ("Dubai".to_string(), TemperatureBand::Hot),
                ("London".to_string(), TemperatureBand::Cold),
                ("Paris".to_string(), TemperatureBand::Warm),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_one_failed_card_does_not_block_others() {
        let api = Arc::new(
            FakeApi::new()
                .with_weather("Dubai", snapshot(35.0, "clear sky", "Dubai, AE"))
                .with_weather("London", snapshot(12.0, "overcast clouds", "London, GB")),
        );
        let (mut model, mut rx, _) = seeded(api, &["Dubai", "Nowhere", "London"]);

        model.render_all();
        drain(&mut rx, |m| model.handle(m)).await;

        let shown: Vec<&str> = model.visible_cards().map(|c| c.city.as_str()).collect();
        assert_eq!(shown, ["Dubai", "London"]);
        assert_eq!(model.cards()[1].state, CardState::Failed);
        match &model.cards()[2].state {
            CardState::Ready { summary, .. } => assert_eq!(summary, "12°C - overcast clouds"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_remove_persists_and_rerenders() {
        let api = Arc::new(
            FakeApi::new()
                .with_weather("Dubai", snapshot(35.0, "clear sky", "Dubai, AE"))
                .with_weather("London", snapshot(12.0, "rain", "London, GB")),
        );
        let (mut model, mut rx, backend) = seeded(api.clone(), &["Dubai", "London"]);
        model.render_all();
        drain(&mut rx, |m| model.handle(m)).await;

        assert!(model.remove("Dubai").unwrap());
        drain(&mut rx, |m| model.handle(m)).await;

        assert_eq!(model.favorites(), ["London".to_string()]);
        assert_eq!(
            backend.get("favorites").unwrap().as_deref(),
            Some(r#"["London"]"#)
        );
        let shown: Vec<&str> = model.visible_cards().map(|c| c.city.as_str()).collect();
        assert_eq!(shown, ["London"]);
        // Two cards, then one after the re-render
        assert_eq!(api.weather_calls().len(), 3);

        assert!(!model.remove("Atlantis").unwrap());
        assert_eq!(model.favorites(), ["London".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_remove_on_fresh_screen_loads_remaining_cards() {
        let api = Arc::new(
            FakeApi::new()
                .with_weather("Dubai", snapshot(35.0, "clear sky", "Dubai, AE"))
                .with_weather("London", snapshot(12.0, "rain", "London, GB")),
        );
        let (mut model, mut rx, backend) = seeded(api.clone(), &["Dubai", "London"]);

        assert!(model.remove("London").unwrap());
        assert_eq!(model.pending(), 1);
        drain(&mut rx, |m| model.handle(m)).await;

        assert_eq!(
            backend.get("favorites").unwrap().as_deref(),
            Some(r#"["Dubai"]"#)
        );
        let shown: Vec<&str> = model.visible_cards().map(|c| c.city.as_str()).collect();
        assert_eq!(shown, ["Dubai"]);
        assert_eq!(api.weather_calls().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_late_result_for_removed_city_is_dropped() {
        let api = Arc::new(
            FakeApi::new()
                .with_weather("Dubai", snapshot(35.0, "clear sky", "Dubai, AE"))
                .with_weather("London", snapshot(12.0, "rain", "London, GB")),
        );
        let (mut model, mut rx, _) = seeded(api, &["Dubai", "London"]);

        model.render_all();
        model.remove("Dubai").unwrap();
        drain(&mut rx, |m| model.handle(m)).await;

        assert!(model.cards().iter().all(|c| c.city != "Dubai"));
        assert_eq!(model.pending(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unit_toggle_keeps_band() {
        let api = Arc::new(
            FakeApi::new().with_weather("Dubai", snapshot(30.0, "clear sky", "Dubai, AE")),
        );
        let (mut model, mut rx, _) = seeded(api, &["Dubai"]);
        model.render_all();
        drain(&mut rx, |m| model.handle(m)).await;

        model.set_unit(TemperatureUnit::Fahrenheit);

        match &model.cards()[0].state {
            CardState::Ready { summary, band, .. } => {
                assert_eq!(summary, "86°F - clear sky");
                assert_eq!(*band, TemperatureBand::Hot);
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
