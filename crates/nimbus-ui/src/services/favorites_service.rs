//! Favorites backend: one independent current-weather fetch per card.

use std::sync::Arc;

use nimbus_weather::{LocationQuery, WeatherApi};

use super::{runtime_unavailable, spawn_task, MessageSender, ScreenMessage};

/// Request the card data for one favorite city.
/// Sends `FavoriteCardDone` on the channel when complete.
pub fn request_card(tx: &MessageSender, api: Arc<dyn WeatherApi>, city: String) {
    let task_tx = tx.clone();
    let task_city = city.clone();
    let spawned = spawn_task(async move {
        let query = LocationQuery::CityName(task_city.clone());
        let result = api.current_weather(&query).await;
        let _ = task_tx.send(ScreenMessage::FavoriteCardDone {
            city: task_city,
            result,
        });
    });

    if !spawned {
        let _ = tx.send(ScreenMessage::FavoriteCardDone {
            city,
            result: Err(runtime_unavailable()),
        });
    }
}
