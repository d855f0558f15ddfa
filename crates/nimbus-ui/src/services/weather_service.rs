//! Current weather backend: async fetch by city name or coordinates.
//! Not cancellable; every request reports back, and the last one to finish
//! wins.

use std::sync::Arc;

use nimbus_weather::{LocationQuery, WeatherApi};

use super::{runtime_unavailable, spawn_task, MessageSender, ScreenMessage};

/// Request current conditions for `query`.
/// Sends `WeatherDone` on the channel when complete.
pub fn request_fetch(tx: &MessageSender, api: Arc<dyn WeatherApi>, query: LocationQuery) {
    let task_tx = tx.clone();
    let task_query = query.clone();
    let spawned = spawn_task(async move {
        let result = api.current_weather(&task_query).await;
        if let Err(e) = &result {
            tracing::warn!("Weather fetch for {} failed: {}", task_query, e);
        }
        let _ = task_tx.send(ScreenMessage::WeatherDone {
            query: task_query,
            result,
        });
    });

    if !spawned {
        let _ = tx.send(ScreenMessage::WeatherDone {
            query,
            result: Err(runtime_unavailable()),
        });
    }
}
