//! Forecast backend: async fetch by city name or coordinates.

use std::sync::Arc;

use nimbus_weather::{LocationQuery, WeatherApi};

use super::{runtime_unavailable, spawn_task, MessageSender, ScreenMessage};

/// Request the daily forecast for `query`.
/// Sends `ForecastDone` on the channel when complete.
pub fn request_fetch(tx: &MessageSender, api: Arc<dyn WeatherApi>, query: LocationQuery) {
    let task_tx = tx.clone();
    let task_query = query.clone();
    let spawned = spawn_task(async move {
        let result = api.forecast(&task_query).await;
        if let Err(e) = &result {
            tracing::warn!("Forecast fetch for {} failed: {}", task_query, e);
        }
        let _ = task_tx.send(ScreenMessage::ForecastDone {
            query: task_query,
            result,
        });
    });

    if !spawned {
        let _ = tx.send(ScreenMessage::ForecastDone {
            query,
            result: Err(runtime_unavailable()),
        });
    }
}
