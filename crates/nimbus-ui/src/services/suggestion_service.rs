//! Autocomplete backend: debounce timers, blur grace timers and cancellable
//! geocode lookups.

use std::sync::Arc;
use std::time::Duration;

use nimbus_weather::{FetchError, WeatherApi};
use tokio_util::sync::CancellationToken;

use super::{runtime_unavailable, spawn_task, AutocompleteMessage, MessageSender, ScreenMessage};

fn send(tx: &MessageSender, msg: AutocompleteMessage) {
    if tx.send(ScreenMessage::Autocomplete(msg)).is_err() {
        tracing::debug!("Screen dropped before autocomplete event was delivered");
    }
}

/// Fire `DebounceElapsed` after `delay` unless `token` is cancelled first.
pub fn schedule_debounce(
    tx: &MessageSender,
    delay: Duration,
    generation: u64,
    query: String,
    token: CancellationToken,
) {
    let tx = tx.clone();
    spawn_task(async move {
        tokio::select! {
            biased;
            _ = token.cancelled() => {
                tracing::trace!("Debounce {} cancelled", generation);
            }
            _ = tokio::time::sleep(delay) => {
                send(&tx, AutocompleteMessage::DebounceElapsed { generation, query });
            }
        }
    });
}

/// Fire `BlurElapsed` after `delay`.
pub fn schedule_blur(tx: &MessageSender, delay: Duration) {
    let tx = tx.clone();
    spawn_task(async move {
        tokio::time::sleep(delay).await;
        send(&tx, AutocompleteMessage::BlurElapsed);
    });
}

/// Look up suggestions for `query`.
///
/// Cancelling `token` resolves the lookup immediately with
/// [`FetchError::Superseded`]; the in-flight HTTP request is dropped.
pub fn request_suggestions(
    tx: &MessageSender,
    api: Arc<dyn WeatherApi>,
    query: String,
    limit: u8,
    generation: u64,
    token: CancellationToken,
) {
    let task_tx = tx.clone();
    let spawned = spawn_task(async move {
        let result = tokio::select! {
            biased;
            _ = token.cancelled() => Err(FetchError::Superseded),
            r = api.geocode(&query, limit) => r,
        };
        send(
            &task_tx,
            AutocompleteMessage::SuggestionsDone {
                generation,
                query,
                result,
            },
        );
    });

    if !spawned {
        send(
            tx,
            AutocompleteMessage::SuggestionsDone {
                generation,
                query: String::new(),
                result: Err(runtime_unavailable()),
            },
        );
    }
}
