//! Direct geocoding: convert a free-text place name into ranked candidates.
//! Uses the OpenWeatherMap geocoding endpoint.

use crate::types::{FetchError, PlaceMatch};
use reqwest::Client;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    name: String,
    state: Option<String>,
    #[serde(default)]
    country: String,
    lat: f64,
    lon: f64,
    // local_names is large and unused
}

impl From<GeocodeResult> for PlaceMatch {
    fn from(r: GeocodeResult) -> Self {
        PlaceMatch {
            name: r.name,
            state: r.state.filter(|s| !s.is_empty()),
            country: r.country,
            lat: r.lat,
            lon: r.lon,
        }
    }
}

impl PlaceMatch {
    /// Label shown in the suggestion list and written back into the input:
    /// "Springfield, Illinois, US" or "Dubai, AE" when there is no state.
    pub fn display_name(&self) -> String {
        match self.state.as_deref() {
            Some(state) if !state.is_empty() => {
                format!("{}, {}, {}", self.name, state, self.country)
            }
            _ => format!("{}, {}", self.name, self.country),
        }
    }
}

/// Look up at most `limit` candidates for `query`, in provider order.
pub(crate) async fn direct_geocode(
    client: &Client,
    url: &str,
    api_key: &str,
    query: &str,
    limit: u8,
) -> Result<Vec<PlaceMatch>, FetchError> {
    let limit = limit.to_string();
    let response = client
        .get(url)
        .query(&[("q", query), ("limit", limit.as_str()), ("appid", api_key)])
        .send()
        .await
        .map_err(|e| {
            tracing::debug!("Geocode request failed: {}", e);
            FetchError::from(e)
        })?;

    if !response.status().is_success() {
        tracing::debug!("Geocode returned status {}", response.status());
        return Err(FetchError::NotFound(response.status().as_u16()));
    }

    let body: Vec<GeocodeResult> = response.json().await.map_err(|e| {
        tracing::debug!("Geocode parse error: {}", e);
        FetchError::Parse(e.to_string())
    })?;

    let places: Vec<PlaceMatch> = body.into_iter().map(PlaceMatch::from).collect();
    tracing::debug!("Geocoded {:?} to {} candidates", query, places.len());
    Ok(places)
}
