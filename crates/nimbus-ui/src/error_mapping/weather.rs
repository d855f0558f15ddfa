use nimbus_core::{AppError, NetworkError, WeatherError};
use nimbus_weather::{FetchError, LocationQuery};

/// Map a failed weather or forecast fetch for `query`.
///
/// Non-success statuses become "not found" in the wording of the query
/// kind: city name or coordinates. 401 is reported as a key problem.
pub fn from_fetch(err: FetchError, query: &LocationQuery) -> AppError {
    match err {
        FetchError::NotFound(401) => AppError::Weather(WeatherError::InvalidApiKey),
        FetchError::NotFound(status) => match query {
            LocationQuery::CityName(name) => AppError::Weather(WeatherError::CityNotFound(
                format!("{} (HTTP {})", name, status),
            )),
            LocationQuery::Coordinates { .. } => AppError::Weather(
                WeatherError::LocationNotFound(format!("{} (HTTP {})", query, status)),
            ),
        },
        FetchError::Superseded => {
            AppError::Weather(WeatherError::ApiError("request superseded".to_string()))
        }
        FetchError::Transport(msg) => AppError::Network(NetworkError::ConnectionFailed(msg)),
        FetchError::Parse(msg) => AppError::Network(NetworkError::InvalidResponse(msg)),
    }
}

/// Fallback text for a query that produced no data.
pub(crate) fn not_found_text(query: &LocationQuery) -> &'static str {
    match query {
        LocationQuery::CityName(name) => WeatherError::CityNotFound(name.clone()).user_message(),
        LocationQuery::Coordinates { .. } => {
            WeatherError::LocationNotFound(query.to_string()).user_message()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_wording_follows_query_kind() {
        let by_name = LocationQuery::CityName("Atlantis".into());
        let by_coords = LocationQuery::Coordinates { lat: 1.0, lon: 2.0 };

        assert_eq!(
            from_fetch(FetchError::NotFound(404), &by_name).user_message(),
            "City not found"
        );
        assert_eq!(
            from_fetch(FetchError::NotFound(404), &by_coords).user_message(),
            "Location not found"
        );
        assert_eq!(not_found_text(&by_name), "City not found");
        assert_eq!(not_found_text(&by_coords), "Location not found");
    }

    #[test]
    fn test_transport_and_parse_map_to_network() {
        let q = LocationQuery::CityName("Paris".into());

        let err = from_fetch(FetchError::Transport("refused".into()), &q);
        assert!(matches!(err, AppError::Network(NetworkError::ConnectionFailed(_))));
        assert_eq!(
            err.user_message(),
            "Unable to connect. Check your internet connection."
        );

        let err = from_fetch(FetchError::Parse("eof".into()), &q);
        assert!(matches!(err, AppError::Network(NetworkError::InvalidResponse(_))));
    }

    #[test]
    fn test_unauthorized_is_key_problem() {
        let q = LocationQuery::CityName("Paris".into());
        let err = from_fetch(FetchError::NotFound(401), &q);
        assert!(matches!(err, AppError::Weather(WeatherError::InvalidApiKey)));
    }
}
