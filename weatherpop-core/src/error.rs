use thiserror::Error;

/// Failures terminating a weather lookup. Each variant renders as the
/// message shown in the error panel; none are retried.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Invalid API key. Please check your OpenWeatherMap API key.")]
    InvalidCredentials,

    #[error("City not found. Please check the spelling and try again.")]
    CityNotFound,

    #[error("Weather service error: {0}")]
    Service(u16),

    #[error("Network error. Please check your internet connection.")]
    Network(#[source] reqwest::Error),

    #[error("Error fetching weather data. Please try again.")]
    Decode(#[source] reqwest::Error),
}

/// Failures from the location lookup.
#[derive(Debug, Error)]
pub enum LocateError {
    #[error("Location access denied. Please enable location services and try again.")]
    PermissionDenied,

    #[error("Location information unavailable. Please enter a city name.")]
    PositionUnavailable,

    #[error("Location request timed out. Please try again or enter a city name.")]
    Timeout,

    #[error("Location lookup is not supported on this device.")]
    Unsupported,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credentials_and_not_found_messages_are_distinct() {
        assert_ne!(
            FetchError::InvalidCredentials.to_string(),
            FetchError::CityNotFound.to_string()
        );
    }

    #[test]
    fn service_error_includes_status() {
        assert_eq!(FetchError::Service(503).to_string(), "Weather service error: 503");
    }

    #[test]
    fn locate_messages_are_actionable() {
        assert!(LocateError::PermissionDenied.to_string().contains("enable location"));
        assert!(LocateError::Timeout.to_string().contains("try again"));
        assert!(LocateError::PositionUnavailable.to_string().contains("city name"));
    }
}
