//! Device location, approximated from the network address.
//!
//! The lookup is one-shot and time-boxed; a recent fix is reused instead of
//! asking again.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::{error::LocateError, model::Coordinates};

const LOCATE_ENDPOINT: &str = "http://ip-api.com/json";
const LOCATE_TIMEOUT: Duration = Duration::from_secs(10);

/// A fix younger than this is served from memory without a new lookup.
const FIX_MAX_AGE: Duration = Duration::from_secs(5 * 60);

#[async_trait]
pub trait LocationProvider: Send + Sync + std::fmt::Debug {
    async fn locate(&self) -> Result<Coordinates, LocateError>;
}

#[derive(Debug)]
pub struct IpLocationProvider {
    // None when the HTTP client could not be built; locate() then
    // short-circuits with Unsupported.
    http: Option<Client>,
    endpoint: String,
    last_fix: Mutex<Option<(Instant, Coordinates)>>,
}

impl IpLocationProvider {
    pub fn new() -> Self {
        Self::with_endpoint(LOCATE_ENDPOINT.to_string())
    }

    pub fn with_endpoint(endpoint: String) -> Self {
        let http = Client::builder().timeout(LOCATE_TIMEOUT).build().ok();
        Self {
            http,
            endpoint,
            last_fix: Mutex::new(None),
        }
    }

    fn cached_fix(&self) -> Option<Coordinates> {
        let guard = self.last_fix.lock().ok()?;
        let (at, coords) = (*guard)?;
        (at.elapsed() < FIX_MAX_AGE).then_some(coords)
    }

    fn remember_fix(&self, coords: Coordinates) {
        if let Ok(mut guard) = self.last_fix.lock() {
            *guard = Some((Instant::now(), coords));
        }
    }
}

impl Default for IpLocationProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    status: String,
    #[serde(default)]
    message: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
}

#[async_trait]
impl LocationProvider for IpLocationProvider {
    async fn locate(&self) -> Result<Coordinates, LocateError> {
        let Some(http) = &self.http else {
            return Err(LocateError::Unsupported);
        };

        if let Some(coords) = self.cached_fix() {
            tracing::debug!(lat = coords.lat, lon = coords.lon, "reusing recent location fix");
            return Ok(coords);
        }

        let res = http.get(&self.endpoint).send().await.map_err(|e| {
            if e.is_timeout() {
                LocateError::Timeout
            } else {
                LocateError::PositionUnavailable
            }
        })?;

        let status = res.status();
        if status.as_u16() == 403 {
            return Err(LocateError::PermissionDenied);
        }
        if !status.is_success() {
            return Err(LocateError::PositionUnavailable);
        }

        let body: IpApiResponse = res
            .json()
            .await
            .map_err(|_| LocateError::PositionUnavailable)?;

        if body.status != "success" {
            tracing::debug!(message = ?body.message, "location lookup rejected");
            return Err(LocateError::PositionUnavailable);
        }

        let coords = match (body.lat, body.lon) {
            (Some(lat), Some(lon)) => Coordinates { lat, lon },
            _ => return Err(LocateError::PositionUnavailable),
        };

        self.remember_fix(coords);
        Ok(coords)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fix_body() -> serde_json::Value {
        serde_json::json!({ "status": "success", "lat": 50.45, "lon": 30.52 })
    }

    #[tokio::test]
    async fn successful_lookup_parses_coordinates() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(fix_body()))
            .mount(&server)
            .await;

        let provider = IpLocationProvider::with_endpoint(server.uri());
        let coords = provider.locate().await.unwrap();
        assert_eq!(coords, Coordinates { lat: 50.45, lon: 30.52 });
    }

    #[tokio::test]
    async fn recent_fix_is_reused_without_a_second_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(fix_body()))
            .expect(1)
            .mount(&server)
            .await;

        let provider = IpLocationProvider::with_endpoint(server.uri());
        let first = provider.locate().await.unwrap();
        let second = provider.locate().await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn fail_status_maps_to_position_unavailable() {
        let server = MockServer::start().await;
        let body = serde_json::json!({ "status": "fail", "message": "private range" });
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;

        let provider = IpLocationProvider::with_endpoint(server.uri());
        let err = provider.locate().await.unwrap_err();
        assert!(matches!(err, LocateError::PositionUnavailable));
    }

    #[tokio::test]
    async fn forbidden_maps_to_permission_denied() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let provider = IpLocationProvider::with_endpoint(server.uri());
        let err = provider.locate().await.unwrap_err();
        assert!(matches!(err, LocateError::PermissionDenied));
    }

    #[tokio::test]
    async fn unreachable_endpoint_maps_to_position_unavailable() {
        let provider = IpLocationProvider::with_endpoint("http://127.0.0.1:9".to_string());
        let err = provider.locate().await.unwrap_err();
        assert!(matches!(err, LocateError::PositionUnavailable));
    }
}
