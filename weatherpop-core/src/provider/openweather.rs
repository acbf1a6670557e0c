use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;

use crate::{
    error::FetchError,
    model::{Coordinates, QuerySource, Units, WeatherObservation},
};

use super::WeatherProvider;

const WEATHER_URL: &str = "https://api.openweathermap.org/data/2.5/weather";

#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherClient {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, WEATHER_URL.to_string())
    }

    /// Point the client at a different endpoint. Used by tests against a
    /// local mock server.
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            api_key,
            base_url,
            http: Client::new(),
        }
    }

    /// One GET with location params plus `appid` and `units`. No retries and
    /// no request timeout; only the location lookup is time-boxed.
    async fn fetch(
        &self,
        location: &[(&str, String)],
        city_lookup: bool,
        units: Units,
    ) -> Result<OwResponse, FetchError> {
        let res = self
            .http
            .get(&self.base_url)
            .query(location)
            .query(&[("appid", self.api_key.as_str()), ("units", units.as_str())])
            .send()
            .await
            .map_err(FetchError::Network)?;

        let status = res.status();
        if status.is_success() {
            return res.json::<OwResponse>().await.map_err(FetchError::Decode);
        }

        match status.as_u16() {
            401 => Err(FetchError::InvalidCredentials),
            404 if city_lookup => Err(FetchError::CityNotFound),
            code => Err(FetchError::Service(code)),
        }
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherClient {
    async fn by_city(&self, city: &str, units: Units) -> Result<WeatherObservation, FetchError> {
        let raw = self.fetch(&[("q", city.to_string())], true, units).await?;
        Ok(raw.into_observation(QuerySource::City(city.to_string())))
    }

    async fn by_coords(
        &self,
        coords: Coordinates,
        units: Units,
    ) -> Result<WeatherObservation, FetchError> {
        let raw = self
            .fetch(
                &[("lat", coords.lat.to_string()), ("lon", coords.lon.to_string())],
                false,
                units,
            )
            .await?;
        Ok(raw.into_observation(QuerySource::Coords(coords)))
    }
}

// Consumed subset of the response body; other provider fields pass through
// unread.

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize, Default)]
struct OwSys {
    #[serde(default)]
    country: String,
}

#[derive(Debug, Deserialize)]
struct OwResponse {
    name: String,
    #[serde(default)]
    sys: OwSys,
    main: OwMain,
    #[serde(default)]
    weather: Vec<OwWeather>,
    wind: OwWind,
}

impl OwResponse {
    fn into_observation(self, source: QuerySource) -> WeatherObservation {
        let (condition, icon) = self
            .weather
            .into_iter()
            .next()
            .map(|w| (w.description, w.icon))
            .unwrap_or_else(|| ("Unknown".to_string(), String::new()));

        WeatherObservation {
            name: self.name,
            country: self.sys.country,
            temperature: self.main.temp,
            condition,
            icon,
            humidity: self.main.humidity,
            wind_speed: self.wind.speed,
            source,
            fetched_at: Utc::now(),
        }
    }
}
