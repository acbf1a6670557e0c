use crate::{
    error::FetchError,
    model::{Coordinates, Units, WeatherObservation},
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;

pub use openweather::OpenWeatherClient;

/// The two supported lookups against the weather service.
///
/// Object-safe so the controller can hold a boxed provider and tests can
/// substitute a scripted one.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Look up current conditions by city name. The name must be non-empty;
    /// callers trim and gate on that before reaching the provider.
    async fn by_city(&self, city: &str, units: Units) -> Result<WeatherObservation, FetchError>;

    /// Look up current conditions by coordinates.
    async fn by_coords(
        &self,
        coords: Coordinates,
        units: Units,
    ) -> Result<WeatherObservation, FetchError>;
}
