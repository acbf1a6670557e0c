//! Core library for the `weatherpop` popup.
//!
//! This crate defines:
//! - The popup controller state machine and its view seam
//! - The OpenWeatherMap client and the location lookup
//! - Persistence: result cache, units preference, last searched city
//!
//! It is used by `weatherpop-cli`, but can also be reused by other shells.

pub mod cache;
pub mod config;
pub mod controller;
pub mod error;
pub mod location;
pub mod model;
pub mod prefs;
pub mod provider;
pub mod storage;

pub use cache::{CacheEntry, ResultCache};
pub use config::Config;
pub use controller::{PopupController, PopupState, PopupView};
pub use error::{FetchError, LocateError};
pub use location::{IpLocationProvider, LocationProvider};
pub use model::{Coordinates, QuerySource, Units, WeatherObservation, icon_url};
pub use prefs::{LastQueryStore, UnitsPreference};
pub use provider::{OpenWeatherClient, WeatherProvider};
pub use storage::{FileStore, KeyValueStore, Storage};
