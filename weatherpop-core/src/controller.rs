//! The popup state machine.
//!
//! Owns the active units and the current result, orchestrates the provider,
//! location lookup, cache and preference stores, and drives the view. The
//! view always shows exactly one panel; every transition goes through one of
//! the `to_*` methods, which render the new panel and implicitly replace
//! whatever was visible before.

use std::sync::Arc;

use crate::{
    cache::ResultCache,
    location::LocationProvider,
    model::{Coordinates, QuerySource, Units, WeatherObservation},
    prefs::{LastQueryStore, UnitsPreference},
    provider::WeatherProvider,
    storage::Storage,
};

#[derive(Debug, Clone, PartialEq)]
pub enum PopupState {
    Idle,
    Loading,
    Result(WeatherObservation),
    Error(String),
}

/// Rendering seam. Implementations must leave exactly one panel visible
/// after any `show_*` call.
pub trait PopupView {
    fn show_idle(&mut self);
    fn show_loading(&mut self);
    fn show_result(&mut self, data: &WeatherObservation, units: Units);
    fn show_error(&mut self, message: &str);

    /// Replace the text in the search field.
    fn set_input(&mut self, text: &str);

    /// Refresh the units toggle label after a preference change.
    fn set_units_label(&mut self, units: Units);
}

pub struct PopupController<V: PopupView> {
    provider: Box<dyn WeatherProvider>,
    location: Box<dyn LocationProvider>,
    cache: ResultCache,
    units_pref: UnitsPreference,
    last_query: LastQueryStore,
    view: V,
    units: Units,
    state: PopupState,
    input: String,
}

impl<V: PopupView> PopupController<V> {
    pub fn new(
        provider: Box<dyn WeatherProvider>,
        location: Box<dyn LocationProvider>,
        storage: Arc<Storage>,
        view: V,
    ) -> Self {
        Self {
            provider,
            location,
            cache: ResultCache::new(Arc::clone(&storage)),
            units_pref: UnitsPreference::new(Arc::clone(&storage)),
            last_query: LastQueryStore::new(storage),
            view,
            units: Units::default(),
            state: PopupState::Idle,
            input: String::new(),
        }
    }

    pub fn state(&self) -> &PopupState {
        &self.state
    }

    pub fn units(&self) -> Units {
        self.units
    }

    /// Current contents of the search field.
    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    /// Session init: restore the units preference, then show the cached
    /// result if still fresh, else prefill the field with the last searched
    /// city and stay idle.
    pub async fn startup(&mut self) {
        self.units = self.units_pref.load().await;
        self.view.set_units_label(self.units);

        if let Some(entry) = self.cache.load_if_fresh().await {
            self.input = entry.data.name.clone();
            self.view.set_input(&self.input);
            // A cached result renders with the units it was fetched under.
            self.to_result(entry.data, entry.units);
            return;
        }

        if let Some(city) = self.last_query.load().await {
            self.input = city;
            self.view.set_input(&self.input);
        }
        self.to_idle();
    }

    /// Empty or whitespace-only input is a no-op: state and panel unchanged.
    pub async fn submit_city(&mut self, text: &str) {
        let city = text.trim();
        if city.is_empty() {
            return;
        }
        self.input = city.to_string();
        let city = city.to_string();
        self.to_loading();
        self.run_city_query(city).await;
    }

    pub async fn use_current_location(&mut self) {
        self.to_loading();
        match self.location.locate().await {
            Ok(coords) => self.run_coords_query(coords).await,
            Err(e) => self.to_error(e.to_string()),
        }
    }

    /// Flip and persist the units preference. If a result is on screen, the
    /// same query is re-issued under the new units: by its coordinates when
    /// it was coordinate-sourced, else by the text currently in the field.
    pub async fn toggle_units(&mut self) {
        self.units = self.units.toggled();
        self.units_pref.save(self.units).await;
        self.view.set_units_label(self.units);

        let refetch = match &self.state {
            PopupState::Result(data) => match &data.source {
                QuerySource::Coords(coords) => Some(QuerySource::Coords(*coords)),
                QuerySource::City(_) => {
                    let text = self.input.trim().to_string();
                    (!text.is_empty()).then_some(QuerySource::City(text))
                }
            },
            _ => None,
        };

        match refetch {
            Some(QuerySource::Coords(coords)) => {
                self.to_loading();
                self.run_coords_query(coords).await;
            }
            Some(QuerySource::City(city)) => {
                self.to_loading();
                self.run_city_query(city).await;
            }
            None => {}
        }
    }

    async fn run_city_query(&mut self, city: String) {
        tracing::debug!(%city, units = %self.units, "city lookup");
        match self.provider.by_city(&city, self.units).await {
            Ok(data) => self.finish_success(data).await,
            Err(e) => self.to_error(e.to_string()),
        }
    }

    async fn run_coords_query(&mut self, coords: Coordinates) {
        tracing::debug!(lat = coords.lat, lon = coords.lon, units = %self.units, "coords lookup");
        match self.provider.by_coords(coords, self.units).await {
            Ok(data) => self.finish_success(data).await,
            Err(e) => self.to_error(e.to_string()),
        }
    }

    async fn finish_success(&mut self, data: WeatherObservation) {
        self.cache.save(&data, self.units).await;
        match &data.source {
            QuerySource::City(city) => self.last_query.save(city).await,
            QuerySource::Coords(_) => {
                // Coordinate lookups resolve to a city name; reflect it in
                // the field so a later toggle can re-search by text.
                self.input = data.name.clone();
                self.view.set_input(&self.input);
            }
        }
        let units = self.units;
        self.to_result(data, units);
    }

    fn to_idle(&mut self) {
        self.view.show_idle();
        self.state = PopupState::Idle;
    }

    fn to_loading(&mut self) {
        self.view.show_loading();
        self.state = PopupState::Loading;
    }

    fn to_result(&mut self, data: WeatherObservation, units: Units) {
        self.view.show_result(&data, units);
        self.state = PopupState::Result(data);
    }

    fn to_error(&mut self, message: String) {
        self.view.show_error(&message);
        self.state = PopupState::Error(message);
    }
}
