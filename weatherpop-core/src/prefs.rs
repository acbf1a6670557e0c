//! Persisted popup preferences: the units system and the last searched city.

use std::sync::Arc;

use crate::{
    model::Units,
    storage::{KEY_LAST_CITY, KEY_UNITS, Storage},
};

/// The active measurement system, persisted on every change.
pub struct UnitsPreference {
    storage: Arc<Storage>,
}

impl UnitsPreference {
    pub fn new(storage: Arc<Storage>) -> Self {
        Self { storage }
    }

    /// Stored preference, or metric when absent or unreadable.
    pub async fn load(&self) -> Units {
        let Some(raw) = self.storage.read(KEY_UNITS).await else {
            return Units::default();
        };
        match serde_json::from_str(&raw) {
            Ok(units) => units,
            Err(e) => {
                tracing::warn!(error = %e, "ignoring invalid units preference");
                Units::default()
            }
        }
    }

    pub async fn save(&self, units: Units) {
        match serde_json::to_string(&units) {
            Ok(json) => self.storage.write(KEY_UNITS, &json).await,
            Err(e) => tracing::warn!(error = %e, "failed to encode units preference"),
        }
    }
}

/// The last city searched, written only after a successful city-based fetch
/// and read once at startup to prefill the search field.
pub struct LastQueryStore {
    storage: Arc<Storage>,
}

impl LastQueryStore {
    pub fn new(storage: Arc<Storage>) -> Self {
        Self { storage }
    }

    pub async fn load(&self) -> Option<String> {
        let raw = self.storage.read(KEY_LAST_CITY).await?;
        match serde_json::from_str::<String>(&raw) {
            Ok(city) if !city.trim().is_empty() => Some(city),
            Ok(_) => None,
            Err(e) => {
                tracing::warn!(error = %e, "ignoring invalid last-city value");
                None
            }
        }
    }

    pub async fn save(&self, city: &str) {
        match serde_json::to_string(city) {
            Ok(json) => self.storage.write(KEY_LAST_CITY, &json).await,
            Err(e) => tracing::warn!(error = %e, "failed to encode last city"),
        }
    }
}
