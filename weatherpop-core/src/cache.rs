//! Single-slot cache for the last successful weather result.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{
    model::{Units, WeatherObservation},
    storage::{KEY_LAST_WEATHER, Storage},
};

const FRESHNESS_WINDOW_SECS: i64 = 10 * 60;

/// A cached result plus the units it was fetched with and when it was saved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub data: WeatherObservation,
    pub units: Units,
    pub saved_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn is_fresh_at(&self, now: DateTime<Utc>) -> bool {
        now - self.saved_at < Duration::seconds(FRESHNESS_WINDOW_SECS)
    }
}

pub struct ResultCache {
    storage: Arc<Storage>,
}

impl ResultCache {
    pub fn new(storage: Arc<Storage>) -> Self {
        Self { storage }
    }

    /// Overwrite the slot with a fresh entry. Failures are logged by the
    /// storage layer and do not affect the caller.
    pub async fn save(&self, data: &WeatherObservation, units: Units) {
        let entry = CacheEntry {
            data: data.clone(),
            units,
            saved_at: Utc::now(),
        };
        match serde_json::to_string(&entry) {
            Ok(json) => self.storage.write(KEY_LAST_WEATHER, &json).await,
            Err(e) => tracing::warn!(error = %e, "failed to encode cache entry"),
        }
    }

    /// The stored entry, only while younger than the freshness window.
    /// A stale entry is ignored in place, not deleted.
    pub async fn load_if_fresh(&self) -> Option<CacheEntry> {
        self.load_if_fresh_at(Utc::now()).await
    }

    async fn load_if_fresh_at(&self, now: DateTime<Utc>) -> Option<CacheEntry> {
        let raw = self.storage.read(KEY_LAST_WEATHER).await?;
        let entry: CacheEntry = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(error = %e, "discarding unreadable cache entry");
                return None;
            }
        };
        if entry.is_fresh_at(now) {
            Some(entry)
        } else {
            tracing::debug!(saved_at = %entry.saved_at, "cache entry is stale");
            None
        }
    }
}
