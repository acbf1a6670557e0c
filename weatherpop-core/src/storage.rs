//! Two key/value backends and the front-end that merges them.
//!
//! The app-scoped backend (platform data dir) is preferred; the temp-dir
//! fallback covers hosts where no platform dir resolves. Which backend is
//! active is re-evaluated on every call, never cached.

use anyhow::{Context, Result};
use async_trait::async_trait;
use directories::ProjectDirs;
use std::path::PathBuf;
use tokio::fs;

/// Key for the single-slot weather result cache.
pub const KEY_LAST_WEATHER: &str = "lastWeatherData";
/// Key for the persisted units preference.
pub const KEY_UNITS: &str = "weatherUnits";
/// Key for the last searched city.
pub const KEY_LAST_CITY: &str = "lastCity";

#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Whether the backend can be used right now.
    fn available(&self) -> bool;

    /// Read the raw value for a key; `None` when the key was never written.
    async fn read(&self, key: &str) -> Result<Option<String>>;

    async fn write(&self, key: &str, value: &str) -> Result<()>;
}

/// One JSON file per key under a root directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: Option<PathBuf>,
    label: &'static str,
}

impl FileStore {
    /// Backend under the platform data directory. Unavailable when the
    /// platform dir cannot be resolved.
    pub fn app_scoped() -> Self {
        let root = ProjectDirs::from("dev", "weatherpop", "weatherpop")
            .map(|dirs| dirs.data_dir().to_path_buf());
        Self { root, label: "app" }
    }

    /// Fallback backend under the system temp directory.
    pub fn fallback() -> Self {
        Self {
            root: Some(std::env::temp_dir().join("weatherpop")),
            label: "fallback",
        }
    }

    /// Backend rooted at an explicit directory.
    pub fn at(root: PathBuf) -> Self {
        Self {
            root: Some(root),
            label: "custom",
        }
    }

    fn key_path(&self, key: &str) -> Result<PathBuf> {
        let root = self
            .root
            .as_ref()
            .with_context(|| format!("No root directory for {} storage", self.label))?;
        Ok(root.join(format!("{key}.json")))
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    fn available(&self) -> bool {
        self.root.is_some()
    }

    async fn read(&self, key: &str) -> Result<Option<String>> {
        let path = self.key_path(key)?;
        match fs::read_to_string(&path).await {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("Failed to read {}", path.display())),
        }
    }

    async fn write(&self, key: &str, value: &str) -> Result<()> {
        let path = self.key_path(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create storage dir {}", parent.display()))?;
        }
        fs::write(&path, value)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))
    }
}

/// Merged view over the preferred and fallback backends.
///
/// Failures are logged and swallowed; persistence never blocks the primary
/// flow or surfaces in the UI.
pub struct Storage {
    primary: Box<dyn KeyValueStore>,
    fallback: Box<dyn KeyValueStore>,
}

impl Storage {
    pub fn open() -> Self {
        Self::with_backends(Box::new(FileStore::app_scoped()), Box::new(FileStore::fallback()))
    }

    pub fn with_backends(primary: Box<dyn KeyValueStore>, fallback: Box<dyn KeyValueStore>) -> Self {
        Self { primary, fallback }
    }

    fn backend(&self) -> Option<&dyn KeyValueStore> {
        if self.primary.available() {
            Some(self.primary.as_ref())
        } else if self.fallback.available() {
            Some(self.fallback.as_ref())
        } else {
            None
        }
    }

    pub async fn read(&self, key: &str) -> Option<String> {
        let Some(backend) = self.backend() else {
            tracing::warn!(key, "no storage backend available");
            return None;
        };
        match backend.read(key).await {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key, error = %e, "storage read failed");
                None
            }
        }
    }

    /// Fire-and-forget write.
    pub async fn write(&self, key: &str, value: &str) {
        let Some(backend) = self.backend() else {
            tracing::warn!(key, "no storage backend available");
            return;
        };
        if let Err(e) = backend.write(key, value).await {
            tracing::warn!(key, error = %e, "storage write failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[tokio::test]
    async fn file_store_round_trips_a_value() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::at(dir.path().join("kv"));
        store.write("lastCity", "\"Kyiv\"").await.unwrap();
        assert_eq!(store.read("lastCity").await.unwrap(), Some("\"Kyiv\"".to_string()));
    }

    #[tokio::test]
    async fn missing_key_reads_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::at(dir.path().to_path_buf());
        assert_eq!(store.read("weatherUnits").await.unwrap(), None);
    }

    #[tokio::test]
    async fn writes_land_in_the_preferred_backend() {
        let dir = tempfile::tempdir().unwrap();
        let primary_root = dir.path().join("primary");
        let fallback_root = dir.path().join("fallback");
        let storage = Storage::with_backends(
            Box::new(FileStore::at(primary_root.clone())),
            Box::new(FileStore::at(fallback_root.clone())),
        );

        storage.write(KEY_LAST_CITY, "\"Lviv\"").await;

        assert!(primary_root.join("lastCity.json").exists());
        assert!(!fallback_root.join("lastCity.json").exists());
        assert_eq!(storage.read(KEY_LAST_CITY).await, Some("\"Lviv\"".to_string()));
    }

    /// Backend whose availability can be flipped between calls.
    #[derive(Debug)]
    struct SwitchableStore {
        inner: FileStore,
        on: AtomicBool,
    }

    #[async_trait]
    impl KeyValueStore for SwitchableStore {
        fn available(&self) -> bool {
            self.on.load(Ordering::SeqCst)
        }
        async fn read(&self, key: &str) -> Result<Option<String>> {
            self.inner.read(key).await
        }
        async fn write(&self, key: &str, value: &str) -> Result<()> {
            self.inner.write(key, value).await
        }
    }

    #[tokio::test]
    async fn backend_choice_is_re_evaluated_on_every_call() {
        let dir = tempfile::tempdir().unwrap();
        let primary_root = dir.path().join("primary");
        let fallback_root = dir.path().join("fallback");

        let primary = SwitchableStore {
            inner: FileStore::at(primary_root.clone()),
            on: AtomicBool::new(false),
        };
        // Leak a handle to flip availability after Storage takes ownership.
        let primary: &'static SwitchableStore = Box::leak(Box::new(primary));

        struct Borrowed(&'static SwitchableStore);
        #[async_trait]
        impl KeyValueStore for Borrowed {
            fn available(&self) -> bool {
                self.0.available()
            }
            async fn read(&self, key: &str) -> Result<Option<String>> {
                self.0.read(key).await
            }
            async fn write(&self, key: &str, value: &str) -> Result<()> {
                self.0.write(key, value).await
            }
        }

        let storage = Storage::with_backends(
            Box::new(Borrowed(primary)),
            Box::new(FileStore::at(fallback_root.clone())),
        );

        storage.write(KEY_UNITS, "\"imperial\"").await;
        assert!(fallback_root.join("weatherUnits.json").exists());

        primary.on.store(true, Ordering::SeqCst);
        storage.write(KEY_UNITS, "\"metric\"").await;
        assert!(primary_root.join("weatherUnits.json").exists());
    }

    #[tokio::test]
    async fn unavailable_backends_swallow_the_operation() {
        let storage = Storage::with_backends(
            Box::new(FileStore {
                root: None,
                label: "app",
            }),
            Box::new(FileStore {
                root: None,
                label: "fallback",
            }),
        );
        storage.write(KEY_LAST_CITY, "\"Kyiv\"").await;
        assert_eq!(storage.read(KEY_LAST_CITY).await, None);
    }
}
