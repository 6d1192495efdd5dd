//! Process-wide settings behind an injectable key-value store.
//!
//! The store holds the active source location, the import-finished
//! flag, and per-playlist last-played lists. Tests substitute
//! [`MemorySettings`]; the app uses [`JsonSettings`] backed by a file
//! in its data directory.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use tracing::warn;

use crate::SourceError;
use crate::locator::SourceLocation;

const ACTIVE_LOCATION_KEY: &str = "active_source_location";
const IMPORT_FINISHED_KEY: &str = "import_finished";

/// Most recently played titles kept per playlist.
const LAST_PLAYED_CAP: usize = 5;

/// String key-value store for process-wide settings.
///
/// `set` is infallible by contract; file-backed implementations log and
/// carry on if a write fails, the same way platform settings APIs do.
pub trait SettingsStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

/// In-memory store for tests.
#[derive(Debug, Default)]
pub struct MemorySettings {
    values: Mutex<HashMap<String, String>>,
}

impl MemorySettings {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemorySettings {
    fn get(&self, key: &str) -> Option<String> {
        self.values.lock().unwrap().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.values
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.values.lock().unwrap().remove(key);
    }
}

/// File-backed store: one JSON object, written through atomically on
/// every mutation.
#[derive(Debug)]
pub struct JsonSettings {
    path: PathBuf,
    values: Mutex<HashMap<String, String>>,
}

impl JsonSettings {
    /// Opens (or initializes) the store at `path`.
    pub fn open(path: PathBuf) -> Result<Self, SourceError> {
        let values = match std::fs::read(&path) {
            Ok(raw) => serde_json::from_slice(&raw)
                .map_err(launchpass_config::ConfigError::Malformed)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            path,
            values: Mutex::new(values),
        })
    }

    fn persist(&self, values: &HashMap<String, String>) {
        let raw = match serde_json::to_vec_pretty(values) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "failed to serialize settings");
                return;
            }
        };

        let tmp = self.path.with_extension("json.tmp");
        let result = std::fs::write(&tmp, raw).and_then(|()| std::fs::rename(&tmp, &self.path));
        if let Err(e) = result {
            warn!(path = %self.path.display(), error = %e, "failed to persist settings");
        }
    }
}

impl SettingsStore for JsonSettings {
    fn get(&self, key: &str) -> Option<String> {
        self.values.lock().unwrap().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        let mut values = self.values.lock().unwrap();
        values.insert(key.to_string(), value.to_string());
        self.persist(&values);
    }

    fn remove(&self, key: &str) {
        let mut values = self.values.lock().unwrap();
        values.remove(key);
        self.persist(&values);
    }
}

/// Typed facade over the raw store.
#[derive(Clone)]
pub struct AppSettings {
    store: Arc<dyn SettingsStore>,
}

impl AppSettings {
    pub fn new(store: Arc<dyn SettingsStore>) -> Self {
        Self { store }
    }

    pub fn active_location(&self) -> SourceLocation {
        self.store
            .get(ACTIVE_LOCATION_KEY)
            .and_then(|v| SourceLocation::parse(&v))
            .unwrap_or(SourceLocation::None)
    }

    pub fn set_active_location(&self, location: SourceLocation) {
        self.store.set(ACTIVE_LOCATION_KEY, location.as_str());
    }

    /// `false` iff an import is in progress or the last one was
    /// interrupted. Absent means no import ever ran, which reads as
    /// finished.
    pub fn import_finished(&self) -> bool {
        self.store
            .get(IMPORT_FINISHED_KEY)
            .map(|v| v == "true")
            .unwrap_or(true)
    }

    pub fn set_import_finished(&self, finished: bool) {
        self.store
            .set(IMPORT_FINISHED_KEY, if finished { "true" } else { "false" });
    }

    /// Recently played game titles for a playlist, most recent first.
    pub fn last_played(&self, playlist: &str) -> Vec<String> {
        self.store
            .get(&last_played_key(playlist))
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default()
    }

    /// Records a title as most recently played for a playlist.
    pub fn push_last_played(&self, playlist: &str, title: &str) {
        let mut titles = self.last_played(playlist);
        titles.retain(|t| t != title);
        titles.insert(0, title.to_string());
        titles.truncate(LAST_PLAYED_CAP);

        match serde_json::to_string(&titles) {
            Ok(raw) => self.store.set(&last_played_key(playlist), &raw),
            Err(e) => warn!(error = %e, "failed to serialize last-played list"),
        }
    }

    pub fn clear_last_played(&self, playlist: &str) {
        self.store.remove(&last_played_key(playlist));
    }
}

fn last_played_key(playlist: &str) -> String {
    format!("last_played_{playlist}")
}
