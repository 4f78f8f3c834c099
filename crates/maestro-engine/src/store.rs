//! Persisted settings.
//!
//! Settings are a flat JSON object. The coordinator owns every write; agents
//! never persist anything.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tracing::{debug, warn};

use maestro_ipc::{Bounds, DEFAULT_FULL_PLAYER_BOUNDS, DEFAULT_MINI_PLAYER_BOUNDS};

use crate::error::StoreError;
use crate::StoreResult;

/// Key holding the id of the last selected broadcaster.
pub const LAST_BROADCASTER_KEY: &str = "lastBroadcaster";

/// Bounds key prefix used for the mini player, shared by all broadcasters.
pub const MINI_MODE_BOUNDS_ID: &str = "_mini_mode";

/// A key/value settings store.
pub trait SettingsStore: Send {
    fn get(&self, key: &str) -> Option<Value>;

    fn set(&mut self, key: &str, value: Value) -> StoreResult<()>;
}

/// Returns the settings key for window bounds.
///
/// The full player keeps bounds per broadcaster; the mini player has one
/// shared entry.
pub fn bounds_key(mini: bool, broadcaster_id: &str) -> String {
    let id = if mini {
        MINI_MODE_BOUNDS_ID
    } else {
        broadcaster_id
    };
    format!("{id}.bounds")
}

/// Returns the stored bounds for a window, falling back to the defaults when
/// nothing (or something unreadable) is stored.
pub fn stored_bounds(store: &dyn SettingsStore, mini: bool, broadcaster_id: &str) -> Bounds {
    let key = bounds_key(mini, broadcaster_id);
    let stored = store
        .get(&key)
        .and_then(|value| match serde_json::from_value(value) {
            Ok(bounds) => Some(bounds),
            Err(e) => {
                warn!(%key, "Ignoring stored bounds: {}", e);
                None
            }
        });

    let bounds = stored.unwrap_or(if mini {
        DEFAULT_MINI_PLAYER_BOUNDS
    } else {
        DEFAULT_FULL_PLAYER_BOUNDS
    });
    debug!(%key, ?bounds, "Returning bounds");
    bounds
}

/// A store that lives only as long as the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Map<String, Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemoryStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: Value) -> StoreResult<()> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }
}

/// A store backed by a JSON file, rewritten on every `set`.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    values: Map<String, Value>,
}

impl JsonFileStore {
    /// Open the store at `path`. A missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        let values = match fs::read_to_string(&path) {
            Ok(contents) if contents.trim().is_empty() => Map::new(),
            Ok(contents) => serde_json::from_str(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Map::new(),
            Err(e) => return Err(e.into()),
        };

        debug!(path = %path.display(), entries = values.len(), "Settings loaded");
        Ok(Self { path, values })
    }

    /// `<config dir>/maestro/settings.json`.
    pub fn default_path() -> StoreResult<PathBuf> {
        let dir = dirs::config_dir().ok_or(StoreError::NoConfigDir)?;
        Ok(dir.join("maestro").join("settings.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self) -> StoreResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(&self.values)?;
        fs::write(&self.path, contents)?;
        Ok(())
    }
}

impl SettingsStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: Value) -> StoreResult<()> {
        self.values.insert(key.to_string(), value);
        self.save()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_bounds_key() {
        assert_eq!(bounds_key(false, "siriusxm"), "siriusxm.bounds");
        assert_eq!(bounds_key(true, "siriusxm"), "_mini_mode.bounds");
    }

    #[test]
    fn test_stored_bounds_defaults() {
        let store = MemoryStore::new();
        assert_eq!(
            stored_bounds(&store, false, "siriusxm"),
            DEFAULT_FULL_PLAYER_BOUNDS
        );
        assert_eq!(
            stored_bounds(&store, true, "siriusxm"),
            DEFAULT_MINI_PLAYER_BOUNDS
        );
    }

    #[test]
    fn test_stored_bounds_round_trip() {
        let mut store = MemoryStore::new();
        let bounds = Bounds {
            x: 10,
            y: 20,
            width: 800,
            height: 600,
        };
        store
            .set("tunein-radio.bounds", serde_json::to_value(bounds).unwrap())
            .unwrap();
        store
            .set("_mini_mode.bounds", json!({ "x": "left" }))
            .unwrap();

        assert_eq!(stored_bounds(&store, false, "tunein-radio"), bounds);
        assert_eq!(
            stored_bounds(&store, false, "siriusxm"),
            DEFAULT_FULL_PLAYER_BOUNDS
        );
        // Malformed entries fall back.
        assert_eq!(
            stored_bounds(&store, true, "tunein-radio"),
            DEFAULT_MINI_PLAYER_BOUNDS
        );
    }

    #[test]
    fn test_json_file_store_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("maestro").join("settings.json");

        let mut store = JsonFileStore::open(&path).unwrap();
        assert_eq!(store.get(LAST_BROADCASTER_KEY), None);
        store
            .set(LAST_BROADCASTER_KEY, json!("youtube-music"))
            .unwrap();

        let reopened = JsonFileStore::open(&path).unwrap();
        assert_eq!(
            reopened.get(LAST_BROADCASTER_KEY),
            Some(json!("youtube-music"))
        );
    }

    #[test]
    fn test_json_file_store_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();

        assert!(matches!(
            JsonFileStore::open(&path),
            Err(StoreError::Json(_))
        ));
    }
}
