//! Settings Store Implementation

use crate::{SettingsKey, StorageError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};

/// JSON-file backed settings.
///
/// The document is read once on open and written back in full on every
/// change. Reads never fail: absent or malformed entries give defaults.
pub struct SettingsStore {
    path: PathBuf,
    document: Mutex<Map<String, Value>>,
}

impl SettingsStore {
    /// Open the store at `path`, creating nothing until the first write
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let document = match std::fs::read_to_string(&path) {
            Ok(text) => match serde_json::from_str::<Map<String, Value>>(&text) {
                Ok(map) => {
                    info!("Loaded {} settings entries from {}", map.len(), path.display());
                    map
                }
                Err(e) => {
                    warn!("Corrupt settings file {}: {}, using defaults", path.display(), e);
                    Map::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No settings file at {}, using defaults", path.display());
                Map::new()
            }
            Err(e) => {
                warn!("Failed to read settings {}: {}, using defaults", path.display(), e);
                Map::new()
            }
        };

        Self {
            path,
            document: Mutex::new(document),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn document(&self) -> Result<MutexGuard<'_, Map<String, Value>>, StorageError> {
        self.document
            .lock()
            .map_err(|e| StorageError::Lock(e.to_string()))
    }

    /// Stored value for `key`, or its default when absent or malformed
    pub fn get(&self, key: SettingsKey) -> Value {
        match self.document() {
            Ok(doc) => effective(&doc, key),
            Err(_) => key.default_value(),
        }
    }

    /// Typed read; falls back to `T::default()` when the entry does not parse
    pub fn get_as<T: DeserializeOwned + Default>(&self, key: SettingsKey) -> T {
        serde_json::from_value(self.get(key)).unwrap_or_default()
    }

    /// Every key with its effective value
    pub fn all(&self) -> Map<String, Value> {
        SettingsKey::ALL
            .into_iter()
            .map(|k| (k.as_str().to_string(), self.get(k)))
            .collect()
    }

    /// Replace the value for `key` and persist the document.
    ///
    /// On error the in-memory document and the file are both unchanged.
    pub fn set(&self, key: SettingsKey, value: Value) -> Result<(), StorageError> {
        key.validate(&value)?;

        let mut doc = self.document()?;
        self.commit(&mut doc, key, value)
    }

    /// Read-modify-write of one entry under a single lock
    pub fn update<T, F>(&self, key: SettingsKey, f: F) -> Result<T, StorageError>
    where
        T: Serialize + DeserializeOwned + Default,
        F: FnOnce(T) -> T,
    {
        let mut doc = self.document()?;
        let current: T = serde_json::from_value(effective(&doc, key)).unwrap_or_default();
        let next = f(current);

        let value = serde_json::to_value(&next)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;
        key.validate(&value)?;
        self.commit(&mut doc, key, value)?;
        Ok(next)
    }

    fn commit(
        &self,
        doc: &mut Map<String, Value>,
        key: SettingsKey,
        value: Value,
    ) -> Result<(), StorageError> {
        let mut next = doc.clone();
        next.insert(key.as_str().to_string(), value);
        self.write(&next)?;

        *doc = next;
        debug!("Saved {}", key.as_str());
        Ok(())
    }

    /// Write to a sibling temp file and rename it over the target
    fn write(&self, doc: &Map<String, Value>) -> Result<(), StorageError> {
        let text = serde_json::to_string_pretty(doc)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let tmp = self.temp_path();
        std::fs::write(&tmp, text)?;
        if let Err(e) = std::fs::rename(&tmp, &self.path) {
            warn!("Failed to replace {}: {}", self.path.display(), e);
            let _ = std::fs::remove_file(&tmp);
            return Err(e.into());
        }
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".tmp");
        PathBuf::from(name)
    }
}

fn effective(doc: &Map<String, Value>, key: SettingsKey) -> Value {
    match doc.get(key.as_str()) {
        Some(value) if key.validate(value).is_ok() => value.clone(),
        Some(_) => {
            warn!("Malformed value for {}, using default", key.as_str());
            key.default_value()
        }
        None => key.default_value(),
    }
}
