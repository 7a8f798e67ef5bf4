use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use super::KeyValueStore;
use crate::utils::{CompressorError, CompressorResult};

/// Store backed by one pretty-printed JSON object on disk.
///
/// The file is read once on open and rewritten on every `set`.
pub struct JsonFileStore {
    path: PathBuf,
    entries: Mutex<Map<String, Value>>,
}

impl JsonFileStore {
    /// Opens the store at `path`.
    ///
    /// A missing file starts empty; an unreadable or malformed one is
    /// logged and also starts empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<Map<String, Value>>(&content) {
                Ok(entries) => {
                    info!("Loaded store {:?} ({} keys)", path, entries.len());
                    entries
                }
                Err(e) => {
                    warn!("Store file {:?} is malformed, starting empty: {}", path, e);
                    Map::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("Store file {:?} does not exist yet", path);
                Map::new()
            }
            Err(e) => {
                warn!("Cannot read store file {:?}, starting empty: {}", path, e);
                Map::new()
            }
        };

        Self {
            path,
            entries: Mutex::new(entries),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn entries(&self) -> MutexGuard<'_, Map<String, Value>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn flush(&self, entries: &Map<String, Value>) -> CompressorResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .map_err(|e| CompressorError::persistence(format!("Cannot create {:?}: {}", parent, e)))?;
            }
        }
        let content = serde_json::to_string_pretty(entries)?;
        fs::write(&self.path, content)
            .map_err(|e| CompressorError::persistence(format!("Cannot write {:?}: {}", self.path, e)))
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        match self.entries().get(key)? {
            Value::String(raw) => Some(raw.clone()),
            other => Some(other.to_string()),
        }
    }

    fn set(&self, key: &str, value: &str) -> CompressorResult<()> {
        // objects and arrays stay structured in the file; anything else is kept verbatim
        let value = match serde_json::from_str::<Value>(value) {
            Ok(parsed @ (Value::Object(_) | Value::Array(_))) => parsed,
            Ok(_) | Err(_) => Value::String(value.to_string()),
        };
        let mut entries = self.entries();
        let mut updated = entries.clone();
        updated.insert(key.to_string(), value);
        self.flush(&updated)?;
        *entries = updated;
        debug!("Stored {} in {:?}", key, self.path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::AppSettings;
    use crate::store::{load_settings, save_settings};
    use tempfile::tempdir;

    #[test]
    fn values_survive_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("store.json");

        let store = JsonFileStore::open(&path);
        let mut settings = AppSettings::default();
        settings.compression.default_quality = 33;
        save_settings(&store, &settings).unwrap();
        store.set("note", "plain text").unwrap();

        let reopened = JsonFileStore::open(&path);
        assert_eq!(load_settings(&reopened), Some(settings));
        assert_eq!(reopened.get("note").as_deref(), Some("plain text"));

        let raw: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["appSettings"]["compression"]["defaultQuality"], 33);
    }

    #[test]
    fn corrupt_file_starts_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.json");
        fs::write(&path, "{{{ definitely not json").unwrap();

        let store = JsonFileStore::open(&path);
        assert!(store.get("appSettings").is_none());
        store.set("appSettings", "{}").unwrap();
        assert_eq!(JsonFileStore::open(&path).get("appSettings").as_deref(), Some("{}"));
    }

    #[test]
    fn scalar_json_text_comes_back_verbatim() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.json");
        let store = JsonFileStore::open(&path);
        store.set("quoted", "\"x\"").unwrap();
        store.set("count", "5").unwrap();

        assert_eq!(store.get("quoted").as_deref(), Some("\"x\""));
        let reopened = JsonFileStore::open(&path);
        assert_eq!(reopened.get("quoted").as_deref(), Some("\"x\""));
        assert_eq!(reopened.get("count").as_deref(), Some("5"));
    }

    #[test]
    fn failed_write_leaves_memory_untouched() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "file, not a directory").unwrap();

        let store = JsonFileStore::open(blocker.join("store.json"));
        assert!(store.set("processedImages", "[]").is_err());
        assert!(store.get("processedImages").is_none());
    }

    #[test]
    fn missing_file_is_created_on_first_write() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.json");
        let store = JsonFileStore::open(&path);
        assert!(!path.exists());
        store.set("processedImages", "[]").unwrap();
        assert!(path.exists());
    }
}
