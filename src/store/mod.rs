//! Durable key-value persistence for history and settings.
//!
//! Values are UTF-8 JSON text. Absent or unreadable entries load as
//! "no history" / "no settings", never as an error.

mod file;
mod memory;

pub use file::JsonFileStore;
pub use memory::MemoryStore;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::core::{AppSettings, History};
use crate::utils::CompressorResult;

pub const HISTORY_KEY: &str = "processedImages";
pub const SETTINGS_KEY: &str = "appSettings";

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> CompressorResult<()>;
}

fn load<T: DeserializeOwned>(store: &impl KeyValueStore, key: &str) -> Option<T> {
    let raw = store.get(key)?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Ignoring malformed {}: {}", key, e);
            None
        }
    }
}

fn save<T: Serialize>(store: &impl KeyValueStore, key: &str, value: &T) -> CompressorResult<()> {
    let raw = serde_json::to_string(value)?;
    store.set(key, &raw)
}

pub fn load_history(store: &impl KeyValueStore) -> History {
    load(store, HISTORY_KEY).unwrap_or_default()
}

pub fn save_history(store: &impl KeyValueStore, history: &History) -> CompressorResult<()> {
    save(store, HISTORY_KEY, history)
}

pub fn load_settings(store: &impl KeyValueStore) -> Option<AppSettings> {
    load(store, SETTINGS_KEY)
}

pub fn save_settings(store: &impl KeyValueStore, settings: &AppSettings) -> CompressorResult<()> {
    save(store, SETTINGS_KEY, settings)
}
