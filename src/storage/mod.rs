//! Storage Module
//!
//! The durable key-value store every other component persists through,
//! plus JSON helpers shared by the cache and the library.

mod file;
mod memory;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use tracing::warn;

use crate::error::StorageError;

pub use file::FileStore;
pub use memory::MemoryStore;

// == Key Namespaces ==
/// Prefix of every cache payload key.
pub const CACHE_PREFIX: &str = "cache:";
/// Key of the cache metadata map (outside the payload prefix).
pub const CACHE_METADATA_KEY: &str = "meta:cache";
pub const FAVORITES_KEY: &str = "library:favorites";
pub const RECENTLY_VIEWED_KEY: &str = "library:recently_viewed";
pub const SEARCH_HISTORY_KEY: &str = "prefs:search_history";
pub const THEME_MODE_KEY: &str = "prefs:theme_mode";

// == Key-Value Store Trait ==
/// String-keyed store of string values.
///
/// Every operation may suspend and may fail with a [`StorageError`].
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Returns the raw value, or `None` if the key is absent.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Stores a value, replacing any previous one.
    async fn set(&self, key: &str, value: String) -> Result<(), StorageError>;

    /// Deletes a key. Absent keys are not an error.
    async fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// Lists every key currently stored.
    async fn list_keys(&self) -> Result<Vec<String>, StorageError>;

    /// Deletes several keys in one operation.
    async fn multi_remove(&self, keys: &[String]) -> Result<(), StorageError>;
}

// == JSON Helpers ==
/// Reads and decodes a JSON value, treating any failure as absent.
pub async fn load_json<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    let raw = match store.get(key).await {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            warn!(key, error = %e, "failed to read persisted value");
            return None;
        }
    };

    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(key, error = %e, "discarding undecodable persisted value");
            None
        }
    }
}

/// Encodes a value as JSON and writes it.
pub async fn save_json<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let raw = serde_json::to_string(value)?;
    store.set(key, raw).await
}
