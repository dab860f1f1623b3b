//! File-backed key-value store.
//!
//! Keeps the whole key space in one JSON object on disk. Each mutation
//! rewrites the file through a temporary sibling and an atomic rename, so a
//! crash mid-write leaves the previous version intact.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::KeyValueStore;
use crate::error::StorageError;

/// Durable store persisted as a single JSON file.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileStore {
    // == Constructor ==
    /// Opens the store at `path`, creating it lazily on first write.
    ///
    /// Fails if the file exists but cannot be read or decoded.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();

        let entries = match fs::read_to_string(&path).await {
            Ok(raw) if raw.trim().is_empty() => BTreeMap::new(),
            Ok(raw) => serde_json::from_str(&raw)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };

        info!(path = %path.display(), keys = entries.len(), "opened file store");

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    // == Flush ==
    /// Writes a snapshot to disk via temp file + rename.
    async fn flush(&self, snapshot: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let raw = serde_json::to_vec(snapshot)?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, raw).await?;
        fs::rename(&tmp, &self.path).await?;

        debug!(path = %self.path.display(), keys = snapshot.len(), "flushed file store");
        Ok(())
    }

    /// Applies `mutate` to a copy, persists it, then commits it in memory.
    async fn mutate<F>(&self, mutate: F) -> Result<(), StorageError>
    where
        F: FnOnce(&mut BTreeMap<String, String>) -> bool,
    {
        let mut entries = self.entries.lock().await;
        let mut next = entries.clone();
        if !mutate(&mut next) {
            return Ok(());
        }
        self.flush(&next).await?;
        *entries = next;
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        self.mutate(|map| {
            map.insert(key.to_string(), value);
            true
        })
        .await
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.mutate(|map| map.remove(key).is_some()).await
    }

    async fn list_keys(&self) -> Result<Vec<String>, StorageError> {
        Ok(self.entries.lock().await.keys().cloned().collect())
    }

    async fn multi_remove(&self, keys: &[String]) -> Result<(), StorageError> {
        self.mutate(|map| {
            let before = map.len();
            for key in keys {
                map.remove(key);
            }
            map.len() != before
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");

        {
            let store = FileStore::open(&path).await.unwrap();
            store.set("favorites", "[1,2]".to_string()).await.unwrap();
            store.set("theme", "\"dark\"".to_string()).await.unwrap();
            store.remove("theme").await.unwrap();
        }

        let store = FileStore::open(&path).await.unwrap();
        assert_eq!(
            store.get("favorites").await.unwrap(),
            Some("[1,2]".to_string())
        );
        assert_eq!(store.get("theme").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_open_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path().join("nested/none.json"))
            .await
            .unwrap();

        assert!(store.list_keys().await.unwrap().is_empty());

        // First write creates parent directories
        store.set("k", "v".to_string()).await.unwrap();
        assert!(store.path().exists());
    }

    #[tokio::test]
    async fn test_open_corrupt_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, "{broken").unwrap();

        let result = FileStore::open(&path).await;
        assert!(matches!(result, Err(StorageError::Serialization(_))));
    }

    #[tokio::test]
    async fn test_multi_remove_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");

        let store = FileStore::open(&path).await.unwrap();
        for key in ["cache:a", "cache:b", "library:favorites"] {
            store.set(key, "1".to_string()).await.unwrap();
        }
        store
            .multi_remove(&["cache:a".to_string(), "cache:b".to_string()])
            .await
            .unwrap();
        drop(store);

        let store = FileStore::open(&path).await.unwrap();
        assert_eq!(
            store.list_keys().await.unwrap(),
            vec!["library:favorites".to_string()]
        );
    }
}
