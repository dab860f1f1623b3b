//! Cache Metadata Module
//!
//! Tracks the last write time of every cache key so the sweep can evict
//! least-recently-written entries without decoding payloads.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

// == Cache Metadata ==
/// Mapping from cache key to last-write timestamp (Unix milliseconds).
///
/// Persisted verbatim as a JSON object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CacheMetadata {
    written: HashMap<String, i64>,
}

impl CacheMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    // == Record ==
    /// Marks a key as written at `now_ms`, replacing any earlier timestamp.
    pub fn record(&mut self, key: &str, now_ms: i64) {
        self.written.insert(key.to_string(), now_ms);
    }

    // == Remove ==
    /// Forgets a key. Returns true if it was tracked.
    pub fn remove(&mut self, key: &str) -> bool {
        self.written.remove(key).is_some()
    }

    pub fn clear(&mut self) {
        self.written.clear();
    }

    pub fn written_at(&self, key: &str) -> Option<i64> {
        self.written.get(key).copied()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.written.contains_key(key)
    }

    // == Ordering ==
    /// All tracked keys, oldest write first. Ties break by key.
    pub fn oldest_first(&self) -> Vec<(String, i64)> {
        let mut keys: Vec<(String, i64)> = self
            .written
            .iter()
            .map(|(k, ts)| (k.clone(), *ts))
            .collect();
        keys.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
        keys
    }

    /// The least recently written key.
    pub fn oldest(&self) -> Option<&str> {
        self.written
            .iter()
            .min_by(|a, b| a.1.cmp(b.1).then_with(|| a.0.cmp(b.0)))
            .map(|(k, _)| k.as_str())
    }

    /// The most recently written key.
    pub fn newest(&self) -> Option<&str> {
        self.written
            .iter()
            .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)))
            .map(|(k, _)| k.as_str())
    }

    // == Length ==
    pub fn len(&self) -> usize {
        self.written.len()
    }

    pub fn is_empty(&self) -> bool {
        self.written.is_empty()
    }
}
