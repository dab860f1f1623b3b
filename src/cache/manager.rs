//! Cache Manager Module
//!
//! Expiring, size-capped cache layered over the key-value store. Every
//! operation is fail-soft: storage errors are logged and the cache behaves
//! as empty for that call.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use serde::{de::DeserializeOwned, de::IgnoredAny, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::cache::stats::Counters;
use crate::cache::{CacheEntry, CacheMetadata, CacheStats, SWEEP_BATCH};
use crate::clock::Clock;
use crate::storage::{load_json, save_json, KeyValueStore, CACHE_METADATA_KEY, CACHE_PREFIX};

// == Sweep Report ==
/// Outcome of one sweep pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Entries removed because their TTL elapsed
    pub expired: usize,
    /// Entries removed to respect the item cap
    pub evicted: usize,
    /// Undecodable payloads removed
    pub corrupt: usize,
    /// Payloads found without metadata and adopted
    pub adopted: usize,
    /// Metadata records dropped because their payload was gone
    pub orphans_dropped: usize,
}

impl SweepReport {
    pub fn removed(&self) -> usize {
        self.expired + self.evicted + self.corrupt
    }
}

// == Cache Manager ==
/// Generic expiring cache used to memoize remote API responses.
pub struct CacheManager {
    /// Durable backing store
    store: Arc<dyn KeyValueStore>,
    /// Time source for TTL checks
    clock: Arc<dyn Clock>,
    /// Key -> last write time, mirrored to the store
    metadata: Mutex<CacheMetadata>,
    /// Session counters
    counters: Mutex<Counters>,
    /// Maximum number of entries kept after a sweep
    max_items: usize,
}

impl CacheManager {
    // == Constructor ==
    /// Creates a manager, restoring persisted metadata if readable.
    ///
    /// # Arguments
    /// * `store` - Shared key-value store
    /// * `clock` - Time source
    /// * `max_items` - Entry budget enforced by [`CacheManager::sweep`]
    pub async fn load(
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        max_items: usize,
    ) -> Self {
        let metadata: CacheMetadata = load_json(store.as_ref(), CACHE_METADATA_KEY)
            .await
            .unwrap_or_default();

        debug!(entries = metadata.len(), "restored cache metadata");

        Self {
            store,
            clock,
            metadata: Mutex::new(metadata),
            counters: Mutex::new(Counters::default()),
            max_items,
        }
    }

    pub fn max_items(&self) -> usize {
        self.max_items
    }

    // == Set ==
    /// Stores a value under `key` with an optional TTL.
    ///
    /// Overwrites any previous entry and refreshes its write time. Returns
    /// whether the payload reached the store; failures are only logged.
    pub async fn set<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        ttl: Option<Duration>,
    ) -> bool {
        if key.is_empty() {
            warn!("refusing to cache a value under an empty key");
            return false;
        }

        let now = self.clock.now_ms();
        let raw = match serde_json::to_string(&CacheEntry::new(value, now, ttl)) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(key, error = %e, "failed to encode cache entry");
                return false;
            }
        };

        let mut metadata = self.metadata.lock().await;
        if let Err(e) = self.store.set(&payload_key(key), raw).await {
            warn!(key, error = %e, "failed to write cache entry");
            return false;
        }

        metadata.record(key, now);
        self.persist_metadata(&metadata).await;
        debug!(key, ?ttl, "cached value");
        true
    }

    // == Get ==
    /// Retrieves a live value.
    ///
    /// Expired entries are deleted on read and reported as absent, whether
    /// or not a sweep has run. Undecodable entries are deleted as well.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.store.get(&payload_key(key)).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                self.counters.lock().await.record_miss();
                debug!(key, "cache miss");
                return None;
            }
            Err(e) => {
                warn!(key, error = %e, "failed to read cache entry");
                self.counters.lock().await.record_miss();
                return None;
            }
        };

        let entry: CacheEntry<T> = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                warn!(key, error = %e, "discarding undecodable cache entry");
                self.remove_if_unchanged(key, &raw).await;
                self.counters.lock().await.record_miss();
                return None;
            }
        };

        if entry.is_expired_at(self.clock.now_ms()) {
            debug!(key, "cache entry expired");
            let removed = self.remove_if_unchanged(key, &raw).await;
            let mut counters = self.counters.lock().await;
            counters.record_miss();
            if removed {
                counters.record_evictions(1);
            }
            return None;
        }

        self.counters.lock().await.record_hit();
        debug!(key, "cache hit");
        Some(entry.value)
    }

    /// True if a live entry exists for `key`.
    pub async fn contains(&self, key: &str) -> bool {
        self.get::<IgnoredAny>(key).await.is_some()
    }

    // == Remove ==
    /// Deletes one entry and its metadata.
    pub async fn remove(&self, key: &str) {
        let mut metadata = self.metadata.lock().await;
        self.remove_locked(&mut metadata, key).await;
    }

    /// Deletes `key` only if its payload still equals `seen`.
    ///
    /// `set` writes under the metadata lock, so re-reading under the same
    /// lock tells whether a newer value landed since `seen` was read.
    async fn remove_if_unchanged(&self, key: &str, seen: &str) -> bool {
        let mut metadata = self.metadata.lock().await;
        match self.store.get(&payload_key(key)).await {
            Ok(Some(current)) if current == seen => {
                self.remove_locked(&mut metadata, key).await;
                true
            }
            Ok(_) => {
                debug!(key, "cache entry rewritten concurrently, keeping it");
                false
            }
            Err(e) => {
                warn!(key, error = %e, "failed to re-read cache entry");
                false
            }
        }
    }

    async fn remove_locked(&self, metadata: &mut CacheMetadata, key: &str) {
        if let Err(e) = self.store.remove(&payload_key(key)).await {
            warn!(key, error = %e, "failed to remove cache entry");
        }
        if metadata.remove(key) {
            self.persist_metadata(metadata).await;
        }
    }

    // == Clear ==
    /// Deletes every cache entry and the metadata map.
    ///
    /// Keys outside the cache namespace are untouched.
    pub async fn clear(&self) {
        let mut metadata = self.metadata.lock().await;

        match self.store.list_keys().await {
            Ok(keys) => {
                let doomed: Vec<String> = keys
                    .into_iter()
                    .filter(|k| k.starts_with(CACHE_PREFIX))
                    .collect();
                if let Err(e) = self.store.multi_remove(&doomed).await {
                    warn!(error = %e, "failed to clear cache entries");
                }
                info!(removed = doomed.len(), "cache cleared");
            }
            Err(e) => warn!(error = %e, "failed to list keys while clearing cache"),
        }

        metadata.clear();
        if let Err(e) = self.store.remove(CACHE_METADATA_KEY).await {
            warn!(error = %e, "failed to remove cache metadata");
        }
    }

    // == Sweep ==
    /// Removes expired and corrupt entries, then evicts the oldest-written
    /// entries until at most `max_items` remain.
    ///
    /// Works entry by entry, releasing the metadata lock and yielding to the
    /// runtime every [`SWEEP_BATCH`] entries so other tasks keep running.
    pub async fn sweep(&self) -> SweepReport {
        let mut report = SweepReport::default();
        let now = self.clock.now_ms();

        let payload_keys: BTreeSet<String> = match self.store.list_keys().await {
            Ok(keys) => keys
                .into_iter()
                .filter_map(|k| k.strip_prefix(CACHE_PREFIX).map(str::to_string))
                .collect(),
            Err(e) => {
                warn!(error = %e, "cache sweep skipped: cannot list keys");
                return report;
            }
        };

        for (i, key) in payload_keys.iter().enumerate() {
            if i > 0 && i % SWEEP_BATCH == 0 {
                tokio::task::yield_now().await;
            }
            self.sweep_one(key, now, &mut report).await;
        }

        self.drop_orphan_metadata(&payload_keys, &mut report).await;
        report.evicted = self.enforce_capacity().await;

        self.counters
            .lock()
            .await
            .record_evictions(report.expired + report.evicted + report.corrupt);
        report
    }

    /// Examines one payload: removes it if expired or corrupt, adopts it if
    /// metadata is missing.
    async fn sweep_one(&self, key: &str, now: i64, report: &mut SweepReport) {
        // Read under the lock so a concurrent `set` cannot be deleted.
        let mut metadata = self.metadata.lock().await;
        let raw = match self.store.get(&payload_key(key)).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return,
            Err(e) => {
                warn!(key, error = %e, "cache sweep: failed to read entry");
                return;
            }
        };

        match serde_json::from_str::<CacheEntry<IgnoredAny>>(&raw) {
            Ok(header) if header.is_expired_at(now) => {
                self.remove_locked(&mut metadata, key).await;
                report.expired += 1;
            }
            Ok(header) => {
                if !metadata.contains(key) {
                    metadata.record(key, header.created_at);
                    self.persist_metadata(&metadata).await;
                    report.adopted += 1;
                }
            }
            Err(e) => {
                warn!(key, error = %e, "cache sweep: removing corrupt entry");
                self.remove_locked(&mut metadata, key).await;
                report.corrupt += 1;
            }
        }
    }

    async fn drop_orphan_metadata(
        &self,
        payload_keys: &BTreeSet<String>,
        report: &mut SweepReport,
    ) {
        let mut metadata = self.metadata.lock().await;
        let candidates: Vec<String> = metadata
            .oldest_first()
            .into_iter()
            .map(|(k, _)| k)
            .filter(|k| !payload_keys.contains(k))
            .collect();

        let mut changed = false;
        for key in candidates {
            // A write may have landed after the key listing.
            if let Ok(Some(_)) = self.store.get(&payload_key(&key)).await {
                continue;
            }
            metadata.remove(&key);
            report.orphans_dropped += 1;
            changed = true;
        }

        if changed {
            self.persist_metadata(&metadata).await;
        }
    }

    /// Evicts oldest-by-write-time entries beyond the cap. Returns the count.
    async fn enforce_capacity(&self) -> usize {
        let mut metadata = self.metadata.lock().await;
        let len = metadata.len();
        if len <= self.max_items {
            return 0;
        }

        let victims: Vec<String> = metadata
            .oldest_first()
            .into_iter()
            .take(len - self.max_items)
            .map(|(k, _)| k)
            .collect();

        let payloads: Vec<String> = victims.iter().map(|k| payload_key(k)).collect();
        if let Err(e) = self.store.multi_remove(&payloads).await {
            warn!(error = %e, "cache sweep: failed to evict entries");
            return 0;
        }

        for key in &victims {
            metadata.remove(key);
        }
        self.persist_metadata(&metadata).await;
        victims.len()
    }

    // == Stats ==
    /// Returns occupancy figures and session counters.
    pub async fn stats(&self) -> CacheStats {
        let metadata = self.metadata.lock().await.clone();

        let mut total_size = 0;
        for (key, _) in metadata.oldest_first() {
            match self.store.get(&payload_key(&key)).await {
                Ok(Some(raw)) => total_size += raw.len(),
                Ok(None) => {}
                Err(e) => warn!(key = %key, error = %e, "stats: failed to read entry"),
            }
        }

        let counters = *self.counters.lock().await;
        CacheStats {
            total_items: metadata.len(),
            total_size,
            oldest_key: metadata.oldest().map(str::to_string),
            newest_key: metadata.newest().map(str::to_string),
            hits: counters.hits,
            misses: counters.misses,
            evictions: counters.evictions,
        }
    }

    async fn persist_metadata(&self, metadata: &CacheMetadata) {
        if let Err(e) = save_json(self.store.as_ref(), CACHE_METADATA_KEY, metadata).await {
            warn!(error = %e, "failed to persist cache metadata");
        }
    }
}

/// Storage key for a cache payload.
fn payload_key(key: &str) -> String {
    format!("{CACHE_PREFIX}{key}")
}
