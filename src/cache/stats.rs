//! Cache Statistics Module
//!
//! Snapshot of cache occupancy plus session hit/miss counters.

use serde::Serialize;

// == Cache Stats ==
/// Cache occupancy and performance figures.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    /// Number of tracked cache entries
    pub total_items: usize,
    /// Total size of the stored payloads in bytes
    pub total_size: usize,
    /// Least recently written key
    pub oldest_key: Option<String>,
    /// Most recently written key
    pub newest_key: Option<String>,
    /// Reads that returned a value this session
    pub hits: u64,
    /// Reads that found nothing, an expired entry, or failed
    pub misses: u64,
    /// Entries removed by expiry or the size cap this session
    pub evictions: u64,
}

impl CacheStats {
    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no reads have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

// == Counters ==
/// Running counters kept by the cache manager.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Counters {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

impl Counters {
    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_evictions(&mut self, count: usize) {
        self.evictions += count as u64;
    }
}
