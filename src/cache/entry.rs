//! Cache Entry Module
//!
//! Defines the persisted envelope around every cached payload.

use std::time::Duration;

use serde::{Deserialize, Serialize};

// == Cache Entry ==
/// A cached payload together with its write time and optional TTL.
///
/// Serialized as `{"value": .., "createdAt": <ms>, "ttl": <ms>}`; `ttl` is
/// omitted for entries that never expire by time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry<T> {
    /// The stored value
    pub value: T,
    /// Write timestamp (Unix milliseconds)
    pub created_at: i64,
    /// Time-to-live in milliseconds, None = no expiration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u64>,
}

impl<T> CacheEntry<T> {
    // == Constructor ==
    /// Creates an entry written at `now_ms`.
    ///
    /// # Arguments
    /// * `value` - The value to store
    /// * `now_ms` - Current time in Unix milliseconds
    /// * `ttl` - Optional time-to-live
    pub fn new(value: T, now_ms: i64, ttl: Option<Duration>) -> Self {
        Self {
            value,
            created_at: now_ms,
            ttl: ttl.map(|ttl| u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX)),
        }
    }

    // == Expiration ==
    /// Returns the instant after which the entry is expired, if any.
    pub fn expires_at(&self) -> Option<i64> {
        self.ttl.map(|ttl| self.created_at.saturating_add(ttl_ms(ttl)))
    }

    /// Checks whether the entry has expired at `now_ms`.
    ///
    /// Boundary condition: expired only once strictly more than `ttl` has
    /// elapsed, so an entry read exactly at `created_at + ttl` is still live.
    pub fn is_expired_at(&self, now_ms: i64) -> bool {
        match self.ttl {
            Some(ttl) => now_ms.saturating_sub(self.created_at) > ttl_ms(ttl),
            None => false,
        }
    }

    // == Time To Live ==
    /// Remaining lifetime in milliseconds, or None if the entry never expires.
    ///
    /// # Returns
    /// - `Some(0)` once expired
    /// - `Some(remaining_ms)` while live
    /// - `None` without a TTL
    pub fn ttl_remaining_ms(&self, now_ms: i64) -> Option<u64> {
        self.expires_at()
            .map(|expires| expires.saturating_sub(now_ms).max(0) as u64)
    }
}

/// TTL as signed milliseconds, saturating at `i64::MAX`.
fn ttl_ms(ttl: u64) -> i64 {
    i64::try_from(ttl).unwrap_or(i64::MAX)
}
