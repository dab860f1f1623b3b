//! Cache Module
//!
//! Expiring key-value cache over the durable store, with least-recently-
//! written eviction and category helpers for movie data.

mod entry;
mod manager;
mod metadata;
mod movies;
mod stats;


// Re-export public types
pub use entry::CacheEntry;
pub use manager::{CacheManager, SweepReport};
pub use metadata::CacheMetadata;
pub use movies::{
    CREDITS_TTL, DETAILS_TTL, GENRES_TTL, MOVIE_LIST_TTL, SEARCH_RESULTS_TTL,
};
pub use stats::CacheStats;

// == Public Constants ==
/// Default entry budget enforced by the sweep
pub const DEFAULT_MAX_ITEMS: usize = 100;

/// Default interval between sweeps
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 60 * 60;

/// Entries processed between yields during a sweep
pub const SWEEP_BATCH: usize = 25;
