//! Library Module
//!
//! The user's own data: favorites, recently viewed movies and search
//! history. Entries never expire on their own.
//!
//! Every mutation is applied to memory first and then written through to
//! the key-value store. A failed write is logged and reported as
//! [`AppError::NotPersisted`](crate::error::AppError::NotPersisted); the
//! in-memory change stands for the rest of the session, so durability is
//! at most once.

mod favorites;
mod history;


pub use favorites::{sort_by_rating, FavoritesExport, FavoritesStore, EXPORT_VERSION};
pub use history::SearchHistory;

// == Public Constants ==
/// Maximum number of recently viewed movies kept
pub const RECENTLY_VIEWED_LIMIT: usize = 50;

/// Maximum number of remembered searches
pub const SEARCH_HISTORY_LIMIT: usize = 10;
