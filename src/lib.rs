//! Cinestore - local persistence for a movie-browsing app
//!
//! Provides an expiring response cache, the user's favorites and history,
//! and reducer-based state containers, all on one durable key-value store.

pub mod api;
pub mod cache;
pub mod catalog;
pub mod clock;
pub mod config;
pub mod error;
pub mod library;
pub mod models;
pub mod state;
pub mod storage;
pub mod tasks;

pub use api::AppState;
pub use cache::CacheManager;
pub use config::Config;
pub use error::{AppError, Result};
pub use library::{FavoritesStore, SearchHistory};
pub use storage::{FileStore, KeyValueStore, MemoryStore};
pub use tasks::spawn_sweep_task;
