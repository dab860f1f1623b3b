//! Favorites container.
//!
//! Thin reactive wrapper over [`FavoritesStore`]: after every mutation the
//! current collections are published to subscribers. Membership is always
//! derived from the latest snapshot, never cached separately.

use serde::Serialize;
use tokio::sync::watch;

use crate::error::Result;
use crate::library::FavoritesStore;
use crate::models::{FavoriteItem, Movie, MovieId, RecentlyViewedItem};

// == Snapshot ==
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoritesSnapshot {
    pub favorites: Vec<FavoriteItem>,
    pub recently_viewed: Vec<RecentlyViewedItem>,
}

impl FavoritesSnapshot {
    pub fn is_favorite(&self, id: MovieId) -> bool {
        self.favorites.iter().any(|f| f.id() == id)
    }
}

// == Favorites Container ==
pub struct FavoritesContainer {
    store: FavoritesStore,
    tx: watch::Sender<FavoritesSnapshot>,
}

impl FavoritesContainer {
    pub fn new(store: FavoritesStore) -> Self {
        let (tx, _) = watch::channel(snapshot_of(&store));
        Self { store, tx }
    }

    /// Read access for derived queries (filters, search, export).
    pub fn store(&self) -> &FavoritesStore {
        &self.store
    }

    pub fn snapshot(&self) -> FavoritesSnapshot {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<FavoritesSnapshot> {
        self.tx.subscribe()
    }

    pub fn is_favorite(&self, id: MovieId) -> bool {
        self.tx.borrow().is_favorite(id)
    }

    // == Mutations ==
    // Each publishes even on error: a NotPersisted failure still changed
    // memory.

    pub async fn add_favorite(&mut self, movie: Movie) -> Result<bool> {
        let result = self.store.add_favorite(movie).await;
        self.publish();
        result
    }

    pub async fn remove_favorite(&mut self, id: MovieId) -> Result<bool> {
        let result = self.store.remove_favorite(id).await;
        self.publish();
        result
    }

    pub async fn toggle_favorite(&mut self, movie: Movie) -> Result<bool> {
        let result = self.store.toggle_favorite(movie).await;
        self.publish();
        result
    }

    pub async fn clear_favorites(&mut self) -> Result<()> {
        let result = self.store.clear_favorites().await;
        self.publish();
        result
    }

    pub async fn add_recently_viewed(&mut self, movie: Movie) -> Result<()> {
        let result = self.store.add_recently_viewed(movie).await;
        self.publish();
        result
    }

    pub async fn clear_recently_viewed(&mut self) -> Result<()> {
        let result = self.store.clear_recently_viewed().await;
        self.publish();
        result
    }

    pub async fn import_favorites_json(&mut self, raw: &str) -> Result<usize> {
        let result = self.store.import_favorites_json(raw).await;
        self.publish();
        result
    }

    fn publish(&self) {
        self.tx.send_replace(snapshot_of(&self.store));
    }
}

fn snapshot_of(store: &FavoritesStore) -> FavoritesSnapshot {
    FavoritesSnapshot {
        favorites: store.favorites().to_vec(),
        recently_viewed: store.recently_viewed().to_vec(),
    }
}
