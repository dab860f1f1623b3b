//! Favorites and recently viewed movies.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::error::{AppError, Result};
use crate::library::RECENTLY_VIEWED_LIMIT;
use crate::models::{FavoriteItem, Movie, MovieId, RecentlyViewedItem, SavedMovie};
use crate::storage::{load_json, save_json, KeyValueStore, FAVORITES_KEY, RECENTLY_VIEWED_KEY};

/// Format version written by [`FavoritesStore::export_favorites`].
pub const EXPORT_VERSION: u32 = 1;

// == Export Document ==
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoritesExport {
    pub version: u32,
    pub exported_at: DateTime<Utc>,
    pub items: Vec<FavoriteItem>,
}

/// Accepted import shapes, tried in order.
#[derive(Deserialize)]
#[serde(untagged)]
enum ImportDocument {
    Export(FavoritesExport),
    Items(Vec<FavoriteItem>),
    Movies(Vec<Movie>),
}

// == Favorites Store ==
/// Persistent favorites (newest first) and view history (newest first,
/// capped at [`RECENTLY_VIEWED_LIMIT`]).
pub struct FavoritesStore {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    favorites: Vec<FavoriteItem>,
    recently_viewed: Vec<RecentlyViewedItem>,
}

impl FavoritesStore {
    // == Constructor ==
    /// Restores both collections. Unreadable data starts empty.
    pub async fn load(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        let favorites: Vec<FavoriteItem> = load_json(store.as_ref(), FAVORITES_KEY)
            .await
            .unwrap_or_default();
        let mut recently_viewed: Vec<RecentlyViewedItem> =
            load_json(store.as_ref(), RECENTLY_VIEWED_KEY)
                .await
                .unwrap_or_default();
        recently_viewed.truncate(RECENTLY_VIEWED_LIMIT);

        info!(
            favorites = favorites.len(),
            recently_viewed = recently_viewed.len(),
            "library loaded"
        );

        Self {
            store,
            clock,
            favorites,
            recently_viewed,
        }
    }

    // == Reads ==
    pub fn favorites(&self) -> &[FavoriteItem] {
        &self.favorites
    }

    pub fn recently_viewed(&self) -> &[RecentlyViewedItem] {
        &self.recently_viewed
    }

    pub fn is_favorite(&self, id: MovieId) -> bool {
        self.favorites.iter().any(|f| f.id() == id)
    }

    pub fn get_favorite(&self, id: MovieId) -> Option<&FavoriteItem> {
        self.favorites.iter().find(|f| f.id() == id)
    }

    // == Favorites Mutations ==
    /// Prepends a movie to the favorites.
    ///
    /// Returns `Ok(false)` without writing if the id is already present.
    pub async fn add_favorite(&mut self, movie: Movie) -> Result<bool> {
        validate(&movie)?;
        if self.is_favorite(movie.id) {
            debug!(id = movie.id, "already a favorite");
            return Ok(false);
        }

        let item = SavedMovie::new(movie, self.now());
        self.favorites.insert(0, item);
        self.persist_favorites().await?;
        Ok(true)
    }

    /// Removes a favorite. Returns `Ok(false)` if the id was not present.
    pub async fn remove_favorite(&mut self, id: MovieId) -> Result<bool> {
        let before = self.favorites.len();
        self.favorites.retain(|f| f.id() != id);
        if self.favorites.len() == before {
            return Ok(false);
        }

        self.persist_favorites().await?;
        Ok(true)
    }

    /// Adds the movie if absent, removes it otherwise. Returns whether it is
    /// a favorite afterwards.
    pub async fn toggle_favorite(&mut self, movie: Movie) -> Result<bool> {
        if self.is_favorite(movie.id) {
            self.remove_favorite(movie.id).await?;
            Ok(false)
        } else {
            self.add_favorite(movie).await?;
            Ok(true)
        }
    }

    pub async fn clear_favorites(&mut self) -> Result<()> {
        self.favorites.clear();
        self.persist_favorites().await
    }

    // == Recently Viewed ==
    /// Moves (or inserts) a movie to the front of the view history.
    pub async fn add_recently_viewed(&mut self, movie: Movie) -> Result<()> {
        validate(&movie)?;

        self.recently_viewed.retain(|m| m.id() != movie.id);
        let item = SavedMovie::new(movie, self.now());
        self.recently_viewed.insert(0, item);
        self.recently_viewed.truncate(RECENTLY_VIEWED_LIMIT);
        self.persist_recently_viewed().await
    }

    pub async fn clear_recently_viewed(&mut self) -> Result<()> {
        self.recently_viewed.clear();
        self.persist_recently_viewed().await
    }

    // == Derived Queries ==
    pub fn filter_by_genre(&self, genre_id: u32) -> Vec<&FavoriteItem> {
        self.favorites
            .iter()
            .filter(|f| f.movie.has_genre(genre_id))
            .collect()
    }

    pub fn filter_by_year(&self, year: i32) -> Vec<&FavoriteItem> {
        self.favorites
            .iter()
            .filter(|f| f.movie.released_in(year))
            .collect()
    }

    /// Favorites ordered by rating, highest first. Ties keep list order.
    pub fn sorted_by_rating(&self) -> Vec<&FavoriteItem> {
        let mut sorted: Vec<&FavoriteItem> = self.favorites.iter().collect();
        sort_by_rating(&mut sorted);
        sorted
    }

    /// Case-insensitive substring search over title and overview.
    ///
    /// A blank query matches everything.
    pub fn search_favorites(&self, query: &str) -> Vec<&FavoriteItem> {
        let needle = query.trim().to_lowercase();
        self.favorites
            .iter()
            .filter(|f| needle.is_empty() || f.movie.matches_text(&needle))
            .collect()
    }

    // == Export / Import ==
    /// Serializes the favorites as a versioned JSON document.
    pub fn export_favorites(&self) -> Result<String> {
        let doc = FavoritesExport {
            version: EXPORT_VERSION,
            exported_at: self.now(),
            items: self.favorites.clone(),
        };
        serde_json::to_string_pretty(&doc).map_err(|e| AppError::Internal(e.to_string()))
    }

    /// Merges a batch into the favorites with set-union semantics.
    ///
    /// Existing entries keep their position and data. New ids are appended
    /// in batch order; repeats within the batch are dropped. The whole batch
    /// is rejected if any item is invalid. Returns the number added.
    pub async fn import_favorites(&mut self, items: Vec<FavoriteItem>) -> Result<usize> {
        for item in &items {
            validate(&item.movie)?;
        }

        let mut seen: HashSet<MovieId> = self.favorites.iter().map(SavedMovie::id).collect();
        let before = self.favorites.len();
        for item in items {
            if seen.insert(item.id()) {
                self.favorites.push(item);
            }
        }

        let added = self.favorites.len() - before;
        if added > 0 {
            self.persist_favorites().await?;
        }
        info!(added, "imported favorites");
        Ok(added)
    }

    /// Parses an export document, a bare item array, or a bare movie array,
    /// then merges it via [`FavoritesStore::import_favorites`].
    pub async fn import_favorites_json(&mut self, raw: &str) -> Result<usize> {
        let doc: ImportDocument = serde_json::from_str(raw)
            .map_err(|e| AppError::InvalidRequest(format!("Unrecognized import format: {e}")))?;

        let items = match doc {
            ImportDocument::Export(export) => {
                if export.version > EXPORT_VERSION {
                    return Err(AppError::InvalidRequest(format!(
                        "Unsupported export version {}",
                        export.version
                    )));
                }
                export.items
            }
            ImportDocument::Items(items) => items,
            ImportDocument::Movies(movies) => {
                let now = self.now();
                movies.into_iter().map(|m| SavedMovie::new(m, now)).collect()
            }
        };

        self.import_favorites(items).await
    }

    // == Persistence ==
    async fn persist_favorites(&self) -> Result<()> {
        save_json(self.store.as_ref(), FAVORITES_KEY, &self.favorites)
            .await
            .map_err(|e| {
                warn!(error = %e, "favorites kept in memory only");
                AppError::NotPersisted(e)
            })
    }

    async fn persist_recently_viewed(&self) -> Result<()> {
        save_json(self.store.as_ref(), RECENTLY_VIEWED_KEY, &self.recently_viewed)
            .await
            .map_err(|e| {
                warn!(error = %e, "recently viewed kept in memory only");
                AppError::NotPersisted(e)
            })
    }

    fn now(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.clock.now_ms()).unwrap_or_default()
    }
}

/// Stable sort, highest rating first.
pub fn sort_by_rating(items: &mut [&FavoriteItem]) {
    items.sort_by(|a, b| b.movie.vote_average.total_cmp(&a.movie.vote_average));
}

fn validate(movie: &Movie) -> Result<()> {
    match movie.validate() {
        Some(msg) => Err(AppError::InvalidRequest(msg)),
        None => Ok(()),
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::models::movie::sample_movie;
    use crate::storage::testing::FlakyStore;
    use crate::storage::MemoryStore;

    fn clock() -> Arc<ManualClock> {
        Arc::new(ManualClock::new(1_700_000_000_000))
    }

    async fn empty_store() -> (FavoritesStore, Arc<MemoryStore>) {
        let kv = Arc::new(MemoryStore::new());
        let store = FavoritesStore::load(kv.clone(), clock()).await;
        (store, kv)
    }

    fn ids(items: &[&FavoriteItem]) -> Vec<MovieId> {
        items.iter().map(|f| f.id()).collect()
    }

    #[tokio::test]
    async fn test_add_favorite_is_idempotent() {
        let (mut store, _) = empty_store().await;

        assert!(store.add_favorite(sample_movie(42)).await.unwrap());
        assert!(!store.add_favorite(sample_movie(42)).await.unwrap());

        assert_eq!(store.favorites().len(), 1);
        assert!(store.is_favorite(42));
    }

    #[tokio::test]
    async fn test_newest_favorite_first() {
        let (mut store, _) = empty_store().await;

        for id in 1..=3 {
            store.add_favorite(sample_movie(id)).await.unwrap();
        }

        let order: Vec<MovieId> = store.favorites().iter().map(|f| f.id()).collect();
        assert_eq!(order, vec![3, 2, 1]);
    }

    #[tokio::test]
    async fn test_remove_favorite() {
        let (mut store, _) = empty_store().await;
        store.add_favorite(sample_movie(1)).await.unwrap();

        assert!(!store.remove_favorite(99).await.unwrap());
        assert_eq!(store.favorites().len(), 1);

        assert!(store.remove_favorite(1).await.unwrap());
        assert!(!store.is_favorite(1));
    }

    #[tokio::test]
    async fn test_toggle_favorite() {
        let (mut store, _) = empty_store().await;

        assert!(store.toggle_favorite(sample_movie(8)).await.unwrap());
        assert!(!store.toggle_favorite(sample_movie(8)).await.unwrap());
        assert!(store.favorites().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_movie_rejected_before_write() {
        let (mut store, kv) = empty_store().await;

        let result = store.add_favorite(sample_movie(0)).await;
        assert!(matches!(result, Err(AppError::InvalidRequest(_))));
        assert!(store.favorites().is_empty());
        assert_eq!(kv.len().await, 0);
    }

    #[tokio::test]
    async fn test_favorites_persist_across_load() {
        let kv = Arc::new(MemoryStore::new());
        {
            let mut store = FavoritesStore::load(kv.clone(), clock()).await;
            store.add_favorite(sample_movie(1)).await.unwrap();
            store.add_favorite(sample_movie(2)).await.unwrap();
            store.add_recently_viewed(sample_movie(3)).await.unwrap();
        }

        let store = FavoritesStore::load(kv, clock()).await;
        assert_eq!(store.favorites().len(), 2);
        assert_eq!(store.favorites()[0].id(), 2);
        assert_eq!(store.recently_viewed()[0].id(), 3);
    }

    #[tokio::test]
    async fn test_write_failure_keeps_memory_state() {
        let kv = Arc::new(FlakyStore::new());
        let mut store = FavoritesStore::load(kv.clone(), clock()).await;

        kv.fail_writes(true);
        let result = store.add_favorite(sample_movie(5)).await;

        let err = result.unwrap_err();
        assert!(err.is_applied());
        assert!(store.is_favorite(5));

        // Nothing reached the store, so a restart loses the change
        kv.fail_writes(false);
        let reloaded = FavoritesStore::load(kv, clock()).await;
        assert!(!reloaded.is_favorite(5));
    }

    #[tokio::test]
    async fn test_recently_viewed_cap_and_reorder() {
        let (mut store, _) = empty_store().await;

        for id in 1..=51 {
            store.add_recently_viewed(sample_movie(id)).await.unwrap();
        }
        assert_eq!(store.recently_viewed().len(), RECENTLY_VIEWED_LIMIT);
        assert!(store.recently_viewed().iter().all(|m| m.id() != 1));
        assert_eq!(store.recently_viewed()[0].id(), 51);

        store.add_recently_viewed(sample_movie(20)).await.unwrap();
        assert_eq!(store.recently_viewed().len(), RECENTLY_VIEWED_LIMIT);
        assert_eq!(store.recently_viewed()[0].id(), 20);
        assert_eq!(
            store.recently_viewed().iter().filter(|m| m.id() == 20).count(),
            1
        );
    }

    #[tokio::test]
    async fn test_recently_viewed_independent_of_favorites() {
        let (mut store, _) = empty_store().await;
        store.add_favorite(sample_movie(1)).await.unwrap();
        store.add_recently_viewed(sample_movie(1)).await.unwrap();

        store.clear_recently_viewed().await.unwrap();
        assert!(store.recently_viewed().is_empty());
        assert!(store.is_favorite(1));

        store.clear_favorites().await.unwrap();
        assert!(store.favorites().is_empty());
    }

    #[tokio::test]
    async fn test_derived_queries() {
        let (mut store, _) = empty_store().await;

        let mut alien = sample_movie(1);
        alien.title = "Alien".to_string();
        alien.overview = "In space no one can hear you scream".to_string();
        alien.genre_ids = vec![27, 878];
        alien.release_date = Some("1979-05-25".to_string());
        alien.vote_average = 8.1;

        let mut heat = sample_movie(2);
        heat.title = "Heat".to_string();
        heat.overview = "A group of professional bank robbers".to_string();
        heat.genre_ids = vec![80];
        heat.release_date = Some("1995-12-15".to_string());
        heat.vote_average = 7.9;

        let mut arrival = sample_movie(3);
        arrival.title = "Arrival".to_string();
        arrival.overview = "Linguist meets aliens".to_string();
        arrival.genre_ids = vec![878];
        arrival.release_date = Some("2016-11-10".to_string());
        arrival.vote_average = 7.6;

        for movie in [alien, heat, arrival] {
            store.add_favorite(movie).await.unwrap();
        }

        assert_eq!(ids(&store.filter_by_genre(878)), vec![3, 1]);
        assert_eq!(ids(&store.filter_by_year(1995)), vec![2]);
        assert_eq!(ids(&store.sorted_by_rating()), vec![1, 2, 3]);
        assert_eq!(ids(&store.search_favorites("ALIEN")), vec![3, 1]);
        assert_eq!(ids(&store.search_favorites("robbers")), vec![2]);
        assert_eq!(store.search_favorites("  ").len(), 3);
    }

    #[tokio::test]
    async fn test_import_merges_with_precedence() {
        let (mut store, _) = empty_store().await;
        store.add_favorite(sample_movie(1)).await.unwrap();

        let mut renamed = sample_movie(1);
        renamed.title = "Imported title".to_string();
        let now = Utc::now();
        let batch = vec![
            SavedMovie::new(renamed, now),
            SavedMovie::new(sample_movie(2), now),
            SavedMovie::new(sample_movie(3), now),
            SavedMovie::new(sample_movie(2), now),
        ];

        let added = store.import_favorites(batch).await.unwrap();
        assert_eq!(added, 2);

        let order: Vec<MovieId> = store.favorites().iter().map(|f| f.id()).collect();
        assert_eq!(order, vec![1, 2, 3]);
        assert_eq!(store.favorites()[0].movie.title, "Movie 1");
    }

    #[tokio::test]
    async fn test_export_then_import_into_fresh_store() {
        let (mut source, _) = empty_store().await;
        source.add_favorite(sample_movie(1)).await.unwrap();
        source.add_favorite(sample_movie(2)).await.unwrap();
        let exported = source.export_favorites().unwrap();

        let (mut target, _) = empty_store().await;
        assert_eq!(target.import_favorites_json(&exported).await.unwrap(), 2);
        assert_eq!(target.favorites(), source.favorites());
    }

    #[tokio::test]
    async fn test_import_json_shapes() {
        let (mut store, _) = empty_store().await;

        let movies = r#"[{"id": 10, "title": "Ten"}]"#;
        assert_eq!(store.import_favorites_json(movies).await.unwrap(), 1);

        let bad = store.import_favorites_json(r#"{"nope": true}"#).await;
        assert!(matches!(bad, Err(AppError::InvalidRequest(_))));

        let future = r#"{"version": 99, "exportedAt": "2024-01-01T00:00:00Z", "items": []}"#;
        let result = store.import_favorites_json(future).await;
        assert!(matches!(result, Err(AppError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_import_rejects_invalid_batch() {
        let (mut store, _) = empty_store().await;
        let batch = vec![
            SavedMovie::new(sample_movie(1), Utc::now()),
            SavedMovie::new(sample_movie(0), Utc::now()),
        ];

        assert!(store.import_favorites(batch).await.is_err());
        assert!(store.favorites().is_empty());
    }
}
