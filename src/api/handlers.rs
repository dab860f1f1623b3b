//! API Handlers
//!
//! HTTP request handlers exposing the cache, library and theme contracts.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use tokio::sync::{Mutex, RwLock};

use crate::cache::{CacheManager, CacheStats};
use crate::clock::Clock;
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::library::{sort_by_rating, FavoritesStore, SearchHistory};
use crate::models::{
    ClearResponse, FavoriteItem, FavoritesQuery, HealthResponse, ImportResponse,
    MembershipResponse, Movie, MovieId, MutationResponse, PlatformSchemeRequest,
    RecentlyViewedItem, SearchHistoryResponse, SearchRequest, ThemeRequest, ThemeResponse,
    ToggleResponse,
};
use crate::state::{FavoritesContainer, ThemeController, ThemeState};
use crate::storage::KeyValueStore;

/// Application state shared across all handlers.
///
/// Every service is built once here and injected; there are no globals.
#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<CacheManager>,
    pub favorites: Arc<RwLock<FavoritesContainer>>,
    pub history: Arc<Mutex<SearchHistory>>,
    pub theme: Arc<ThemeController>,
}

impl AppState {
    /// Builds every service on top of one shared store.
    pub async fn build(
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        config: &Config,
    ) -> Self {
        let cache = CacheManager::load(store.clone(), clock.clone(), config.max_cache_items).await;
        let favorites = FavoritesStore::load(store.clone(), clock).await;
        let history = SearchHistory::load(store.clone()).await;
        let theme = ThemeController::load(store, config.platform_scheme).await;

        Self {
            cache: Arc::new(cache),
            favorites: Arc::new(RwLock::new(FavoritesContainer::new(favorites))),
            history: Arc::new(Mutex::new(history)),
            theme: Arc::new(theme),
        }
    }
}

/// Maps a NotPersisted outcome to `false`, keeping other errors.
fn persisted<T>(result: Result<T>) -> Result<bool> {
    match result {
        Ok(_) => Ok(true),
        Err(AppError::NotPersisted(_)) => Ok(false),
        Err(e) => Err(e),
    }
}

// == Health ==
/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

// == Cache ==
/// Handler for GET /cache/stats
pub async fn cache_stats_handler(State(state): State<AppState>) -> Json<CacheStats> {
    Json(state.cache.stats().await)
}

/// Handler for DELETE /cache
pub async fn clear_cache_handler(State(state): State<AppState>) -> Json<ClearResponse> {
    state.cache.clear().await;
    Json(ClearResponse::new("Cache", true))
}

/// Handler for DELETE /cache/:key
pub async fn remove_cache_entry_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Json<ClearResponse> {
    state.cache.remove(&key).await;
    Json(ClearResponse::new(&format!("Cache entry '{}'", key), true))
}

// == Favorites ==
/// Handler for GET /favorites
pub async fn list_favorites_handler(
    State(state): State<AppState>,
    Query(query): Query<FavoritesQuery>,
) -> Result<Json<Vec<FavoriteItem>>> {
    if let Some(error_msg) = query.validate() {
        return Err(AppError::InvalidRequest(error_msg));
    }

    let favorites = state.favorites.read().await;
    let store = favorites.store();

    let mut items: Vec<&FavoriteItem> = match query.q.as_deref() {
        Some(q) => store.search_favorites(q),
        None => store.favorites().iter().collect(),
    };
    if let Some(genre) = query.genre {
        items.retain(|f| f.movie.has_genre(genre));
    }
    if let Some(year) = query.year {
        items.retain(|f| f.movie.released_in(year));
    }
    if query.by_rating() {
        sort_by_rating(&mut items);
    }

    Ok(Json(items.into_iter().cloned().collect()))
}

/// Handler for POST /favorites
pub async fn add_favorite_handler(
    State(state): State<AppState>,
    Json(movie): Json<Movie>,
) -> Result<Json<MutationResponse>> {
    let mut favorites = state.favorites.write().await;
    let result = favorites.add_favorite(movie).await;
    MutationResponse::from_result(result).map(Json)
}

/// Handler for POST /favorites/toggle
pub async fn toggle_favorite_handler(
    State(state): State<AppState>,
    Json(movie): Json<Movie>,
) -> Result<Json<ToggleResponse>> {
    let id = movie.id;
    let mut favorites = state.favorites.write().await;
    let persisted = persisted(favorites.toggle_favorite(movie).await)?;
    Ok(Json(ToggleResponse {
        id,
        is_favorite: favorites.is_favorite(id),
        persisted,
    }))
}

/// Handler for GET /favorites/:id
pub async fn favorite_status_handler(
    State(state): State<AppState>,
    Path(id): Path<MovieId>,
) -> Json<MembershipResponse> {
    let favorites = state.favorites.read().await;
    Json(MembershipResponse {
        id,
        is_favorite: favorites.is_favorite(id),
    })
}

/// Handler for DELETE /favorites/:id
pub async fn remove_favorite_handler(
    State(state): State<AppState>,
    Path(id): Path<MovieId>,
) -> Result<Json<MutationResponse>> {
    let mut favorites = state.favorites.write().await;
    let result = favorites.remove_favorite(id).await;
    MutationResponse::from_result(result).map(Json)
}

/// Handler for DELETE /favorites
pub async fn clear_favorites_handler(
    State(state): State<AppState>,
) -> Result<Json<ClearResponse>> {
    let mut favorites = state.favorites.write().await;
    let persisted = persisted(favorites.clear_favorites().await)?;
    Ok(Json(ClearResponse::new("Favorites", persisted)))
}

/// Handler for GET /favorites/export
pub async fn export_favorites_handler(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let favorites = state.favorites.read().await;
    let body = favorites.store().export_favorites()?;
    Ok(([(header::CONTENT_TYPE, "application/json")], body))
}

/// Handler for POST /favorites/import
///
/// Accepts an export document, an array of saved items, or an array of
/// plain movies.
pub async fn import_favorites_handler(
    State(state): State<AppState>,
    body: String,
) -> Result<Json<ImportResponse>> {
    let mut favorites = state.favorites.write().await;
    let before = favorites.store().favorites().len();

    match favorites.import_favorites_json(&body).await {
        Ok(added) => Ok(Json(ImportResponse {
            added,
            persisted: true,
        })),
        Err(AppError::NotPersisted(_)) => Ok(Json(ImportResponse {
            added: favorites.store().favorites().len() - before,
            persisted: false,
        })),
        Err(e) => Err(e),
    }
}

// == Recently Viewed ==
/// Handler for GET /recent
pub async fn list_recent_handler(State(state): State<AppState>) -> Json<Vec<RecentlyViewedItem>> {
    let favorites = state.favorites.read().await;
    Json(favorites.store().recently_viewed().to_vec())
}

/// Handler for POST /recent
pub async fn add_recent_handler(
    State(state): State<AppState>,
    Json(movie): Json<Movie>,
) -> Result<Json<MutationResponse>> {
    let mut favorites = state.favorites.write().await;
    let persisted = persisted(favorites.add_recently_viewed(movie).await)?;
    Ok(Json(MutationResponse {
        changed: true,
        persisted,
    }))
}

/// Handler for DELETE /recent
pub async fn clear_recent_handler(State(state): State<AppState>) -> Result<Json<ClearResponse>> {
    let mut favorites = state.favorites.write().await;
    let persisted = persisted(favorites.clear_recently_viewed().await)?;
    Ok(Json(ClearResponse::new("Recently viewed", persisted)))
}

// == Search History ==
/// Handler for GET /search-history
pub async fn list_search_history_handler(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.history.lock().await.entries().to_vec())
}

/// Handler for POST /search-history
pub async fn record_search_handler(
    State(state): State<AppState>,
    Json(req): Json<SearchRequest>,
) -> Result<Json<SearchHistoryResponse>> {
    let mut history = state.history.lock().await;
    let persisted = persisted(history.record(&req.query).await)?;
    Ok(Json(SearchHistoryResponse {
        entries: history.entries().to_vec(),
        persisted,
    }))
}

/// Handler for DELETE /search-history/:query
pub async fn remove_search_handler(
    State(state): State<AppState>,
    Path(query): Path<String>,
) -> Result<Json<MutationResponse>> {
    let mut history = state.history.lock().await;
    let result = history.remove(&query).await;
    MutationResponse::from_result(result).map(Json)
}

/// Handler for DELETE /search-history
pub async fn clear_search_history_handler(
    State(state): State<AppState>,
) -> Result<Json<ClearResponse>> {
    let mut history = state.history.lock().await;
    let persisted = persisted(history.clear().await)?;
    Ok(Json(ClearResponse::new("Search history", persisted)))
}

// == Theme ==
/// Handler for GET /theme
pub async fn theme_handler(State(state): State<AppState>) -> Json<ThemeState> {
    Json(state.theme.state())
}

/// Handler for PUT /theme
pub async fn set_theme_handler(
    State(state): State<AppState>,
    Json(req): Json<ThemeRequest>,
) -> Result<Json<ThemeResponse>> {
    let persisted = persisted(state.theme.set_mode(req.mode).await)?;
    Ok(Json(ThemeResponse {
        theme: state.theme.state(),
        persisted,
    }))
}

/// Handler for PUT /theme/platform
pub async fn platform_scheme_handler(
    State(state): State<AppState>,
    Json(req): Json<PlatformSchemeRequest>,
) -> Json<ThemeState> {
    Json(state.theme.platform_scheme_changed(req.scheme))
}
