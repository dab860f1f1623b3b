//! API Routes
//!
//! Configures the Axum router with all endpoints.

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    add_favorite_handler, add_recent_handler, cache_stats_handler, clear_cache_handler,
    clear_favorites_handler, clear_recent_handler, clear_search_history_handler,
    export_favorites_handler, favorite_status_handler, health_handler, import_favorites_handler,
    list_favorites_handler, list_recent_handler, list_search_history_handler,
    platform_scheme_handler, record_search_handler, remove_cache_entry_handler,
    remove_favorite_handler, remove_search_handler, set_theme_handler, theme_handler,
    toggle_favorite_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /health` - Health check
/// - `GET /cache/stats`, `DELETE /cache`, `DELETE /cache/:key`
/// - `GET|POST|DELETE /favorites`, `GET|DELETE /favorites/:id`
/// - `POST /favorites/toggle`, `GET /favorites/export`, `POST /favorites/import`
/// - `GET|POST|DELETE /recent`
/// - `GET|POST|DELETE /search-history`, `DELETE /search-history/:query`
/// - `GET|PUT /theme`, `PUT /theme/platform`
///
/// # Middleware
/// - CORS: Allows any origin (the API binds to localhost only)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/cache", delete(clear_cache_handler))
        .route("/cache/stats", get(cache_stats_handler))
        .route("/cache/:key", delete(remove_cache_entry_handler))
        .route(
            "/favorites",
            get(list_favorites_handler)
                .post(add_favorite_handler)
                .delete(clear_favorites_handler),
        )
        .route("/favorites/toggle", post(toggle_favorite_handler))
        .route("/favorites/export", get(export_favorites_handler))
        .route("/favorites/import", post(import_favorites_handler))
        .route(
            "/favorites/:id",
            get(favorite_status_handler).delete(remove_favorite_handler),
        )
        .route(
            "/recent",
            get(list_recent_handler)
                .post(add_recent_handler)
                .delete(clear_recent_handler),
        )
        .route(
            "/search-history",
            get(list_search_history_handler)
                .post(record_search_handler)
                .delete(clear_search_history_handler),
        )
        .route("/search-history/:query", delete(remove_search_handler))
        .route("/theme", get(theme_handler).put(set_theme_handler))
        .route("/theme/platform", put(platform_scheme_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
