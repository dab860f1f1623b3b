//! Integration Tests for API Endpoints
//!
//! Tests full request/response cycle for each endpoint.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use cinestore::{
    api::create_router, clock::ManualClock, AppState, Config, FileStore, KeyValueStore,
    MemoryStore,
};
use serde_json::{json, Value};
use tower::ServiceExt;

// == Helper Functions ==

async fn create_test_app() -> (Router, AppState, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(1_700_000_000_000));
    let state = AppState::build(
        Arc::new(MemoryStore::new()),
        clock.clone(),
        &Config::default(),
    )
    .await;
    (create_router(state.clone()), state, clock)
}

async fn app_on(store: Arc<dyn KeyValueStore>) -> Router {
    let state = AppState::build(
        store,
        Arc::new(ManualClock::new(1_700_000_000_000)),
        &Config::default(),
    )
    .await;
    create_router(state)
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    // Extractor rejections answer in plain text
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

fn movie(id: u64, title: &str, rating: f64, date: &str, genres: &[u32]) -> Value {
    json!({
        "id": id,
        "title": title,
        "overview": format!("About {}", title),
        "release_date": date,
        "vote_average": rating,
        "genre_ids": genres,
    })
}

// == Favorites Endpoint Tests ==

#[tokio::test]
async fn test_add_favorite_is_idempotent() {
    let (app, _, _) = create_test_app().await;
    let body = movie(42, "Arrival", 7.9, "2016-11-11", &[18, 878]);

    let (status, json) = send(&app, "POST", "/favorites", Some(body.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["changed"], true);
    assert_eq!(json["persisted"], true);

    let (_, json) = send(&app, "POST", "/favorites", Some(body)).await;
    assert_eq!(json["changed"], false);

    let (_, json) = send(&app, "GET", "/favorites", None).await;
    assert_eq!(json.as_array().unwrap().len(), 1);
    assert_eq!(json[0]["id"], 42);
    assert!(json[0].get("saved_at").is_some());
}

#[tokio::test]
async fn test_add_favorite_rejects_invalid_movie() {
    let (app, _, _) = create_test_app().await;

    let (status, json) = send(&app, "POST", "/favorites", Some(movie(7, "  ", 5.0, "", &[]))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("empty title"));

    let (_, json) = send(&app, "GET", "/favorites", None).await;
    assert!(json.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_toggle_and_membership() {
    let (app, _, _) = create_test_app().await;
    let body = movie(5, "Heat", 8.3, "1995-12-15", &[80]);

    let (_, json) = send(&app, "POST", "/favorites/toggle", Some(body.clone())).await;
    assert_eq!(json["isFavorite"], true);
    assert_eq!(json["persisted"], true);

    let (_, json) = send(&app, "GET", "/favorites/5", None).await;
    assert_eq!(json["isFavorite"], true);

    let (_, json) = send(&app, "POST", "/favorites/toggle", Some(body)).await;
    assert_eq!(json["isFavorite"], false);

    let (_, json) = send(&app, "GET", "/favorites/5", None).await;
    assert_eq!(json["isFavorite"], false);
}

#[tokio::test]
async fn test_remove_favorite() {
    let (app, _, _) = create_test_app().await;
    send(&app, "POST", "/favorites", Some(movie(9, "Up", 8.0, "2009-05-29", &[16]))).await;

    let (_, json) = send(&app, "DELETE", "/favorites/9", None).await;
    assert_eq!(json["changed"], true);

    let (_, json) = send(&app, "DELETE", "/favorites/9", None).await;
    assert_eq!(json["changed"], false);
}

#[tokio::test]
async fn test_favorites_filters_compose() {
    let (app, _, _) = create_test_app().await;
    for body in [
        movie(1, "Alien", 8.5, "1979-05-25", &[27, 878]),
        movie(2, "Aliens", 8.4, "1986-07-18", &[28, 878]),
        movie(3, "Arrival", 7.9, "2016-11-11", &[18, 878]),
        movie(4, "Amélie", 8.3, "2001-04-25", &[35]),
    ] {
        send(&app, "POST", "/favorites", Some(body)).await;
    }

    let (_, json) = send(&app, "GET", "/favorites?genre=878", None).await;
    assert_eq!(json.as_array().unwrap().len(), 3);

    let (_, json) = send(&app, "GET", "/favorites?genre=878&q=alien", None).await;
    assert_eq!(json.as_array().unwrap().len(), 2);

    let (_, json) = send(&app, "GET", "/favorites?year=1986", None).await;
    assert_eq!(json[0]["id"], 2);

    let (_, json) = send(&app, "GET", "/favorites?sort=rating", None).await;
    let ids: Vec<u64> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["id"].as_u64().unwrap())
        .collect();
    assert_eq!(ids, vec![1, 2, 4, 3]);

    let (status, _) = send(&app, "GET", "/favorites?sort=title", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_export_then_import_into_fresh_app() {
    let (app, _, _) = create_test_app().await;
    send(&app, "POST", "/favorites", Some(movie(1, "Alien", 8.5, "1979-05-25", &[27]))).await;
    send(&app, "POST", "/favorites", Some(movie(2, "Heat", 8.3, "1995-12-15", &[80]))).await;

    let (status, export) = send(&app, "GET", "/favorites/export", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(export["version"], 1);
    assert_eq!(export["items"].as_array().unwrap().len(), 2);

    let (fresh, _, _) = create_test_app().await;
    send(&fresh, "POST", "/favorites", Some(movie(2, "Heat", 8.3, "1995-12-15", &[80]))).await;

    let (status, json) = send(&fresh, "POST", "/favorites/import", Some(export)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["added"], 1);

    let (_, json) = send(&fresh, "GET", "/favorites", None).await;
    assert_eq!(json.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_import_rejects_garbage() {
    let (app, _, _) = create_test_app().await;

    let request = Request::builder()
        .method("POST")
        .uri("/favorites/import")
        .body(Body::from("not json"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_to_json(response.into_body()).await;
    assert!(json.get("error").is_some());
}

// == Recently Viewed Endpoint Tests ==

#[tokio::test]
async fn test_recently_viewed_moves_to_front() {
    let (app, _, _) = create_test_app().await;
    for id in [1, 2, 1] {
        send(&app, "POST", "/recent", Some(movie(id, "Film", 6.0, "2020-01-01", &[]))).await;
    }

    let (_, json) = send(&app, "GET", "/recent", None).await;
    let ids: Vec<u64> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["id"].as_u64().unwrap())
        .collect();
    assert_eq!(ids, vec![1, 2]);

    send(&app, "DELETE", "/recent", None).await;
    let (_, json) = send(&app, "GET", "/recent", None).await;
    assert!(json.as_array().unwrap().is_empty());
}

// == Search History Endpoint Tests ==

#[tokio::test]
async fn test_search_history_lifecycle() {
    let (app, _, _) = create_test_app().await;
    for query in ["dune", "alien", "  Dune  "] {
        let body = json!({ "query": query });
        let (_, json) = send(&app, "POST", "/search-history", Some(body)).await;
        assert_eq!(json["entries"][0], query.trim());
        assert_eq!(json["persisted"], true);
    }

    let (_, json) = send(&app, "GET", "/search-history", None).await;
    assert_eq!(json, json!(["Dune", "alien"]));

    let (_, json) = send(&app, "DELETE", "/search-history/alien", None).await;
    assert_eq!(json["changed"], true);

    let (status, _) = send(&app, "POST", "/search-history", Some(json!({ "query": "   " }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    send(&app, "DELETE", "/search-history", None).await;
    let (_, json) = send(&app, "GET", "/search-history", None).await;
    assert_eq!(json, json!([]));
}

// == Theme Endpoint Tests ==

#[tokio::test]
async fn test_theme_follows_platform_in_system_mode() {
    let (app, _, _) = create_test_app().await;

    let (_, json) = send(&app, "GET", "/theme", None).await;
    assert_eq!(json["mode"], "system");
    assert_eq!(json["activeScheme"], "light");

    let (_, json) = send(&app, "PUT", "/theme/platform", Some(json!({ "scheme": "dark" }))).await;
    assert_eq!(json["activeScheme"], "dark");

    let (_, json) = send(&app, "PUT", "/theme", Some(json!({ "mode": "light" }))).await;
    assert_eq!(json["activeScheme"], "light");
    assert_eq!(json["persisted"], true);

    let (status, json) = send(&app, "PUT", "/theme", Some(json!({ "mode": "sepia" }))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(json.is_null());
}

// == Cache Endpoint Tests ==

#[tokio::test]
async fn test_cache_stats_and_clear() {
    let (app, state, clock) = create_test_app().await;
    state.cache.set("genres", &json!(["Action"]), None).await;
    clock.advance(Duration::from_secs(1));
    state
        .cache
        .set("movies:popular:1", &json!([]), Some(Duration::from_secs(60)))
        .await;

    let (status, json) = send(&app, "GET", "/cache/stats", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["totalItems"], 2);
    assert_eq!(json["oldestKey"], "genres");
    assert_eq!(json["newestKey"], "movies:popular:1");

    send(&app, "DELETE", "/cache/genres", None).await;
    let (_, json) = send(&app, "GET", "/cache/stats", None).await;
    assert_eq!(json["totalItems"], 1);

    send(&app, "DELETE", "/cache", None).await;
    let (_, json) = send(&app, "GET", "/cache/stats", None).await;
    assert_eq!(json["totalItems"], 0);
}

#[tokio::test]
async fn test_expired_entry_reads_as_absent() {
    let (_, state, clock) = create_test_app().await;
    state
        .cache
        .set("details:1", &json!({"id": 1}), Some(Duration::from_secs(60)))
        .await;

    clock.advance(Duration::from_secs(61));
    assert!(state.cache.get::<Value>("details:1").await.is_none());
}

// == Persistence Tests ==

#[tokio::test]
async fn test_library_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.json");

    let app = app_on(Arc::new(FileStore::open(path.clone()).await.unwrap())).await;
    send(&app, "POST", "/favorites", Some(movie(11, "Ran", 8.2, "1985-06-01", &[18]))).await;
    send(&app, "POST", "/search-history", Some(json!({ "query": "kurosawa" }))).await;
    send(&app, "PUT", "/theme", Some(json!({ "mode": "dark" }))).await;

    let app = app_on(Arc::new(FileStore::open(path).await.unwrap())).await;
    let (_, json) = send(&app, "GET", "/favorites/11", None).await;
    assert_eq!(json["isFavorite"], true);

    let (_, json) = send(&app, "GET", "/search-history", None).await;
    assert_eq!(json, json!(["kurosawa"]));

    let (_, json) = send(&app, "GET", "/theme", None).await;
    assert_eq!(json["mode"], "dark");
}

// == Health Endpoint Tests ==

#[tokio::test]
async fn test_health_endpoint() {
    let (app, _, _) = create_test_app().await;

    let (status, json) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
}

#[tokio::test]
async fn test_invalid_json_request() {
    let (app, _, _) = create_test_app().await;

    let request = Request::builder()
        .method("POST")
        .uri("/favorites")
        .header("content-type", "application/json")
        .body(Body::from("not valid json"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert!(response.status().is_client_error());
}
