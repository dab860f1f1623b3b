//! Catalog Module
//!
//! The remote movie-metadata API as a trait, and a cache-aside wrapper that
//! memoizes its responses through the [`CacheManager`].

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::cache::CacheManager;
use crate::error::ApiError;
use crate::models::{Credits, Genre, MovieCategory, MovieDetails, MovieId, MoviePage};

// == Movie Source ==
/// Remote movie-metadata API.
#[async_trait]
pub trait MovieSource: Send + Sync {
    async fn movie_list(&self, category: MovieCategory, page: u32)
        -> Result<MoviePage, ApiError>;

    async fn search(&self, query: &str, page: u32) -> Result<MoviePage, ApiError>;

    async fn details(&self, id: MovieId) -> Result<MovieDetails, ApiError>;

    async fn credits(&self, id: MovieId) -> Result<Credits, ApiError>;

    async fn genres(&self) -> Result<Vec<Genre>, ApiError>;
}

// == Cached Catalog ==
/// Serves reads from the cache and falls back to the source on a miss.
///
/// Only successful responses are cached; errors pass straight through.
#[derive(Clone)]
pub struct CachedCatalog {
    source: Arc<dyn MovieSource>,
    cache: Arc<CacheManager>,
}

impl CachedCatalog {
    pub fn new(source: Arc<dyn MovieSource>, cache: Arc<CacheManager>) -> Self {
        Self { source, cache }
    }

    pub fn cache(&self) -> &CacheManager {
        &self.cache
    }

    pub async fn movie_list(
        &self,
        category: MovieCategory,
        page: u32,
    ) -> Result<MoviePage, ApiError> {
        if let Some(cached) = self.cache.get_cached_movie_list(category, page).await {
            return Ok(cached);
        }

        debug!(%category, page, "fetching movie list");
        let fresh = self.source.movie_list(category, page).await?;
        self.cache.cache_movie_list(category, &fresh).await;
        Ok(fresh)
    }

    pub async fn search(&self, query: &str, page: u32) -> Result<MoviePage, ApiError> {
        if let Some(cached) = self.cache.get_cached_search_results(query, page).await {
            return Ok(cached);
        }

        debug!(query, page, "searching movies");
        let fresh = self.source.search(query.trim(), page).await?;
        self.cache.cache_search_results(query, &fresh).await;
        Ok(fresh)
    }

    pub async fn details(&self, id: MovieId) -> Result<MovieDetails, ApiError> {
        if let Some(cached) = self.cache.get_cached_movie_details(id).await {
            return Ok(cached);
        }

        let fresh = self.source.details(id).await?;
        self.cache.cache_movie_details(&fresh).await;
        Ok(fresh)
    }

    pub async fn credits(&self, id: MovieId) -> Result<Credits, ApiError> {
        if let Some(cached) = self.cache.get_cached_credits(id).await {
            return Ok(cached);
        }

        let fresh = self.source.credits(id).await?;
        self.cache.cache_credits(&fresh).await;
        Ok(fresh)
    }

    pub async fn genres(&self) -> Result<Vec<Genre>, ApiError> {
        if let Some(cached) = self.cache.get_cached_genres().await {
            return Ok(cached);
        }

        let fresh = self.source.genres().await?;
        self.cache.cache_genres(&fresh).await;
        Ok(fresh)
    }
}
