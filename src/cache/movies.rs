//! Movie cache helpers
//!
//! Fixed key layout and TTL per category of remote data.

use std::time::Duration;

use crate::cache::CacheManager;
use crate::models::{Credits, Genre, MovieCategory, MovieDetails, MovieId, MoviePage};

pub const MOVIE_LIST_TTL: Duration = Duration::from_secs(15 * 60);
pub const DETAILS_TTL: Duration = Duration::from_secs(60 * 60);
pub const CREDITS_TTL: Duration = Duration::from_secs(60 * 60);
pub const SEARCH_RESULTS_TTL: Duration = Duration::from_secs(10 * 60);
pub const GENRES_TTL: Duration = Duration::from_secs(24 * 60 * 60);

const GENRES_KEY: &str = "genres";

fn list_key(category: MovieCategory, page: u32) -> String {
    format!("movies:{category}:{page}")
}

fn details_key(id: MovieId) -> String {
    format!("details:{id}")
}

fn credits_key(id: MovieId) -> String {
    format!("credits:{id}")
}

/// Search keys ignore surrounding whitespace and case.
fn search_key(query: &str, page: u32) -> String {
    format!("search:{}:{page}", query.trim().to_lowercase())
}

impl CacheManager {
    // == Movie Lists ==
    pub async fn cache_movie_list(&self, category: MovieCategory, page: &MoviePage) -> bool {
        self.set(&list_key(category, page.page), page, Some(MOVIE_LIST_TTL)).await
    }

    pub async fn get_cached_movie_list(
        &self,
        category: MovieCategory,
        page: u32,
    ) -> Option<MoviePage> {
        self.get(&list_key(category, page)).await
    }

    /// Drops a cached list page so the next load goes to the network.
    pub async fn invalidate_movie_list(&self, category: MovieCategory, page: u32) {
        self.remove(&list_key(category, page)).await;
    }

    // == Details & Credits ==
    pub async fn cache_movie_details(&self, details: &MovieDetails) -> bool {
        self.set(&details_key(details.id), details, Some(DETAILS_TTL)).await
    }

    pub async fn get_cached_movie_details(&self, id: MovieId) -> Option<MovieDetails> {
        self.get(&details_key(id)).await
    }

    pub async fn cache_credits(&self, credits: &Credits) -> bool {
        self.set(&credits_key(credits.id), credits, Some(CREDITS_TTL)).await
    }

    pub async fn get_cached_credits(&self, id: MovieId) -> Option<Credits> {
        self.get(&credits_key(id)).await
    }

    /// Drops cached details and credits for one movie.
    pub async fn invalidate_movie(&self, id: MovieId) {
        self.remove(&details_key(id)).await;
        self.remove(&credits_key(id)).await;
    }

    // == Search ==
    pub async fn cache_search_results(&self, query: &str, page: &MoviePage) -> bool {
        self.set(&search_key(query, page.page), page, Some(SEARCH_RESULTS_TTL)).await
    }

    pub async fn get_cached_search_results(&self, query: &str, page: u32) -> Option<MoviePage> {
        self.get(&search_key(query, page)).await
    }

    // == Genres ==
    pub async fn cache_genres(&self, genres: &[Genre]) -> bool {
        self.set(GENRES_KEY, genres, Some(GENRES_TTL)).await
    }

    pub async fn get_cached_genres(&self) -> Option<Vec<Genre>> {
        self.get(GENRES_KEY).await
    }
}
