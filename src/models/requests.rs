//! Request DTOs for the local API
//!
//! Defines the structure of incoming HTTP request bodies and query strings.

use serde::Deserialize;

use crate::state::{ColorScheme, ThemeMode};

/// Query string for `GET /favorites`
///
/// Filters compose: genre, then year, then text; `sort=rating` orders the
/// result by rating, highest first.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FavoritesQuery {
    #[serde(default)]
    pub genre: Option<u32>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub sort: Option<String>,
}

impl FavoritesQuery {
    /// Returns an error message if the query is malformed.
    pub fn validate(&self) -> Option<String> {
        match self.sort.as_deref() {
            None | Some("rating") | Some("recent") => None,
            Some(other) => Some(format!("Unknown sort order '{}'", other)),
        }
    }

    pub fn by_rating(&self) -> bool {
        self.sort.as_deref() == Some("rating")
    }
}

/// Request body for `POST /search-history`
#[derive(Debug, Clone, Deserialize)]
pub struct SearchRequest {
    pub query: String,
}

/// Request body for `PUT /theme`
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ThemeRequest {
    pub mode: ThemeMode,
}

/// Request body for `PUT /theme/platform`
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PlatformSchemeRequest {
    pub scheme: ColorScheme,
}
