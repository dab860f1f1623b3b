//! Movie domain records
//!
//! Shapes mirror the remote movie-metadata API so cached responses can be
//! stored and replayed without translation.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Numeric movie identity assigned by the remote API.
pub type MovieId = u64;

// == Movie ==
/// A movie as it appears in list results, denormalized for offline display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: MovieId,
    pub title: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub overview: String,
    /// `YYYY-MM-DD`, possibly empty for unreleased titles
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub vote_count: u32,
    #[serde(default)]
    pub genre_ids: Vec<u32>,
}

impl Movie {
    /// Year component of the release date, if it parses.
    pub fn release_year(&self) -> Option<i32> {
        self.release_date
            .as_deref()
            .and_then(|date| date.get(..4))
            .and_then(|year| year.parse().ok())
    }

    pub fn has_genre(&self, genre_id: u32) -> bool {
        self.genre_ids.contains(&genre_id)
    }

    pub fn released_in(&self, year: i32) -> bool {
        self.release_year() == Some(year)
    }

    /// Case-insensitive substring match over title and overview.
    ///
    /// `needle` must already be lowercased.
    pub fn matches_text(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle) || self.overview.to_lowercase().contains(needle)
    }

    // == Validation ==
    /// Returns an error message if the record cannot be stored.
    pub fn validate(&self) -> Option<String> {
        if self.id == 0 {
            return Some("Movie id is required".to_string());
        }
        if self.title.trim().is_empty() {
            return Some(format!("Movie {} has an empty title", self.id));
        }
        None
    }
}

// == Saved Movie ==
/// A movie kept in the favorites or recently-viewed collections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedMovie {
    #[serde(flatten)]
    pub movie: Movie,
    pub saved_at: DateTime<Utc>,
}

impl SavedMovie {
    pub fn new(movie: Movie, saved_at: DateTime<Utc>) -> Self {
        Self { movie, saved_at }
    }

    pub fn id(&self) -> MovieId {
        self.movie.id
    }
}

/// Entry of the favorites collection.
pub type FavoriteItem = SavedMovie;
/// Entry of the recently-viewed collection.
pub type RecentlyViewedItem = SavedMovie;

// == Genre ==
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub id: u32,
    pub name: String,
}

// == Movie Page ==
/// One page of a paginated list response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoviePage {
    pub page: u32,
    pub results: Vec<Movie>,
    pub total_pages: u32,
    pub total_results: u32,
}

impl MoviePage {
    pub fn has_more(&self) -> bool {
        self.page < self.total_pages
    }
}

// == Movie Details ==
/// Full record returned by the details endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieDetails {
    pub id: MovieId,
    pub title: String,
    #[serde(default)]
    pub tagline: Option<String>,
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub runtime: Option<u32>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub vote_count: u32,
    #[serde(default)]
    pub genres: Vec<Genre>,
}

impl From<&MovieDetails> for Movie {
    fn from(details: &MovieDetails) -> Self {
        Self {
            id: details.id,
            title: details.title.clone(),
            poster_path: details.poster_path.clone(),
            backdrop_path: details.backdrop_path.clone(),
            overview: details.overview.clone(),
            release_date: details.release_date.clone(),
            vote_average: details.vote_average,
            vote_count: details.vote_count,
            genre_ids: details.genres.iter().map(|g| g.id).collect(),
        }
    }
}

// == Credits ==
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CastMember {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub character: Option<String>,
    #[serde(default)]
    pub profile_path: Option<String>,
    #[serde(default)]
    pub order: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrewMember {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub job: String,
    #[serde(default)]
    pub department: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credits {
    pub id: MovieId,
    #[serde(default)]
    pub cast: Vec<CastMember>,
    #[serde(default)]
    pub crew: Vec<CrewMember>,
}

// == Movie Category ==
/// Remote list endpoints that are browsed page by page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovieCategory {
    Popular,
    TopRated,
    Upcoming,
    NowPlaying,
}

impl MovieCategory {
    pub const ALL: [MovieCategory; 4] = [
        MovieCategory::Popular,
        MovieCategory::TopRated,
        MovieCategory::Upcoming,
        MovieCategory::NowPlaying,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MovieCategory::Popular => "popular",
            MovieCategory::TopRated => "top_rated",
            MovieCategory::Upcoming => "upcoming",
            MovieCategory::NowPlaying => "now_playing",
        }
    }
}

impl fmt::Display for MovieCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
pub(crate) fn sample_movie(id: MovieId) -> Movie {
    Movie {
        id,
        title: format!("Movie {id}"),
        poster_path: Some(format!("/poster{id}.jpg")),
        backdrop_path: None,
        overview: format!("Overview of movie {id}"),
        release_date: Some("2021-06-15".to_string()),
        vote_average: 5.0,
        vote_count: 10,
        genre_ids: vec![28],
    }
}
