//! Domain records and the request/response DTOs of the local API.

pub mod movie;
pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use movie::{
    CastMember, Credits, CrewMember, FavoriteItem, Genre, Movie, MovieCategory, MovieDetails,
    MovieId, MoviePage, RecentlyViewedItem, SavedMovie,
};
pub use requests::{FavoritesQuery, PlatformSchemeRequest, SearchRequest, ThemeRequest};
pub use responses::{
    ClearResponse, ErrorResponse, HealthResponse, ImportResponse, MembershipResponse,
    MutationResponse, SearchHistoryResponse, ThemeResponse, ToggleResponse,
};
