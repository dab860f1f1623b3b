//! Error types for the movie store
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Storage Error ==
/// Failure reported by a key-value store backend.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Underlying file or device I/O failed
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A value could not be encoded or decoded as JSON
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Backend-specific failure
    #[error("backend error: {0}")]
    Backend(String),
}

// == Remote API Error ==
/// Failure reported by the remote movie-metadata API.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum ApiError {
    #[error("unauthorized")]
    Unauthorized,

    #[error("resource not found")]
    NotFound,

    #[error("server error: {0}")]
    ServerError(String),

    #[error("network error: {0}")]
    Network(String),
}

// == App Error Enum ==
/// Unified error type for library, container and API operations.
#[derive(Error, Debug)]
pub enum AppError {
    /// Input rejected before any persistence attempt
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Requested item does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// The in-memory change was applied but the durable write failed.
    ///
    /// Recoverable: the current session already sees the change.
    #[error("Change applied but not persisted: {0}")]
    NotPersisted(#[source] StorageError),

    /// Remote API failure
    #[error("Remote API error: {0}")]
    Remote(#[from] ApiError),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// True when the operation's in-memory effect still took place.
    pub fn is_applied(&self) -> bool {
        matches!(self, AppError::NotPersisted(_))
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::NotPersisted(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Remote(ApiError::Unauthorized) => StatusCode::UNAUTHORIZED,
            AppError::Remote(ApiError::NotFound) => StatusCode::NOT_FOUND,
            AppError::Remote(_) => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(ErrorResponse::new(self.to_string()));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the movie store.
pub type Result<T> = std::result::Result<T, AppError>;
