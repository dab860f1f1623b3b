//! Response DTOs for the local API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::error::{AppError, Result};
use crate::models::MovieId;
use crate::state::ThemeState;

/// Response body for mutations of the user's library.
///
/// `persisted` is false when the change was applied in memory but the
/// durable write failed.
#[derive(Debug, Clone, Serialize)]
pub struct MutationResponse {
    /// Whether the collection changed
    pub changed: bool,
    pub persisted: bool,
}

impl MutationResponse {
    /// Folds a library result into a response, tolerating unpersisted writes.
    pub fn from_result(result: Result<bool>) -> Result<Self> {
        match result {
            Ok(changed) => Ok(Self {
                changed,
                persisted: true,
            }),
            Err(AppError::NotPersisted(_)) => Ok(Self {
                changed: true,
                persisted: false,
            }),
            Err(e) => Err(e),
        }
    }
}

/// Response body for `GET /favorites/:id`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipResponse {
    pub id: MovieId,
    pub is_favorite: bool,
}

/// Response body for `POST /favorites/toggle`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleResponse {
    pub id: MovieId,
    /// Membership after the toggle
    pub is_favorite: bool,
    pub persisted: bool,
}

/// Response body for `PUT /theme`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeResponse {
    #[serde(flatten)]
    pub theme: ThemeState,
    pub persisted: bool,
}

/// Response body for `POST /search-history`
#[derive(Debug, Clone, Serialize)]
pub struct SearchHistoryResponse {
    /// Remembered queries, newest first
    pub entries: Vec<String>,
    pub persisted: bool,
}

/// Response body for `POST /favorites/import`
#[derive(Debug, Clone, Serialize)]
pub struct ImportResponse {
    pub added: usize,
    pub persisted: bool,
}

/// Response body for clearing operations
#[derive(Debug, Clone, Serialize)]
pub struct ClearResponse {
    pub message: String,
    pub persisted: bool,
}

impl ClearResponse {
    pub fn new(what: &str, persisted: bool) -> Self {
        Self {
            message: format!("{} cleared", what),
            persisted,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    /// Creates a new ErrorResponse
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StorageError;

    #[test]
    fn test_mutation_response_tolerates_unpersisted() {
        let resp = MutationResponse::from_result(Ok(false)).unwrap();
        assert!(!resp.changed);
        assert!(resp.persisted);

        let err = AppError::NotPersisted(StorageError::Backend("full".to_string()));
        let resp = MutationResponse::from_result(Err(err)).unwrap();
        assert!(resp.changed);
        assert!(!resp.persisted);

        let err = AppError::InvalidRequest("bad".to_string());
        assert!(MutationResponse::from_result(Err(err)).is_err());
    }

    #[test]
    fn test_clear_response_serialize() {
        let resp = ClearResponse::new("Favorites", true);
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("Favorites cleared"));
    }

    #[test]
    fn test_error_and_health_bodies() {
        let json = serde_json::to_value(ErrorResponse::new("Movie id is required")).unwrap();
        assert_eq!(json, serde_json::json!({ "error": "Movie id is required" }));

        let json = serde_json::to_value(HealthResponse::healthy()).unwrap();
        assert_eq!(json["status"], "healthy");
        assert!(json["timestamp"].as_str().is_some());
    }
}
