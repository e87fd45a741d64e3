//! Error type for the search pipeline and HTTP layer.
//!
//! Every failure the server can report is one of the [`ScoutError`]
//! variants, each mapped to a fixed HTTP status:
//!
//! | Variant | Status | Raised when |
//! |---------|--------|-------------|
//! | `Validation` | 400 | request body or query is malformed or inconsistent |
//! | `NotFound` | 404 | record id or page does not exist |
//! | `Fetch` | 502 | the storefront request failed or returned non-2xx |
//! | `Parse` | 502 | the page had result blocks but none could be extracted |
//! | `Storage` | 500 | the product store failed |
//! | `Internal` | 500 | anything else (e.g. result export) |
//!
//! Response bodies are `{"error": "<message>"}`. Storage and internal
//! errors are logged in full and reported with a generic message.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use product_scout_core::filter::FilterError;
use product_scout_core::pagination::PageError;

#[derive(Debug, Error)]
pub enum ScoutError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("storefront request failed: {0}")]
    Fetch(String),

    #[error("could not extract any of {blocks} result blocks from the storefront page")]
    Parse { blocks: usize },

    #[error("storage error: {0:#}")]
    Storage(anyhow::Error),

    #[error("internal error: {0:#}")]
    Internal(anyhow::Error),
}

pub type ScoutResult<T> = Result<T, ScoutError>;

impl ScoutError {
    pub fn product_not_found() -> Self {
        ScoutError::NotFound("Product not found".to_string())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ScoutError::Validation(_) => StatusCode::BAD_REQUEST,
            ScoutError::NotFound(_) => StatusCode::NOT_FOUND,
            ScoutError::Fetch(_) | ScoutError::Parse { .. } => StatusCode::BAD_GATEWAY,
            ScoutError::Storage(_) | ScoutError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to return to a client.
    pub fn public_message(&self) -> String {
        match self {
            ScoutError::Storage(_) | ScoutError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<FilterError> for ScoutError {
    fn from(e: FilterError) -> Self {
        ScoutError::Validation(e.to_string())
    }
}

impl From<PageError> for ScoutError {
    fn from(e: PageError) -> Self {
        ScoutError::NotFound(e.to_string())
    }
}

impl From<sqlx::Error> for ScoutError {
    fn from(e: sqlx::Error) -> Self {
        ScoutError::Storage(e.into())
    }
}

/// JSON error response body.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ScoutError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(status = status.as_u16(), error = %self, "request failed");
        }
        let body = ErrorBody {
            error: self.public_message(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ScoutError::Validation("bad".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ScoutError::product_not_found().status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ScoutError::Fetch("503".into()).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ScoutError::Parse { blocks: 3 }.status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ScoutError::Storage(anyhow::anyhow!("disk full")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_internal_detail_not_exposed() {
        let err = ScoutError::Storage(anyhow::anyhow!("no such table: products"));
        assert_eq!(err.public_message(), "Internal server error");
        assert!(err.to_string().contains("no such table"));
    }

    #[test]
    fn test_not_found_message_is_fixed() {
        assert_eq!(
            ScoutError::product_not_found().public_message(),
            "Product not found"
        );
    }
}
