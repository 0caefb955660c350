//! Error types for the catalog server
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::catalog::RepoError;

// == Catalog Error Enum ==
/// Unified error type for the HTTP layer.
///
/// Cache operations never produce one of these; only the backing store and
/// request validation do.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Requested entity does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Backing store failure
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<RepoError> for CatalogError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(what) => CatalogError::NotFound(what),
            RepoError::InvalidInput(msg) => CatalogError::InvalidRequest(msg),
            RepoError::Persistence(msg) => CatalogError::Internal(msg),
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for CatalogError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            CatalogError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            CatalogError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            CatalogError::Internal(msg) => {
                tracing::error!(error = %msg, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error".to_string())
            }
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the HTTP layer.
pub type Result<T> = std::result::Result<T, CatalogError>;
