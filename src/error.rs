use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Application-level errors
///
/// Only `NotFound` (unknown selection) and `DataIntegrity` (bad dataset at load
/// time) are hard failures of the recommendation flow. Metadata problems never
/// show up here; they are absorbed by the metadata gateway.
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("unknown selection: {0}")]
    NotFound(String),

    #[error("Data integrity error: {0}")]
    DataIntegrity(String),

    #[error("Index {index} out of range for catalog of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::IndexOutOfRange { .. }
            | AppError::DataIntegrity(_)
            | AppError::Cache(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

/// Failures talking to the external metadata provider
///
/// These never leave the metadata gateway: they are logged and replaced with an
/// empty metadata record.
#[derive(thiserror::Error, Debug)]
pub enum MetadataError {
    #[error("metadata request timed out after {0} ms")]
    Timeout(u64),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("metadata provider returned status {0}")]
    Status(u16),

    #[error("malformed metadata response: {0}")]
    Malformed(String),
}

impl MetadataError {
    /// Whether a retry within the same request has a chance of succeeding
    pub fn is_transient(&self) -> bool {
        match self {
            MetadataError::Timeout(_) => true,
            MetadataError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            MetadataError::Status(code) => *code == 429 || *code >= 500,
            MetadataError::Malformed(_) => false,
        }
    }
}
