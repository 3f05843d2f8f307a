//! Server error types with HTTP status code mapping

use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use lexicon_core::db::DbError;
use lexicon_core::{ImportError, RepoError};
use log::error;
use serde::Serialize;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ServerError>;

#[derive(Error, Debug)]
pub enum ServerError {
    /// Import pipeline error
    #[error("{0}")]
    Import(#[from] ImportError),

    /// Category or word store error
    #[error("{0}")]
    Repo(#[from] RepoError),

    #[error("{0}")]
    Db(#[from] DbError),

    /// Multipart body could not be read
    #[error("{message}")]
    Multipart { status: StatusCode, message: String },

    /// Import did not finish within the configured time
    #[error("Import timed out after {0} seconds")]
    ImportTimeout(u64),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServerError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServerError::Import(ImportError::NoFile) => StatusCode::BAD_REQUEST,
            ServerError::Import(ImportError::UploadTooLarge { .. }) => {
                StatusCode::PAYLOAD_TOO_LARGE
            }
            ServerError::Import(ImportError::Cancelled) => StatusCode::REQUEST_TIMEOUT,
            // Content type and CSV format failures stay 500 for API compatibility.
            ServerError::Import(_) => StatusCode::INTERNAL_SERVER_ERROR,

            ServerError::Repo(RepoError::NotFound { .. }) => StatusCode::NOT_FOUND,
            ServerError::Repo(RepoError::CategoryNotFound(_)) => StatusCode::NOT_FOUND,
            ServerError::Repo(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServerError::Db(_) => StatusCode::INTERNAL_SERVER_ERROR,

            ServerError::Multipart { status, .. } => *status,
            ServerError::ImportTimeout(_) => StatusCode::REQUEST_TIMEOUT,
            ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        ServerError::Internal(msg.into())
    }
}

impl From<MultipartError> for ServerError {
    fn from(err: MultipartError) -> Self {
        ServerError::Multipart {
            status: err.status(),
            message: err.body_text(),
        }
    }
}

/// JSON error response body
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(
                "event=http_error module=server status={} error={}",
                status.as_u16(),
                self
            );
        }
        let body = ErrorResponse {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn import_errors_map_to_expected_status() {
        assert_eq!(
            ServerError::from(ImportError::NoFile).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServerError::from(ImportError::UploadTooLarge { size: 2, limit: 1 }).status_code(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            ServerError::from(ImportError::InvalidContentType(None)).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ServerError::from(ImportError::MissingFields { line: 2 }).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ServerError::from(ImportError::Cancelled).status_code(),
            StatusCode::REQUEST_TIMEOUT
        );
        assert_eq!(
            ServerError::ImportTimeout(30).status_code(),
            StatusCode::REQUEST_TIMEOUT
        );
    }

    #[test]
    fn not_found_maps_to_404() {
        let err = ServerError::from(RepoError::NotFound {
            entity: "category",
            id: "food".to_string(),
        });
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "category not found: food");
    }
}
