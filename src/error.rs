use axum::{http::StatusCode, response::IntoResponse, response::Response, Json};
use thiserror::Error;

use crate::models::ErrorResponse;

/// Errors produced while serving a request. Every variant is local to one
/// request; none of them take the process down.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Duplicate course code or duplicate resource reference.
    #[error("{0}")]
    Conflict(String),

    /// Unknown course, or no resources for a course/category pair.
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),

    #[error("database pool error: {0}")]
    Pool(String),

    #[error("migration error: {0}")]
    Migration(String),
}

impl ServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::Conflict(_) | ServiceError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Database(_) | ServiceError::Pool(_) | ServiceError::Migration(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        (status, Json(ErrorResponse { error: self.to_string() })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_map_to_4xx() {
        assert_eq!(
            ServiceError::Conflict("Course code must be unique".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServiceError::InvalidInput("blank".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServiceError::NotFound("Course does not exist".into()).status_code(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn store_failures_map_to_500() {
        assert_eq!(
            ServiceError::Database(diesel::result::Error::RollbackTransaction).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ServiceError::Pool("timed out".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn client_error_message_is_the_reason() {
        let err = ServiceError::Conflict("This file already exists in the database.".into());
        assert_eq!(err.to_string(), "This file already exists in the database.");
    }
}
