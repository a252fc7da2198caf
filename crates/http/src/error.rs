//! Error handling for the bookshelf HTTP layer

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::{format_description::well_known::Rfc3339, OffsetDateTime};

/// Standard error response format for all HTTP errors
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub timestamp: String,
    pub status: u16,
    pub error: String,
    pub message: String,
    pub path: String,
}

/// Application error types that map to HTTP responses
#[derive(Error, Debug)]
pub enum AppError {
    /// Request shape or field constraint violation
    #[error("validation error: {message}")]
    Validation {
        message: String,
        path: Option<String>,
    },

    /// Semantically invalid input
    #[error("invalid input: {message}")]
    InvalidInput {
        message: String,
        path: Option<String>,
    },

    #[error("not found: {message}")]
    NotFound {
        message: String,
        path: Option<String>,
    },

    #[error("{cause}")]
    Internal {
        cause: anyhow::Error,
        path: Option<String>,
    },
}

impl AppError {
    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            path: None,
        }
    }

    /// Create an invalid input error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
            path: None,
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
            path: None,
        }
    }

    /// Attach the request path reported in the error body
    pub fn at(mut self, request_path: impl Into<String>) -> Self {
        let request_path = Some(request_path.into());
        match &mut self {
            Self::Validation { path, .. }
            | Self::InvalidInput { path, .. }
            | Self::NotFound { path, .. }
            | Self::Internal { path, .. } => *path = request_path,
        }
        self
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation { .. } | Self::InvalidInput { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Error category reported in the `error` field of the body
    pub fn category(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "Bad Request",
            Self::InvalidInput { .. } => "Invalid Input",
            Self::NotFound { .. } => "Not Found",
            Self::Internal { .. } => "Internal Server Error",
        }
    }

    fn into_body(self) -> ErrorBody {
        let now = OffsetDateTime::now_utc();
        let timestamp = now.format(&Rfc3339).unwrap_or_else(|_| now.to_string());
        let status = self.status();
        let error = self.category().to_string();

        let (message, path) = match self {
            Self::Validation { message, path }
            | Self::InvalidInput { message, path }
            | Self::NotFound { message, path } => (message, path),
            Self::Internal { cause, path } => {
                // Hide internal error details outside debug builds
                let message = if cfg!(debug_assertions) {
                    cause.to_string()
                } else {
                    "An internal server error occurred".to_string()
                };
                (message, path)
            }
        };

        ErrorBody {
            timestamp,
            status: status.as_u16(),
            error,
            message,
            path: path.unwrap_or_default(),
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(cause: anyhow::Error) -> Self {
        Self::Internal { cause, path: None }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            tracing::error!(
                status_code = %status.as_u16(),
                error = %self,
                "Request error"
            );
        } else {
            tracing::warn!(
                status_code = %status.as_u16(),
                error = %self,
                "Request rejected"
            );
        }

        (status, Json(self.into_body())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_of(response: Response) -> ErrorBody {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_validation_error() {
        let error = AppError::validation("Title cannot exceed 100 characters");

        match error {
            AppError::Validation { message, path } => {
                assert_eq!(message, "Title cannot exceed 100 characters");
                assert_eq!(path, None);
            }
            _ => panic!("Expected Validation error"),
        }
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(AppError::validation("x").status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::invalid_input("x").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AppError::not_found("x").status(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::from(anyhow::anyhow!("db down")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_error_body_shape() {
        let response = AppError::not_found("Book not found with id: 42")
            .at("/api/books/42")
            .into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = body_of(response).await;
        assert_eq!(body.status, 404);
        assert_eq!(body.error, "Not Found");
        assert_eq!(body.message, "Book not found with id: 42");
        assert_eq!(body.path, "/api/books/42");
        assert!(OffsetDateTime::parse(&body.timestamp, &Rfc3339).is_ok());
    }

    #[tokio::test]
    async fn test_invalid_input_category() {
        let response = AppError::invalid_input("Title cannot be blank").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_of(response).await;
        assert_eq!(body.error, "Invalid Input");
        assert_eq!(body.path, "");
    }

    #[tokio::test]
    async fn test_internal_error_mapping() {
        let response = AppError::from(anyhow::anyhow!("Database connection failed"))
            .at("/api/books/check")
            .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_of(response).await;
        assert_eq!(body.status, 500);
        assert_eq!(body.error, "Internal Server Error");
    }
}
