//! Error types for the Blog Book server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::article::FetchError;
use crate::export::ExportError;

/// Application-wide result type
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Task error: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl AppError {
    /// Status code and client-facing message
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Export(ExportError::InvalidInput(msg)) => {
                (StatusCode::BAD_REQUEST, msg.clone())
            }
            AppError::Fetch(FetchError::InvalidUrl(msg)) => {
                (StatusCode::BAD_REQUEST, format!("Invalid URL: {}", msg))
            }
            AppError::Fetch(e) => {
                tracing::warn!("Article fetch failed: {}", e);
                (StatusCode::BAD_GATEWAY, e.to_string())
            }
            AppError::Export(e) => {
                tracing::error!("Export error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to build the book".to_string(),
                )
            }
            AppError::Join(e) => {
                tracing::error!("Background task failed: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();

        let body = Json(ErrorResponse {
            success: false,
            error: message,
            details: if cfg!(debug_assertions) {
                Some(self.to_string())
            } else {
                None
            },
        });

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_input_is_bad_request() {
        let err = AppError::from(ExportError::InvalidInput("no chapters".to_string()));
        let (status, message) = err.status_and_message();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(message, "no chapters");
    }

    #[test]
    fn test_fetch_failure_is_bad_gateway() {
        let err = AppError::from(FetchError::RetriesExhausted {
            attempts: 4,
            reason: "Upstream returned status 404".to_string(),
        });
        let (status, message) = err.status_and_message();
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(message.starts_with("Failed to fetch article after 4 attempts"));
    }

    #[tokio::test]
    async fn test_task_failures_are_redacted() {
        let join_error = tokio::spawn(async { panic!("secret path /etc/x") })
            .await
            .unwrap_err();
        let (status, message) = AppError::from(join_error).status_and_message();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(message, "An internal error occurred");
    }

    #[test]
    fn test_render_errors_are_redacted() {
        let utf8 = String::from_utf8(vec![0xff, 0xfe]).unwrap_err();
        let err = AppError::from(ExportError::from(utf8));
        let (status, message) = err.status_and_message();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(message, "Failed to build the book");
    }
}
