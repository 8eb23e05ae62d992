pub mod codes;
pub mod handlers;

pub use codes::ErrorCode;

use axum::{
    Json,
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// Standard error response structure.
///
/// - `code`: Integer error code for logging/monitoring (e.g., 6001)
/// - `error`: Machine-readable error identifier (e.g., "AUTHENTICATION_ERROR")
/// - `message`: Human-readable error message
/// - `details`: Optional additional error details
///
/// # JSON Example
///
/// ```json
/// {
///   "code": 1001,
///   "error": "VALIDATION_ERROR",
///   "message": "Missing required fields: subject",
///   "details": null
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Integer error code for logging and monitoring
    pub code: i32,
    /// Machine-readable error identifier for programmatic handling
    pub error: String,
    /// Human-readable error message
    pub message: String,
    /// Optional structured error details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Application error type that can be converted to HTTP responses.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppError {
    #[error("Multipart error: {0}")]
    Multipart(#[from] MultipartError),

    #[error("Payload Too Large: {0}")]
    PayloadTooLarge(String),

    /// Error with an explicit code and optional details, e.g. mapped upstream failures.
    #[error("{message}")]
    Coded {
        code: ErrorCode,
        message: String,
        details: Option<serde_json::Value>,
    },
}

impl AppError {
    pub fn coded(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Coded {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Attach details to a [`AppError::Coded`]; other variants are returned unchanged.
    pub fn with_details(self, value: serde_json::Value) -> Self {
        match self {
            Self::Coded { code, message, .. } => Self::Coded {
                code,
                message,
                details: Some(value),
            },
            other => other,
        }
    }

    fn parts(self) -> (ErrorCode, String, Option<serde_json::Value>) {
        match self {
            AppError::Multipart(e) => {
                tracing::warn!(
                    error_code = ErrorCode::UploadError.code(),
                    "Multipart error: {}",
                    e
                );
                (ErrorCode::UploadError, e.body_text(), None)
            }
            AppError::PayloadTooLarge(msg) => {
                tracing::info!("Payload too large: {}", msg);
                (ErrorCode::PayloadTooLarge, msg, None)
            }
            AppError::Coded {
                code,
                message,
                details,
            } => {
                if code.status().is_server_error() {
                    tracing::error!(error_code = code.code(), "{}: {}", code, message);
                } else {
                    tracing::info!(error_code = code.code(), "{}: {}", code, message);
                }
                (code, message, details)
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (code, message, details) = self.parts();

        let body = Json(ErrorResponse {
            code: code.code(),
            error: code.as_str().to_string(),
            message,
            details,
        });

        (code.status(), body).into_response()
    }
}

/// Helper function to create error responses.
pub fn error_response(status: StatusCode, message: String, error_code: ErrorCode) -> Response {
    let body = Json(ErrorResponse {
        code: error_code.code(),
        error: error_code.as_str().to_string(),
        message,
        details: None,
    });

    (status, body).into_response()
}
