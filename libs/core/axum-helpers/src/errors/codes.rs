//! Type-safe error codes for API responses.
//!
//! Each error code includes:
//! - String representation for client consumption (e.g., "VALIDATION_ERROR")
//! - Integer code for logging and monitoring (e.g., 1001)
//! - HTTP status and a default human-readable message
//!
//! # Example
//!
//! ```rust
//! use axum_helpers::errors::ErrorCode;
//!
//! let code = ErrorCode::ValidationError;
//! assert_eq!(code.as_str(), "VALIDATION_ERROR");
//! assert_eq!(code.code(), 1001);
//! assert_eq!(code.default_message(), "Request validation failed");
//! ```

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

/// Standardized error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Client errors (1000-1999)
    /// Request validation failed
    ValidationError,

    /// Multipart body could not be read
    UploadError,

    /// Requested resource was not found
    NotFound,

    /// Uploaded payload exceeds the configured limits
    PayloadTooLarge,

    // Upstream provider errors (6000-6999)
    /// Upstream rejected our credentials
    AuthenticationError,

    /// Upstream could not be reached
    ConnectivityError,

    /// Upstream did not answer in time
    TimeoutError,

    /// Server-side configuration is incomplete
    ConfigurationError,

    /// Upstream failed for another reason
    ProviderError,
}

impl ErrorCode {
    /// SCREAMING_SNAKE_CASE identifier for clients.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ValidationError => "VALIDATION_ERROR",
            Self::UploadError => "UPLOAD_ERROR",
            Self::NotFound => "NOT_FOUND",
            Self::PayloadTooLarge => "PAYLOAD_TOO_LARGE",
            Self::AuthenticationError => "AUTHENTICATION_ERROR",
            Self::ConnectivityError => "CONNECTIVITY_ERROR",
            Self::TimeoutError => "TIMEOUT_ERROR",
            Self::ConfigurationError => "CONFIGURATION_ERROR",
            Self::ProviderError => "PROVIDER_ERROR",
        }
    }

    /// Integer code for structured logs.
    ///
    /// - 1000-1999: Request errors
    /// - 6000-6999: Upstream provider errors
    pub fn code(&self) -> i32 {
        match self {
            Self::ValidationError => 1001,
            Self::UploadError => 1002,
            Self::NotFound => 1003,
            Self::PayloadTooLarge => 1004,
            Self::AuthenticationError => 6001,
            Self::ConnectivityError => 6002,
            Self::TimeoutError => 6003,
            Self::ConfigurationError => 6004,
            Self::ProviderError => 6005,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::ValidationError | Self::UploadError | Self::PayloadTooLarge => {
                StatusCode::BAD_REQUEST
            }
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::AuthenticationError => StatusCode::UNAUTHORIZED,
            Self::ConnectivityError => StatusCode::SERVICE_UNAVAILABLE,
            Self::TimeoutError => StatusCode::GATEWAY_TIMEOUT,
            Self::ConfigurationError | Self::ProviderError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn default_message(&self) -> &'static str {
        match self {
            Self::ValidationError => "Request validation failed",
            Self::UploadError => "Could not read the uploaded form",
            Self::NotFound => "The requested resource was not found",
            Self::PayloadTooLarge => "Uploaded content exceeds the allowed size",
            Self::AuthenticationError => "Authentication with the upstream service failed",
            Self::ConnectivityError => "Could not reach the upstream service",
            Self::TimeoutError => "The upstream service did not respond in time",
            Self::ConfigurationError => "The service is not fully configured",
            Self::ProviderError => "The upstream service reported an error",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
