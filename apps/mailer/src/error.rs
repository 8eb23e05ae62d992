//! Mapping from dispatch failures to HTTP error bodies.

use axum_helpers::{AppError, ErrorCode};
use mail_dispatch::{DispatchError, ErrorKind};
use serde_json::json;

fn error_code(kind: ErrorKind) -> ErrorCode {
    match kind {
        ErrorKind::Validation => ErrorCode::ValidationError,
        ErrorKind::Configuration => ErrorCode::ConfigurationError,
        ErrorKind::Authentication => ErrorCode::AuthenticationError,
        ErrorKind::Connectivity => ErrorCode::ConnectivityError,
        ErrorKind::Timeout => ErrorCode::TimeoutError,
        ErrorKind::UnknownProvider => ErrorCode::ProviderError,
    }
}

/// `details` carries the dispatch kind tag and, when known, the provider.
pub fn dispatch_error(err: DispatchError) -> AppError {
    let kind = err.kind();
    let mut details = json!({ "kind": kind.as_str() });
    if let Some(provider) = err.provider() {
        details["provider"] = json!(provider);
    }
    if let DispatchError::UnknownProvider {
        code: Some(code), ..
    } = &err
    {
        details["providerCode"] = json!(code);
    }

    AppError::coded(error_code(kind), err.to_string()).with_details(details)
}
