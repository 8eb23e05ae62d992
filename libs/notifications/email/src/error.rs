//! Error types for mail dispatch.
//!
//! [`DispatchError`] is what callers of the dispatcher see. [`TransportError`]
//! is the narrower failure reported by a transport and gets classified into a
//! dispatch error together with the provider it came from.

use crate::provider::Provider;
use thiserror::Error;

/// Result type for dispatch operations.
pub type DispatchResult<T> = Result<T, DispatchError>;

/// Stable, machine-readable category of a [`DispatchError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    Configuration,
    Authentication,
    Connectivity,
    Timeout,
    UnknownProvider,
}

impl ErrorKind {
    /// Tag surfaced to clients in error bodies.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "validation_error",
            Self::Configuration => "configuration_error",
            Self::Authentication => "authentication_error",
            Self::Connectivity => "connectivity_error",
            Self::Timeout => "timeout_error",
            Self::UnknownProvider => "unknown_provider_error",
        }
    }

    /// HTTP status the front end should answer with.
    pub fn status_hint(&self) -> StatusHint {
        match self {
            Self::Validation => StatusHint::BadRequest,
            Self::Authentication => StatusHint::Unauthorized,
            Self::Connectivity => StatusHint::ServiceUnavailable,
            Self::Timeout => StatusHint::GatewayTimeout,
            Self::Configuration | Self::UnknownProvider => StatusHint::InternalError,
        }
    }
}

/// Transport-agnostic status hint; the HTTP layer maps it to a real status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusHint {
    BadRequest,
    Unauthorized,
    ServiceUnavailable,
    GatewayTimeout,
    InternalError,
}

impl StatusHint {
    pub fn as_u16(&self) -> u16 {
        match self {
            Self::BadRequest => 400,
            Self::Unauthorized => 401,
            Self::ServiceUnavailable => 503,
            Self::GatewayTimeout => 504,
            Self::InternalError => 500,
        }
    }
}

/// Errors surfaced by [`Dispatcher::send`](crate::Dispatcher::send).
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Missing message fields, malformed addresses or an unknown provider token.
    #[error("Validation error: {0}")]
    Validation(String),

    /// No usable sender address, or the provider cannot be used at all.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The provider rejected the configured credentials.
    #[error("{provider} authentication failed: {message}")]
    Authentication { provider: Provider, message: String },

    /// Network or connection failure while talking to the provider.
    #[error("Could not connect to {provider}: {message}")]
    Connectivity { provider: Provider, message: String },

    /// The provider did not answer in time.
    #[error("Connection to {provider} timed out: {message}")]
    Timeout { provider: Provider, message: String },

    /// Any other transport failure; the provider diagnostic is kept verbatim.
    #[error("Email error from {provider}: {message}")]
    UnknownProvider {
        provider: Provider,
        message: String,
        code: Option<String>,
    },
}

impl DispatchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::Configuration(_) => ErrorKind::Configuration,
            Self::Authentication { .. } => ErrorKind::Authentication,
            Self::Connectivity { .. } => ErrorKind::Connectivity,
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::UnknownProvider { .. } => ErrorKind::UnknownProvider,
        }
    }

    pub fn status_hint(&self) -> StatusHint {
        self.kind().status_hint()
    }

    /// Provider the failure came from, if any.
    pub fn provider(&self) -> Option<Provider> {
        match self {
            Self::Validation(_) | Self::Configuration(_) => None,
            Self::Authentication { provider, .. }
            | Self::Connectivity { provider, .. }
            | Self::Timeout { provider, .. }
            | Self::UnknownProvider { provider, .. } => Some(*provider),
        }
    }

    /// Classify a send-time transport failure for `provider`.
    pub fn from_transport(provider: Provider, err: TransportError) -> Self {
        let TransportError {
            kind,
            message,
            code,
        } = err;
        match kind {
            TransportErrorKind::Authentication => Self::Authentication { provider, message },
            TransportErrorKind::Connection => Self::Connectivity { provider, message },
            TransportErrorKind::Timeout => Self::Timeout { provider, message },
            TransportErrorKind::InvalidMessage => Self::Validation(message),
            TransportErrorKind::Other => Self::UnknownProvider {
                provider,
                message,
                code,
            },
        }
    }
}

/// What went wrong inside a transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    Authentication,
    Connection,
    Timeout,
    /// The message could not be turned into a valid email (bad address, header).
    InvalidMessage,
    Other,
}

/// Failure reported by a [`MailTransport`](crate::transport::MailTransport).
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
    /// SMTP reply code, when the server answered with one.
    pub code: Option<String>,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            code: None,
        }
    }

    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Authentication, message)
    }

    pub fn connection(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Connection, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Timeout, message)
    }

    pub fn invalid_message(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::InvalidMessage, message)
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Other, message)
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }
}
