//! HTTP middleware module.
//!
//! - CORS configuration
//! - Security headers
//!
//! # Example
//!
//! ```ignore
//! use axum_helpers::http::{create_form_cors_layer, security_headers};
//!
//! let app = Router::new()
//!     .layer(axum::middleware::from_fn(security_headers))
//!     .layer(create_form_cors_layer());
//! ```

pub mod cors;
pub mod security;

pub use cors::create_form_cors_layer;
pub use security::security_headers;
