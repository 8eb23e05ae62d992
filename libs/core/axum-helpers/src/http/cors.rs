use axum::http::{Method, header};
use std::time::Duration;
use tower_http::cors::{AllowOrigin, CorsLayer};

/// CORS layer for a browser form served from anywhere.
///
/// Reflects the request origin so credentials stay allowed, which a
/// wildcard origin would forbid. GET, POST and OPTIONS with a Content-Type
/// header, preflight cached for an hour.
pub fn create_form_cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600))
}
