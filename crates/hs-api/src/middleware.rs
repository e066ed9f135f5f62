//! Cross-cutting HTTP layers.

use axum::http::{header::CONTENT_TYPE, Method};
use tower_http::cors::{Any, CorsLayer};

/// Wide-open CORS: the frontend is served from a different origin during
/// development. Tighten per deployment.
pub fn cors_policy() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([CONTENT_TYPE])
}
