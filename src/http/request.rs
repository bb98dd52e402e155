//! Request handling.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4) and echo it on the response
//! - Extract the headers forwarded to the backend as call metadata
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - A client-supplied `x-request-id` is kept, not replaced
//! - Header names match case-insensitively; values that are not visible
//!   ASCII are dropped rather than failing the request

use axum::http::{HeaderMap, HeaderName};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};

pub const X_REQUEST_ID: &str = "x-request-id";

/// Layer that assigns `x-request-id` when the client sent none.
pub fn set_request_id_layer() -> SetRequestIdLayer<MakeRequestUuid> {
    SetRequestIdLayer::x_request_id(MakeRequestUuid)
}

/// Layer that copies `x-request-id` onto the response.
pub fn propagate_request_id_layer() -> PropagateRequestIdLayer {
    PropagateRequestIdLayer::x_request_id()
}

/// The request ID assigned by [`set_request_id_layer`].
pub fn request_id(headers: &HeaderMap) -> String {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string())
}

/// Collect `(lowercase name, value)` pairs for every forwarded header present.
pub fn forwarded_metadata(headers: &HeaderMap, names: &[HeaderName]) -> Vec<(String, String)> {
    let mut metadata = Vec::new();
    for name in names {
        for value in headers.get_all(name) {
            match value.to_str() {
                Ok(value) => metadata.push((name.as_str().to_string(), value.to_string())),
                Err(_) => tracing::debug!(header = %name, "Skipping non-ASCII header value"),
            }
        }
    }
    metadata
}
