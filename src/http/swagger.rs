//! Swagger definition file server.
//!
//! Serves `GET /swagger/{file}.swagger.json` from the configured directory.
//! Anything without the `.swagger.json` suffix, or not on disk, is a 404.
//! Path traversal is rejected by `ServeDir`.

use std::path::Path;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    Router,
};
use tower_http::services::ServeDir;

pub const SWAGGER_PREFIX: &str = "/swagger";
pub const SWAGGER_SUFFIX: &str = ".swagger.json";

/// Router serving swagger files from `dir` under `/swagger`.
pub fn swagger_router(dir: impl AsRef<Path>) -> Router {
    tracing::debug!(dir = %dir.as_ref().display(), "Serving swagger definitions");
    Router::new()
        .nest_service(SWAGGER_PREFIX, ServeDir::new(dir))
        .layer(middleware::from_fn(require_swagger_suffix))
}

async fn require_swagger_suffix(req: Request<Body>, next: Next) -> Response {
    if !req.uri().path().ends_with(SWAGGER_SUFFIX) {
        tracing::debug!(path = %req.uri().path(), "Not a swagger definition");
        return StatusCode::NOT_FOUND.into_response();
    }
    next.run(req).await
}
