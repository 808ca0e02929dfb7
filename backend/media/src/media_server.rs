//! Sample server: serves catalog images over HTTP.
//!
//! Provides a small Axum router that serves sample photos by name so a
//! front-end can show the image it is about to submit by reference.

use axum::{
    extract::{Path, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use std::io;
use tracing::warn;

use propscope_core::NormalizationError;

use crate::catalog::SampleCatalog;
use crate::mime_detect::detect_mime_type;

/// Build the sample router.
///
/// Mount at `/images` prefix:
///   GET /images/:name  serves a sample image
pub fn sample_router(catalog: SampleCatalog) -> Router {
    Router::new()
        .route("/:name", get(serve_sample))
        .with_state(catalog)
}

/// GET /:name: read a sample from the catalog.
async fn serve_sample(Path(name): Path<String>, State(catalog): State<SampleCatalog>) -> Response {
    match catalog.read(&name).await {
        Ok(bytes) => {
            let mime = detect_mime_type(std::path::Path::new(&name));
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, HeaderValue::from_static(mime)),
                    (header::CACHE_CONTROL, HeaderValue::from_static("public, max-age=86400")),
                ],
                bytes,
            )
                .into_response()
        }
        Err(NormalizationError::ResourceUnavailable { source, .. }) => match source.kind() {
            io::ErrorKind::NotFound => error_response(StatusCode::NOT_FOUND, "sample not found"),
            io::ErrorKind::InvalidInput => {
                error_response(StatusCode::BAD_REQUEST, "invalid sample name")
            }
            _ => {
                warn!(sample = %name, error = %source, "Failed to read sample");
                error_response(StatusCode::INTERNAL_SERVER_ERROR, "failed to read sample")
            }
        },
        Err(e) => {
            warn!(sample = %name, error = %e, "Failed to read sample");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "failed to read sample")
        }
    }
}

/// Same `{ "error": ... }` shape as the API routes.
fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    #[tokio::test]
    async fn serves_sample_with_headers() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("garden.jpg"), b"jpeg-bytes").unwrap();
        let app = sample_router(SampleCatalog::new(dir.path()));

        let response = app
            .oneshot(Request::get("/garden.jpg").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "image/jpeg");
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"jpeg-bytes");
    }

    #[tokio::test]
    async fn missing_sample_is_404() {
        let dir = tempfile::tempdir().unwrap();
        let app = sample_router(SampleCatalog::new(dir.path()));
        let response = app
            .oneshot(Request::get("/nope.jpg").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "sample not found");
    }

    #[tokio::test]
    async fn traversal_is_400() {
        let dir = tempfile::tempdir().unwrap();
        let app = sample_router(SampleCatalog::new(dir.path()));
        let response = app
            .oneshot(Request::get("/..%2Fsecret.jpg").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
