//! Main HTTP gateway server and route table.

use anyhow::Result;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, instrument};

use propscope_media::sample_router;
use propscope_understanding::ClassificationPipeline;

use crate::{classify, health_api, samples_api};

/// Application state shared across routes.
#[derive(Clone)]
pub struct GatewayState {
    pub pipeline: Arc<ClassificationPipeline>,
    /// Largest accepted multipart body on the classify routes.
    pub max_upload_bytes: usize,
    pub started_at: Instant,
}

impl GatewayState {
    pub fn new(pipeline: ClassificationPipeline, max_upload_bytes: usize) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            max_upload_bytes,
            started_at: Instant::now(),
        }
    }
}

/// Build the Axum router with all routes.
pub fn build_router(state: GatewayState) -> Router {
    let max_upload_bytes = state.max_upload_bytes;
    let catalog = state.pipeline.normalizer().catalog().clone();

    let api = Router::new()
        .route("/api/classify-interior-image", post(classify::classify_image))
        .route("/api/classify", post(classify::classify_image))
        .route("/api/samples", get(samples_api::list_samples))
        .route("/api/health", get(health_api::get_health))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(state);

    api.nest("/images", sample_router(catalog))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Starts the HTTP server and runs until ctrl-c.
#[instrument(skip(state))]
pub async fn start_server(addr: SocketAddr, state: GatewayState) -> Result<()> {
    let app = build_router(state);

    let listener = TcpListener::bind(&addr).await?;
    info!("Gateway HTTP server listening on {}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received");
        })
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    use propscope_media::{Normalizer, SampleCatalog};
    use propscope_understanding::providers::MockVisionProvider;
    use propscope_understanding::{Classifier, ClassifierOptions};

    const BOUNDARY: &str = "propscope-test-boundary";

    fn app(dir: &std::path::Path, provider: Arc<MockVisionProvider>) -> Router {
        app_with_limit(dir, provider, 1024 * 1024)
    }

    fn app_with_limit(
        dir: &std::path::Path,
        provider: Arc<MockVisionProvider>,
        max_upload_bytes: usize,
    ) -> Router {
        let pipeline = ClassificationPipeline::new(
            Normalizer::new(SampleCatalog::new(dir)),
            Classifier::new(provider, ClassifierOptions::default()),
        );
        build_router(GatewayState::new(pipeline, max_upload_bytes))
    }

    enum Part<'a> {
        File { content_type: &'a str, file_name: &'a str, bytes: &'a [u8] },
        Text(&'a str),
    }

    fn multipart_body(parts: &[(&str, Part<'_>)]) -> Vec<u8> {
        let mut body = Vec::new();
        for (name, part) in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            match part {
                Part::File { content_type, file_name, bytes } => {
                    body.extend_from_slice(
                        format!(
                            "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
                        )
                        .as_bytes(),
                    );
                    body.extend_from_slice(bytes);
                }
                Part::Text(value) => {
                    body.extend_from_slice(
                        format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}").as_bytes(),
                    );
                }
            }
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn classify_request(body: Vec<u8>) -> Request<Body> {
        Request::post("/api/classify-interior-image")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn classifies_uploaded_image() {
        let dir = tempfile::tempdir().unwrap();
        let provider = Arc::new(MockVisionProvider::new("mock").with_response(
            r#"{"locationType":"interior","spaceType":"Kitchen","features":{"fireHazards":true}}"#,
        ));
        let body = multipart_body(&[(
            "image",
            Part::File { content_type: "image/png", file_name: "kitchen.png", bytes: b"\x89PNG" },
        )]);

        let response = app(dir.path(), provider.clone())
            .oneshot(classify_request(body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = json_body(response).await;
        assert_eq!(json["locationType"], "interior");
        assert_eq!(json["spaceType"], "Kitchen");
        assert_eq!(json["features"]["fireHazards"], true);
        assert_eq!(json["features"]["visibleMold"], false);
        assert_eq!(json["features"].as_object().unwrap().len(), 12);
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn classifies_referenced_sample() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("yard.jpg"), b"jpeg").unwrap();
        let provider = Arc::new(MockVisionProvider::new("mock").with_response(
            r#"{"locationType":"exterior","spaceType":"Rock garden","features":{}}"#,
        ));
        let body = multipart_body(&[("imagePath", Part::Text("yard.jpg"))]);

        let response = app(dir.path(), provider).oneshot(classify_request(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["features"].as_object().unwrap().len(), 15);
    }

    #[tokio::test]
    async fn missing_input_is_bad_request() {
        let dir = tempfile::tempdir().unwrap();
        let provider = Arc::new(MockVisionProvider::new("mock"));
        let body = multipart_body(&[("comment", Part::Text("nothing attached"))]);

        let response = app(dir.path(), provider.clone())
            .oneshot(classify_request(body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(json_body(response).await["error"].is_string());
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn unsupported_type_is_rejected_before_the_model() {
        let dir = tempfile::tempdir().unwrap();
        let provider = Arc::new(MockVisionProvider::new("mock"));
        let body = multipart_body(&[(
            "image",
            Part::File { content_type: "image/bmp", file_name: "scan.bmp", bytes: b"BM" },
        )]);

        let response = app(dir.path(), provider.clone())
            .oneshot(classify_request(body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn unknown_sample_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let provider = Arc::new(MockVisionProvider::new("mock"));
        let body = multipart_body(&[("imagePath", Part::Text("attic.jpg"))]);

        let response = app(dir.path(), provider).oneshot(classify_request(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn schema_violation_is_unprocessable() {
        let dir = tempfile::tempdir().unwrap();
        let provider = Arc::new(MockVisionProvider::new("mock").with_response(
            r#"{"locationType":"interior","spaceType":"Ballroom","features":{}}"#,
        ));
        let body = multipart_body(&[(
            "image",
            Part::File { content_type: "image/jpeg", file_name: "room.jpg", bytes: b"jpeg" },
        )]);

        let response = app(dir.path(), provider).oneshot(classify_request(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let json = json_body(response).await;
        assert!(json["error"].as_str().unwrap().contains("spaceType"));
    }

    #[tokio::test]
    async fn upstream_failure_is_bad_gateway_with_error_only() {
        let dir = tempfile::tempdir().unwrap();
        let provider = Arc::new(MockVisionProvider::new("mock").failing("quota exceeded"));
        let body = multipart_body(&[(
            "image",
            Part::File { content_type: "image/webp", file_name: "room.webp", bytes: b"RIFF" },
        )]);

        let response = app(dir.path(), provider).oneshot(classify_request(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let json = json_body(response).await;
        let object = json.as_object().unwrap();
        assert_eq!(object.len(), 1);
        assert!(object.contains_key("error"));
    }

    #[tokio::test]
    async fn lists_samples_and_serves_images() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.jpg"), b"jpeg-b").unwrap();
        std::fs::write(dir.path().join("a.jpg"), b"jpeg-a").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"skip").unwrap();
        let router = app(dir.path(), Arc::new(MockVisionProvider::new("mock")));

        let response = router
            .clone()
            .oneshot(Request::get("/api/samples").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["samples"], serde_json::json!(["a.jpg", "b.jpg"]));

        let response = router
            .oneshot(Request::get("/images/a.jpg").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "image/jpeg");
    }

    #[tokio::test]
    async fn health_reports_provider() {
        let dir = tempfile::tempdir().unwrap();
        let response = app(dir.path(), Arc::new(MockVisionProvider::new("mock")))
            .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["provider"], "mock");
    }

    #[tokio::test]
    async fn non_multipart_body_gets_json_error() {
        let dir = tempfile::tempdir().unwrap();
        let provider = Arc::new(MockVisionProvider::new("mock"));
        let request = Request::post("/api/classify-interior-image")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"imagePath":"yard.jpg"}"#))
            .unwrap();

        let response = app(dir.path(), provider.clone()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(response.headers()[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("application/json"));
        assert!(json_body(response).await["error"].is_string());
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn oversized_upload_is_payload_too_large() {
        let dir = tempfile::tempdir().unwrap();
        let provider = Arc::new(MockVisionProvider::new("mock"));
        let image = vec![0u8; 8 * 1024];
        let body = multipart_body(&[(
            "image",
            Part::File { content_type: "image/jpeg", file_name: "huge.jpg", bytes: &image },
        )]);

        let response = app_with_limit(dir.path(), provider.clone(), 1024)
            .oneshot(classify_request(body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        let json = json_body(response).await;
        assert!(json["error"].as_str().unwrap().contains("1024 byte limit"));
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn abandoned_request_still_finishes_provider_call() {
        let dir = tempfile::tempdir().unwrap();
        let provider = Arc::new(
            MockVisionProvider::new("mock").with_delay(std::time::Duration::from_millis(100)),
        );
        let body = multipart_body(&[(
            "image",
            Part::File { content_type: "image/png", file_name: "room.png", bytes: b"\x89PNG" },
        )]);
        let router = app(dir.path(), provider.clone());

        let request = tokio::spawn(async move { router.oneshot(classify_request(body)).await });
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        request.abort();
        tokio::time::sleep(std::time::Duration::from_millis(300)).await;

        assert_eq!(provider.calls(), 1);
        assert_eq!(provider.completed(), 1);
    }
}
