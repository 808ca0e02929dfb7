//! Gateway health endpoint.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::server::GatewayState;

#[derive(Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub provider: String,
    pub model: String,
    pub uptime_seconds: u64,
}

/// Handler for `GET /api/health`
pub async fn get_health(State(state): State<GatewayState>) -> Json<HealthReport> {
    let classifier = state.pipeline.classifier();
    Json(HealthReport {
        status: "ok",
        service: "propscope",
        version: env!("CARGO_PKG_VERSION"),
        provider: classifier.provider_name().to_string(),
        model: classifier.options().model.clone(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
    })
}
