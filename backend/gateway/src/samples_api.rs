//! Sample catalog listing.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::error::ApiError;
use crate::server::GatewayState;

#[derive(Debug, Serialize)]
pub struct SampleList {
    pub samples: Vec<String>,
}

/// Handler for `GET /api/samples`
pub async fn list_samples(State(state): State<GatewayState>) -> Result<Json<SampleList>, ApiError> {
    let samples = state.pipeline.normalizer().catalog().list().await.map_err(|e| {
        tracing::error!(error = %e, "Failed to list samples");
        ApiError::internal("failed to list sample images")
    })?;
    Ok(Json(SampleList { samples }))
}
