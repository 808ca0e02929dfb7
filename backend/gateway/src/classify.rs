//! `POST /api/classify-interior-image`: multipart in, classification out.

use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    Json,
};
use tracing::{debug, error, info, instrument, Instrument};

use propscope_core::{ClassificationResult, ImageInput, Upload};

use crate::error::ApiError;
use crate::server::GatewayState;

/// Multipart field carrying the uploaded photo.
pub const IMAGE_FIELD: &str = "image";
/// Multipart field naming a catalogued sample.
pub const IMAGE_PATH_FIELD: &str = "imagePath";

/// Classify one photo, uploaded or referenced by sample name.
///
/// The pipeline runs on its own task, so a client that hangs up does not
/// cancel a provider call already in flight.
#[instrument(skip_all, fields(request_id = %uuid::Uuid::new_v4()))]
pub async fn classify_image(
    State(state): State<GatewayState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ClassificationResult>, ApiError> {
    let input = read_input(multipart?, state.max_upload_bytes).await?;

    let pipeline = Arc::clone(&state.pipeline);
    let result = tokio::spawn(async move { pipeline.run(input).await }.in_current_span())
        .await
        .map_err(|e| {
            error!(error = %e, "Classification task did not finish");
            ApiError::internal("classification task failed")
        })??;

    info!(
        location_type = %result.location_type(),
        space_type = %result.space_label(),
        "Classified image"
    );
    Ok(Json(result))
}

/// Pull the `image` and `imagePath` fields out of the form. Unknown fields
/// are drained and ignored.
async fn read_input(mut multipart: Multipart, limit: usize) -> Result<ImageInput, ApiError> {
    let mut upload = None;
    let mut reference = None;
    let multipart_error = |e| ApiError::from_multipart(e, limit);

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some(IMAGE_FIELD) => {
                let content_type = field.content_type().map(str::to_string);
                let file_name = field.file_name().map(str::to_string);
                let bytes = field.bytes().await.map_err(multipart_error)?;
                debug!(size = bytes.len(), content_type = ?content_type, "Received image upload");
                let mut part = Upload::new(bytes, content_type);
                if let Some(name) = file_name {
                    part = part.with_file_name(name);
                }
                upload = Some(part);
            }
            Some(IMAGE_PATH_FIELD) => {
                reference = Some(field.text().await.map_err(multipart_error)?)
            }
            other => {
                debug!(field = ?other, "Ignoring unknown multipart field");
                field.bytes().await.map_err(multipart_error)?;
            }
        }
    }

    Ok(ImageInput::from_parts(upload, reference)?)
}
