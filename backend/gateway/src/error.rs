//! Boundary error mapping: every failure leaves as `{ "error": "..." }`.

use axum::{
    extract::multipart::{MultipartError, MultipartRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::{error, warn};

use propscope_core::{ClassificationError, NormalizationError, PipelineError};
use propscope_logging::redact_sensitive_data;

/// An HTTP status plus the single message shown to the caller.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    /// A failure while reading the multipart stream. Oversized bodies
    /// surface here as 413 and are reported against `limit`.
    pub fn from_multipart(err: MultipartError, limit: usize) -> Self {
        let status = err.status();
        warn!(status = %status, error = %err.body_text(), "Rejected multipart body");
        if status == StatusCode::PAYLOAD_TOO_LARGE {
            return Self::new(status, format!("upload exceeds the {limit} byte limit"));
        }
        Self::new(status, err.body_text())
    }
}

impl From<NormalizationError> for ApiError {
    fn from(err: NormalizationError) -> Self {
        let status = match &err {
            NormalizationError::MissingInput | NormalizationError::UnsupportedMediaType(_) => {
                StatusCode::BAD_REQUEST
            }
            NormalizationError::ResourceUnavailable { .. } => StatusCode::NOT_FOUND,
        };
        warn!(kind = err.kind(), error = %err, "Rejected classification input");
        // The io cause can carry absolute paths; callers only get the name.
        let message = match &err {
            NormalizationError::ResourceUnavailable { name, .. } => {
                format!("sample image '{name}' is unavailable")
            }
            other => other.to_string(),
        };
        Self::new(status, message)
    }
}

impl From<ClassificationError> for ApiError {
    fn from(err: ClassificationError) -> Self {
        match &err {
            ClassificationError::SchemaViolation(violation) => {
                warn!(field = %violation.field, reason = %violation.reason, "Model answer broke the result contract");
                Self::new(StatusCode::UNPROCESSABLE_ENTITY, violation.to_string())
            }
            ClassificationError::MalformedOutput(_) => {
                warn!(error = %err, "Model answer was not JSON");
                Self::new(StatusCode::BAD_GATEWAY, "vision model returned malformed output")
            }
            ClassificationError::UpstreamUnavailable { provider, source } => {
                error!(provider = %provider, error = %redact_sensitive_data(&format!("{source:#}")), "Vision provider unavailable");
                Self::new(
                    StatusCode::BAD_GATEWAY,
                    format!("vision provider '{provider}' is unavailable"),
                )
            }
        }
    }
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::Normalization(e) => e.into(),
            PipelineError::Classification(e) => e.into(),
        }
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        warn!(error = %rejection.body_text(), "Request is not multipart/form-data");
        Self::new(rejection.status(), rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({ "error": redact_sensitive_data(&self.message) }));
        (self.status, body).into_response()
    }
}
