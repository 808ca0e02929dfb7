use thiserror::Error;

/// Failure to turn a request's image input into a [`NormalizedImage`](crate::NormalizedImage).
#[derive(Debug, Error)]
pub enum NormalizationError {
    #[error("no image or imagePath provided")]
    MissingInput,

    #[error("unsupported image type: {0}")]
    UnsupportedMediaType(String),

    #[error("sample image '{name}' is unavailable: {source}")]
    ResourceUnavailable {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

/// The model's answer parsed, but broke the result contract.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("schema violation at '{field}': {reason}")]
pub struct SchemaViolation {
    pub field: String,
    pub reason: String,
}

impl SchemaViolation {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Failure while asking the vision model or interpreting its answer.
#[derive(Debug, Error)]
pub enum ClassificationError {
    #[error("model output is not valid JSON: {0}")]
    MalformedOutput(#[source] serde_json::Error),

    #[error(transparent)]
    SchemaViolation(#[from] SchemaViolation),

    #[error("vision provider '{provider}' unavailable: {source}")]
    UpstreamUnavailable {
        provider: String,
        #[source]
        source: anyhow::Error,
    },
}

/// Any error a single classification request can end in.
///
/// All variants are terminal for the request; nothing here is retried.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Normalization(#[from] NormalizationError),

    #[error(transparent)]
    Classification(#[from] ClassificationError),
}

impl NormalizationError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingInput => "missing_input",
            Self::UnsupportedMediaType(_) => "unsupported_media_type",
            Self::ResourceUnavailable { .. } => "resource_unavailable",
        }
    }
}

impl ClassificationError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MalformedOutput(_) => "malformed_output",
            Self::SchemaViolation(_) => "schema_violation",
            Self::UpstreamUnavailable { .. } => "upstream_unavailable",
        }
    }

    pub fn upstream(provider: impl Into<String>, source: anyhow::Error) -> Self {
        Self::UpstreamUnavailable {
            provider: provider.into(),
            source,
        }
    }
}

impl PipelineError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Normalization(e) => e.kind(),
            Self::Classification(e) => e.kind(),
        }
    }
}
