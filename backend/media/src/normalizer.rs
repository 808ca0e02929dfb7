//! Input normalizer: upload or sample reference in, base64 image out.

use std::path::Path;

use tracing::debug;

use propscope_core::{ImageInput, MediaType, NormalizationError, NormalizedImage, Upload};

use crate::catalog::SampleCatalog;
use crate::mime_detect::{detect_mime_type, media_type_for_path};

/// Content types that say nothing about the actual format.
const UNDECLARED_CONTENT_TYPES: &[&str] = &["", "application/octet-stream"];

#[derive(Debug, Clone)]
pub struct Normalizer {
    catalog: SampleCatalog,
}

impl Normalizer {
    pub fn new(catalog: SampleCatalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &SampleCatalog {
        &self.catalog
    }

    /// Produce the canonical image for one request.
    ///
    /// The media type is checked before anything is encoded, and the raw
    /// buffer is released as soon as encoding finishes.
    pub async fn normalize(&self, input: ImageInput) -> Result<NormalizedImage, NormalizationError> {
        match input {
            ImageInput::Uploaded(upload) => {
                let media_type = upload_media_type(&upload)?;
                debug!(
                    bytes = upload.bytes.len(),
                    media_type = %media_type,
                    "Normalizing uploaded image"
                );
                Ok(NormalizedImage::encode(upload.bytes, media_type))
            }
            ImageInput::Referenced { name } => {
                let bytes = self.catalog.read(&name).await?;
                debug!(sample = %name, bytes = bytes.len(), "Normalizing sample image");
                Ok(NormalizedImage::encode(bytes, self.catalog.media_type()))
            }
        }
    }
}

/// The declared content type decides; the file name is only consulted
/// when nothing useful was declared.
fn upload_media_type(upload: &Upload) -> Result<MediaType, NormalizationError> {
    let declared = upload
        .content_type
        .as_deref()
        .map(str::trim)
        .filter(|ct| !UNDECLARED_CONTENT_TYPES.contains(&ct.to_ascii_lowercase().as_str()));

    if let Some(declared) = declared {
        return MediaType::from_mime(declared)
            .ok_or_else(|| NormalizationError::UnsupportedMediaType(declared.to_string()));
    }

    match upload.file_name.as_deref() {
        Some(name) => media_type_for_path(Path::new(name)).ok_or_else(|| {
            NormalizationError::UnsupportedMediaType(detect_mime_type(Path::new(name)).to_string())
        }),
        None => Err(NormalizationError::UnsupportedMediaType(
            "unknown (no content type declared)".to_string(),
        )),
    }
}
