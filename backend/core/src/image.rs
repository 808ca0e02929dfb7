//! Image inputs as they arrive, and the canonical form sent to the model.

use std::fmt;

use base64::{engine::general_purpose::STANDARD, Engine};
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::error::NormalizationError;

/// The only image formats the vision model accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MediaType {
    #[serde(rename = "image/png")]
    Png,
    #[serde(rename = "image/jpeg")]
    Jpeg,
    #[serde(rename = "image/gif")]
    Gif,
    #[serde(rename = "image/webp")]
    Webp,
}

impl MediaType {
    pub const ALL: [MediaType; 4] = [Self::Png, Self::Jpeg, Self::Gif, Self::Webp];

    pub fn as_mime(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Gif => "image/gif",
            Self::Webp => "image/webp",
        }
    }

    /// Parse a declared content type. Case-insensitive; parameters such as
    /// `; charset=binary` are ignored.
    pub fn from_mime(declared: &str) -> Option<Self> {
        let essence = declared
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        Self::ALL.into_iter().find(|m| m.as_mime() == essence)
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_mime())
    }
}

/// A file received through the upload path.
#[derive(Debug, Clone)]
pub struct Upload {
    pub bytes: Bytes,
    pub content_type: Option<String>,
    pub file_name: Option<String>,
}

impl Upload {
    pub fn new(bytes: impl Into<Bytes>, content_type: Option<String>) -> Self {
        Self {
            bytes: bytes.into(),
            content_type,
            file_name: None,
        }
    }

    pub fn with_file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = Some(name.into());
        self
    }
}

/// What a caller hands in: either the image itself or the name of a sample.
#[derive(Debug, Clone)]
pub enum ImageInput {
    Uploaded(Upload),
    Referenced { name: String },
}

impl ImageInput {
    pub fn reference(name: impl Into<String>) -> Self {
        Self::Referenced { name: name.into() }
    }

    /// Build the input from the two optional form fields.
    ///
    /// An empty upload or a blank reference counts as absent. When both are
    /// present the upload wins.
    pub fn from_parts(
        upload: Option<Upload>,
        reference: Option<String>,
    ) -> Result<Self, NormalizationError> {
        let upload = upload.filter(|u| !u.bytes.is_empty());
        let reference = reference
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty());

        match (upload, reference) {
            (Some(upload), Some(name)) => {
                tracing::warn!(
                    sample = %name,
                    "Both image and imagePath supplied; using the uploaded image"
                );
                Ok(Self::Uploaded(upload))
            }
            (Some(upload), None) => Ok(Self::Uploaded(upload)),
            (None, Some(name)) => Ok(Self::Referenced { name }),
            (None, None) => Err(NormalizationError::MissingInput),
        }
    }
}

/// Base64 image data plus one of the four accepted media types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedImage {
    data: String,
    media_type: MediaType,
}

impl NormalizedImage {
    /// Encode raw bytes. The buffer is consumed and released here.
    pub fn encode<B: AsRef<[u8]>>(raw: B, media_type: MediaType) -> Self {
        let data = STANDARD.encode(raw.as_ref());
        drop(raw);
        Self { data, media_type }
    }

    pub fn data(&self) -> &str {
        &self.data
    }

    pub fn media_type(&self) -> MediaType {
        self.media_type
    }

    /// `data:` URL form used by OpenAI-style APIs.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.media_type, self.data)
    }
}
