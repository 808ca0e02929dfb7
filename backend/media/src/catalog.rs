//! Static catalog of sample property photos, addressed by file name.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::fs;
use tracing::{debug, warn};

use propscope_core::{MediaType, NormalizationError};

use crate::mime_detect::media_type_for_path;

/// The catalog only holds JPEG photos.
pub const CATALOG_MEDIA_TYPE: MediaType = MediaType::Jpeg;

#[derive(Debug, Clone)]
pub struct SampleCatalog {
    root: Arc<PathBuf>,
}

impl SampleCatalog {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Arc::new(root.into()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn media_type(&self) -> MediaType {
        CATALOG_MEDIA_TYPE
    }

    /// Resolve a sample name to a path inside the catalog directory.
    ///
    /// Names containing path separators or `..` never leave the catalog.
    pub fn resolve(&self, name: &str) -> Result<PathBuf, NormalizationError> {
        if name.is_empty() || name.contains("..") || name.contains('/') || name.contains('\\') {
            warn!(name = %name, "Rejected suspicious sample name");
            return Err(unavailable(
                name,
                io::Error::new(io::ErrorKind::InvalidInput, "name is outside the sample catalog"),
            ));
        }
        Ok(self.root.join(name))
    }

    pub async fn read(&self, name: &str) -> Result<Vec<u8>, NormalizationError> {
        let path = self.resolve(name)?;
        debug!(path = %path.display(), "Reading sample image");
        fs::read(&path).await.map_err(|source| unavailable(name, source))
    }

    /// Catalog entries sorted by name. A missing catalog directory is empty.
    pub async fn list(&self) -> Result<Vec<String>> {
        let mut entries = match fs::read_dir(self.root.as_path()).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                warn!(dir = %self.root.display(), "Sample catalog directory does not exist");
                return Ok(Vec::new());
            }
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("Failed to open sample catalog: {}", self.root.display())
                })
            }
        };

        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            let path = entry.path();
            if media_type_for_path(&path) != Some(CATALOG_MEDIA_TYPE) {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }
}

fn unavailable(name: &str, source: io::Error) -> NormalizationError {
    NormalizationError::ResourceUnavailable {
        name: name.to_string(),
        source,
    }
}
