//! Normalize-then-classify for one request.

use tracing::instrument;

use propscope_core::{ClassificationResult, ImageInput, PipelineError};
use propscope_media::Normalizer;

use crate::classifier::Classifier;

/// The whole request path behind the HTTP and CLI front ends.
pub struct ClassificationPipeline {
    normalizer: Normalizer,
    classifier: Classifier,
}

impl ClassificationPipeline {
    pub fn new(normalizer: Normalizer, classifier: Classifier) -> Self {
        Self {
            normalizer,
            classifier,
        }
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    /// Input problems are caught by the normalizer, before any remote call.
    #[instrument(skip_all)]
    pub async fn run(&self, input: ImageInput) -> Result<ClassificationResult, PipelineError> {
        let image = self.normalizer.normalize(input).await?;
        Ok(self.classifier.classify(image).await?)
    }
}
