use anyhow::Result;
use async_trait::async_trait;

use crate::image::NormalizedImage;

/// A remote model that can look at an image and answer in text.
#[async_trait]
pub trait VisionProvider: Send + Sync {
    /// Provider name (e.g., "anthropic", "openai").
    fn name(&self) -> &str;

    /// Send the image and instruction, return the model's raw text.
    async fn generate(&self, request: &VisionRequest) -> Result<VisionResponse>;
}

/// One image plus one instruction.
#[derive(Debug, Clone)]
pub struct VisionRequest {
    pub model: String,
    pub instruction: String,
    pub image: NormalizedImage,
    pub max_tokens: u32,
}

/// Raw, unvalidated model output.
#[derive(Debug, Clone)]
pub struct VisionResponse {
    pub text: String,
    pub provider: String,
    pub model: String,
    pub latency_ms: u64,
}
