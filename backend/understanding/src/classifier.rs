//! Classification service: one model call per image, answer held to the
//! result contract.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::anyhow;
use tracing::{info, instrument, warn};

use propscope_core::{
    parse_model_output, ClassificationError, ClassificationResult, NormalizedImage,
    VisionProvider, VisionRequest,
};
use propscope_logging::{redact_sensitive_data, ClassificationEvent, EventLogger};

use crate::prompt::instruction;

pub const DEFAULT_MODEL: &str = "claude-3-5-sonnet-20240620";
pub const DEFAULT_MAX_TOKENS: u32 = 1000;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// How much raw model text to keep in logs when it cannot be parsed.
const OUTPUT_EXCERPT_CHARS: usize = 200;

#[derive(Debug, Clone)]
pub struct ClassifierOptions {
    pub model: String,
    pub max_tokens: u32,
    /// Upper bound on the single provider call.
    pub timeout: Duration,
}

impl Default for ClassifierOptions {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Stateless between requests; share it behind an `Arc`.
pub struct Classifier {
    provider: Arc<dyn VisionProvider>,
    options: ClassifierOptions,
    instruction: String,
}

impl Classifier {
    pub fn new(provider: Arc<dyn VisionProvider>, options: ClassifierOptions) -> Self {
        Self {
            provider,
            options,
            instruction: instruction(),
        }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub fn options(&self) -> &ClassifierOptions {
        &self.options
    }

    /// Classify one image. The provider is called exactly once and nothing
    /// is retried; every failure is returned to the caller.
    #[instrument(skip_all, fields(provider = %self.provider.name(), media_type = %image.media_type()))]
    pub async fn classify(
        &self,
        image: NormalizedImage,
    ) -> Result<ClassificationResult, ClassificationError> {
        let start = Instant::now();
        let outcome = self.call_and_validate(image).await;
        let latency_ms = start.elapsed().as_millis() as u64;

        let event = match &outcome {
            Ok(result) => ClassificationEvent::Completed {
                provider: self.provider.name().to_string(),
                model: self.options.model.clone(),
                location_type: result.location_type().to_string(),
                space_type: result.space_label().to_string(),
                flagged: result.flagged().into_iter().map(String::from).collect(),
                latency_ms,
            },
            Err(e) => ClassificationEvent::Failed {
                provider: self.provider.name().to_string(),
                error_kind: e.kind().to_string(),
                message: e.to_string(),
                latency_ms,
            },
        };
        EventLogger::log_event(event);

        outcome
    }

    async fn call_and_validate(
        &self,
        image: NormalizedImage,
    ) -> Result<ClassificationResult, ClassificationError> {
        let request = VisionRequest {
            model: self.options.model.clone(),
            instruction: self.instruction.clone(),
            image,
            max_tokens: self.options.max_tokens,
        };

        let provider = self.provider.name();
        let response =
            match tokio::time::timeout(self.options.timeout, self.provider.generate(&request)).await {
                Ok(Ok(response)) => response,
                Ok(Err(e)) => return Err(ClassificationError::upstream(provider, e)),
                Err(_) => {
                    return Err(ClassificationError::upstream(
                        provider,
                        anyhow!("no response within {:?}", self.options.timeout),
                    ))
                }
            };
        // The encoded image is not needed past the call.
        drop(request);

        info!(
            model = %response.model,
            latency_ms = response.latency_ms,
            chars = response.text.len(),
            "Vision model responded"
        );

        parse_model_output(&response.text).inspect_err(|e| {
            if matches!(e, ClassificationError::MalformedOutput(_) | ClassificationError::SchemaViolation(_)) {
                warn!(
                    error = %e,
                    excerpt = %redact_sensitive_data(&excerpt(&response.text)),
                    "Model output rejected"
                );
            }
        })
    }
}

fn excerpt(text: &str) -> String {
    let mut out: String = text.chars().take(OUTPUT_EXCERPT_CHARS).collect();
    if text.chars().count() > OUTPUT_EXCERPT_CHARS {
        out.push('…');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::MockVisionProvider;
    use propscope_core::MediaType;

    fn image() -> NormalizedImage {
        NormalizedImage::encode(b"photo".to_vec(), MediaType::Jpeg)
    }

    fn classifier(provider: Arc<MockVisionProvider>) -> Classifier {
        Classifier::new(provider, ClassifierOptions::default())
    }

    #[tokio::test]
    async fn fills_missing_flags() {
        let provider = Arc::new(MockVisionProvider::new("mock").with_response(
            r#"{"locationType":"interior","spaceType":"Kitchen","features":{"wallDamage":true}}"#,
        ));
        let result = classifier(provider.clone()).classify(image()).await.unwrap();

        assert_eq!(provider.calls(), 1);
        assert_eq!(result.space_label(), "Kitchen");
        assert_eq!(result.flagged(), vec!["wallDamage"]);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["features"].as_object().unwrap().len(), 12);
    }

    #[tokio::test]
    async fn prose_is_malformed_output() {
        let provider = Arc::new(
            MockVisionProvider::new("mock").with_response("I think this is a kitchen."),
        );
        let err = classifier(provider.clone()).classify(image()).await.unwrap_err();
        assert!(matches!(err, ClassificationError::MalformedOutput(_)));
        assert_eq!(provider.calls(), 1, "malformed output is not retried");
    }

    #[tokio::test]
    async fn out_of_vocabulary_is_schema_violation() {
        let provider = Arc::new(MockVisionProvider::new("mock").with_response(
            r#"{"locationType":"interior","spaceType":"Swimming Pool","features":{}}"#,
        ));
        match classifier(provider).classify(image()).await.unwrap_err() {
            ClassificationError::SchemaViolation(v) => assert_eq!(v.field, "spaceType"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn provider_error_is_upstream_unavailable() {
        let provider = Arc::new(MockVisionProvider::new("flaky").failing("429 rate limited"));
        match classifier(provider.clone()).classify(image()).await.unwrap_err() {
            ClassificationError::UpstreamUnavailable { provider: name, source } => {
                assert_eq!(name, "flaky");
                assert!(source.to_string().contains("429"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn timeout_is_upstream_unavailable() {
        let provider = Arc::new(
            MockVisionProvider::new("slow").with_delay(Duration::from_millis(500)),
        );
        let classifier = Classifier::new(
            provider,
            ClassifierOptions {
                timeout: Duration::from_millis(20),
                ..Default::default()
            },
        );
        let err = classifier.classify(image()).await.unwrap_err();
        assert!(matches!(err, ClassificationError::UpstreamUnavailable { .. }));
        assert!(err.to_string().contains("slow"));
    }

    #[test]
    fn excerpt_truncates() {
        let long = "x".repeat(500);
        let short = excerpt(&long);
        assert_eq!(short.chars().count(), OUTPUT_EXCERPT_CHARS + 1);
        assert_eq!(excerpt("abc"), "abc");
    }
}
