use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;

use propscope_core::{VisionProvider, VisionRequest, VisionResponse};

/// Answer returned when no canned response is configured.
pub const DEFAULT_MOCK_RESPONSE: &str =
    r#"{"locationType":"interior","spaceType":"Other interior","features":{}}"#;

enum Outcome {
    Respond(String),
    Fail(String),
}

/// A vision provider that returns canned text and counts its calls.
pub struct MockVisionProvider {
    name: String,
    outcome: Outcome,
    delay: Option<Duration>,
    calls: AtomicUsize,
    completed: AtomicUsize,
}

impl MockVisionProvider {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            outcome: Outcome::Respond(DEFAULT_MOCK_RESPONSE.to_string()),
            delay: None,
            calls: AtomicUsize::new(0),
            completed: AtomicUsize::new(0),
        }
    }

    pub fn with_response(mut self, response: impl Into<String>) -> Self {
        self.outcome = Outcome::Respond(response.into());
        self
    }

    /// Every call fails with `message`, as a transport error would.
    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.outcome = Outcome::Fail(message.into());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Calls that ran past the configured delay.
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VisionProvider for MockVisionProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate(&self, request: &VisionRequest) -> Result<VisionResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.completed.fetch_add(1, Ordering::SeqCst);
        match &self.outcome {
            Outcome::Respond(text) => Ok(VisionResponse {
                text: text.clone(),
                provider: self.name.clone(),
                model: request.model.clone(),
                latency_ms: 0,
            }),
            Outcome::Fail(message) => anyhow::bail!("{message}"),
        }
    }
}
