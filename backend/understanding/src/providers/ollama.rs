use std::time::Instant;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use propscope_core::{VisionProvider, VisionRequest, VisionResponse};
use propscope_logging::redact_sensitive_data;

/// Ollama local vision provider (llava, llama3.2-vision, ...).
pub struct OllamaProvider {
    client: Client,
    base_url: String,
}

impl OllamaProvider {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            base_url: "http://localhost:11434".to_string(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }
}

impl Default for OllamaProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: Vec<OllamaChatMessage<'a>>,
    stream: bool,
    format: &'static str,
    options: OllamaOptions,
}

#[derive(Serialize)]
struct OllamaOptions {
    num_predict: u32,
}

#[derive(Serialize)]
struct OllamaChatMessage<'a> {
    role: &'static str,
    content: &'a str,
    images: Vec<&'a str>,
}

#[derive(Deserialize)]
struct OllamaChatResponse {
    message: OllamaReply,
}

#[derive(Deserialize)]
struct OllamaReply {
    content: String,
}

fn chat_request(request: &VisionRequest) -> OllamaChatRequest<'_> {
    OllamaChatRequest {
        model: &request.model,
        messages: vec![OllamaChatMessage {
            role: "user",
            content: &request.instruction,
            images: vec![request.image.data()],
        }],
        stream: false,
        format: "json",
        options: OllamaOptions {
            num_predict: request.max_tokens,
        },
    }
}

#[async_trait]
impl VisionProvider for OllamaProvider {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn generate(&self, request: &VisionRequest) -> Result<VisionResponse> {
        let start = Instant::now();

        let body = chat_request(request);
        debug!(model = %request.model, "Sending image to Ollama");

        let response = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .json(&body)
            .send()
            .await
            .context("Ollama HTTP request failed")?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            anyhow::bail!("Ollama returned {}: {}", status, redact_sensitive_data(&error_body));
        }

        let chat_response: OllamaChatResponse = response
            .json()
            .await
            .context("Failed to parse Ollama response")?;

        Ok(VisionResponse {
            text: chat_response.message.content,
            provider: "ollama".to_string(),
            model: request.model.clone(),
            latency_ms: start.elapsed().as_millis() as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use propscope_core::{MediaType, NormalizedImage};

    #[test]
    fn attaches_raw_base64_and_asks_for_json() {
        let request = VisionRequest {
            model: "llava".into(),
            instruction: "classify".into(),
            image: NormalizedImage::encode(b"img".to_vec(), MediaType::Png),
            max_tokens: 1000,
        };
        let body = serde_json::to_value(chat_request(&request)).unwrap();
        assert_eq!(body["model"], "llava");
        assert_eq!(body["format"], "json");
        assert_eq!(body["stream"], false);
        assert_eq!(body["options"]["num_predict"], 1000);
        assert_eq!(body["messages"][0]["content"], "classify");
        // Ollama takes bare base64, not a data URL.
        assert_eq!(body["messages"][0]["images"], serde_json::json!(["aW1n"]));
    }
}
