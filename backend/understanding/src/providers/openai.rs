use std::time::Instant;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use propscope_core::{VisionProvider, VisionRequest, VisionResponse};
use propscope_logging::redact_sensitive_data;

/// OpenAI Chat Completions provider; the image travels as a `data:` URL.
pub struct OpenAiProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

impl OpenAiProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: "https://api.openai.com/v1".to_string(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }
}

fn request_body(request: &VisionRequest) -> serde_json::Value {
    serde_json::json!({
        "model": request.model,
        "messages": [{
            "role": "user",
            "content": [
                { "type": "image_url",
                  "image_url": { "url": request.image.data_url() } },
                { "type": "text", "text": request.instruction }
            ]
        }],
        "max_tokens": request.max_tokens,
        "response_format": { "type": "json_object" }
    })
}

#[async_trait]
impl VisionProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn generate(&self, request: &VisionRequest) -> Result<VisionResponse> {
        let start = Instant::now();
        debug!(model = %request.model, "Sending image to OpenAI");

        let resp = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request_body(request))
            .send()
            .await
            .context("OpenAI HTTP request failed")?;

        let status = resp.status();
        if !status.is_success() {
            let error_body = resp.text().await.unwrap_or_default();
            anyhow::bail!("OpenAI returned {}: {}", status, redact_sensitive_data(&error_body));
        }

        let json: serde_json::Value = resp.json().await.context("Failed to parse OpenAI response")?;
        let text = json["choices"][0]["message"]["content"]
            .as_str()
            .unwrap_or("")
            .to_string();
        let model = json["model"].as_str().unwrap_or(&request.model).to_string();

        Ok(VisionResponse {
            text,
            provider: "openai".to_string(),
            model,
            latency_ms: start.elapsed().as_millis() as u64,
        })
    }
}
