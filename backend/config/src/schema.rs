//! propscope configuration schema, typed for serde YAML/JSON.
//!
//! Every field is optional on disk; [`apply_all_defaults`](crate::apply_all_defaults)
//! fills the gaps after loading.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::defaults::{
    default_model_for, DEFAULT_BIND, DEFAULT_LOG_LEVEL, DEFAULT_MAX_TOKENS,
    DEFAULT_MAX_UPLOAD_BYTES, DEFAULT_PORT, DEFAULT_PROVIDER, DEFAULT_SAMPLES_DIR, DEFAULT_TIMEOUT_SECS,
};

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropscopeConfig {
    /// HTTP server settings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server: Option<ServerConfig>,

    /// Remote vision model
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<ProviderConfig>,

    /// Sample image catalog
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub samples: Option<SamplesConfig>,

    /// Logging configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    /// Largest accepted multipart body, in bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_upload_bytes: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfig {
    /// "anthropic" | "openai" | "ollama" | "mock"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SamplesConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggingConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    /// Directory for rolling NDJSON logs; console only when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json: Option<bool>,
}

// Accessors fall back to the built-in defaults, so they are safe to call on
// a config that never went through `apply_all_defaults`.
impl PropscopeConfig {
    pub fn bind(&self) -> &str {
        self.server
            .as_ref()
            .and_then(|s| s.bind.as_deref())
            .unwrap_or(DEFAULT_BIND)
    }

    pub fn port(&self) -> u16 {
        self.server.as_ref().and_then(|s| s.port).unwrap_or(DEFAULT_PORT)
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.server
            .as_ref()
            .and_then(|s| s.max_upload_bytes)
            .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES)
    }

    pub fn provider_kind(&self) -> &str {
        self.provider
            .as_ref()
            .and_then(|p| p.kind.as_deref())
            .unwrap_or(DEFAULT_PROVIDER)
    }

    pub fn api_key(&self) -> Option<&str> {
        self.provider.as_ref().and_then(|p| p.api_key.as_deref())
    }

    pub fn base_url(&self) -> Option<&str> {
        self.provider.as_ref().and_then(|p| p.base_url.as_deref())
    }

    pub fn model(&self) -> &str {
        self.provider
            .as_ref()
            .and_then(|p| p.model.as_deref())
            .unwrap_or_else(|| default_model_for(self.provider_kind()))
    }

    pub fn max_tokens(&self) -> u32 {
        self.provider
            .as_ref()
            .and_then(|p| p.max_tokens)
            .unwrap_or(DEFAULT_MAX_TOKENS)
    }

    pub fn timeout_secs(&self) -> u64 {
        self.provider
            .as_ref()
            .and_then(|p| p.timeout_secs)
            .unwrap_or(DEFAULT_TIMEOUT_SECS)
    }

    pub fn samples_dir(&self) -> PathBuf {
        PathBuf::from(
            self.samples
                .as_ref()
                .and_then(|s| s.dir.as_deref())
                .unwrap_or(DEFAULT_SAMPLES_DIR),
        )
    }

    pub fn log_level(&self) -> &str {
        self.logging
            .as_ref()
            .and_then(|l| l.level.as_deref())
            .unwrap_or(DEFAULT_LOG_LEVEL)
    }

    pub fn log_dir(&self) -> Option<PathBuf> {
        self.logging
            .as_ref()
            .and_then(|l| l.dir.as_deref())
            .map(PathBuf::from)
    }

    pub fn log_json(&self) -> bool {
        self.logging.as_ref().and_then(|l| l.json).unwrap_or(false)
    }
}
