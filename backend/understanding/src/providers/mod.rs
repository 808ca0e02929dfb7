pub mod anthropic;
pub mod mock;
pub mod ollama;
pub mod openai;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use propscope_core::VisionProvider;

pub use anthropic::AnthropicProvider;
pub use mock::MockVisionProvider;
pub use ollama::OllamaProvider;
pub use openai::OpenAiProvider;

/// Which remote vision backend to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    Anthropic,
    OpenAi,
    Ollama,
    Mock,
}

impl ProviderKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Anthropic => "anthropic",
            Self::OpenAi => "openai",
            Self::Ollama => "ollama",
            Self::Mock => "mock",
        }
    }

    pub fn requires_api_key(self) -> bool {
        matches!(self, Self::Anthropic | Self::OpenAi)
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "anthropic" => Ok(Self::Anthropic),
            "openai" => Ok(Self::OpenAi),
            "ollama" => Ok(Self::Ollama),
            "mock" => Ok(Self::Mock),
            other => bail!("Unknown vision provider '{other}'. Use anthropic, openai, ollama or mock"),
        }
    }
}

/// Construct the configured provider. Credentials are passed in here and
/// nowhere else.
pub fn build_provider(
    kind: ProviderKind,
    api_key: Option<&str>,
    base_url: Option<&str>,
) -> Result<Arc<dyn VisionProvider>> {
    let api_key = api_key.map(str::trim).filter(|k| !k.is_empty());
    if kind.requires_api_key() && api_key.is_none() {
        bail!("provider.apiKey is required for the {kind} provider");
    }

    let provider: Arc<dyn VisionProvider> = match kind {
        ProviderKind::Anthropic => {
            let mut p = AnthropicProvider::new(api_key.unwrap_or_default());
            if let Some(url) = base_url {
                p = p.with_base_url(url);
            }
            Arc::new(p)
        }
        ProviderKind::OpenAi => {
            let mut p = OpenAiProvider::new(api_key.unwrap_or_default());
            if let Some(url) = base_url {
                p = p.with_base_url(url);
            }
            Arc::new(p)
        }
        ProviderKind::Ollama => {
            let mut p = OllamaProvider::new();
            if let Some(url) = base_url {
                p = p.with_base_url(url);
            }
            Arc::new(p)
        }
        ProviderKind::Mock => Arc::new(MockVisionProvider::new("mock")),
    };
    Ok(provider)
}
