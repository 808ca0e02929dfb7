//! Config defaults: applies default values to parsed config.

use crate::schema::{LoggingConfig, PropscopeConfig, ProviderConfig, SamplesConfig, ServerConfig};

pub const DEFAULT_BIND: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;

/// 20 MiB, comfortably above a full-resolution phone photo.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

pub const DEFAULT_PROVIDER: &str = "anthropic";
pub const DEFAULT_MODEL: &str = "claude-3-5-sonnet-20240620";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o";
pub const DEFAULT_OLLAMA_MODEL: &str = "llava";
pub const DEFAULT_MAX_TOKENS: u32 = 1000;
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

pub const DEFAULT_SAMPLES_DIR: &str = "public/images";
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Model used when the config names a provider but no model.
pub fn default_model_for(kind: &str) -> &'static str {
    match kind {
        "openai" => DEFAULT_OPENAI_MODEL,
        "ollama" => DEFAULT_OLLAMA_MODEL,
        _ => DEFAULT_MODEL,
    }
}

/// Apply all defaults to a freshly loaded config.
pub fn apply_all_defaults(config: PropscopeConfig) -> PropscopeConfig {
    let config = apply_server_defaults(config);
    let config = apply_provider_defaults(config);
    let config = apply_samples_defaults(config);
    apply_logging_defaults(config)
}

fn apply_server_defaults(mut config: PropscopeConfig) -> PropscopeConfig {
    let server = config.server.get_or_insert_with(ServerConfig::default);
    server.bind.get_or_insert_with(|| DEFAULT_BIND.to_string());
    server.port.get_or_insert(DEFAULT_PORT);
    server.max_upload_bytes.get_or_insert(DEFAULT_MAX_UPLOAD_BYTES);
    config
}

fn apply_provider_defaults(mut config: PropscopeConfig) -> PropscopeConfig {
    let provider = config.provider.get_or_insert_with(ProviderConfig::default);
    let kind = provider.kind.get_or_insert_with(|| DEFAULT_PROVIDER.to_string());
    let model = default_model_for(kind);
    provider.model.get_or_insert_with(|| model.to_string());
    provider.max_tokens.get_or_insert(DEFAULT_MAX_TOKENS);
    provider.timeout_secs.get_or_insert(DEFAULT_TIMEOUT_SECS);
    config
}

fn apply_samples_defaults(mut config: PropscopeConfig) -> PropscopeConfig {
    let samples = config.samples.get_or_insert_with(SamplesConfig::default);
    samples.dir.get_or_insert_with(|| DEFAULT_SAMPLES_DIR.to_string());
    config
}

fn apply_logging_defaults(mut config: PropscopeConfig) -> PropscopeConfig {
    let logging = config.logging.get_or_insert_with(LoggingConfig::default);
    logging.level.get_or_insert_with(|| DEFAULT_LOG_LEVEL.to_string());
    logging.json.get_or_insert(false);
    config
}
