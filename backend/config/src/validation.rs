//! Config validation: field checks with user-friendly messages.

use crate::schema::PropscopeConfig;
use thiserror::Error;

/// Provider kinds the runtime knows how to build.
pub const KNOWN_PROVIDERS: &[&str] = &["anthropic", "openai", "ollama", "mock"];

const KNOWN_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// A config validation error with field path and message.
#[derive(Debug, Error)]
#[error("Config validation error at '{path}': {message}")]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

/// A collection of validation errors found in one pass.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }
}

/// Validate the config and return a report of all errors and warnings.
pub fn validate(config: &PropscopeConfig) -> ValidationReport {
    let mut report = ValidationReport::default();
    validate_server(config, &mut report);
    validate_provider(config, &mut report);
    validate_samples(config, &mut report);
    validate_logging(config, &mut report);
    report
}

fn validate_server(config: &PropscopeConfig, report: &mut ValidationReport) {
    if config.bind().trim().is_empty() {
        report.error("server.bind", "Bind address cannot be empty");
    }
    let port = config.port();
    if port == 0 {
        report.error("server.port", "Port must be non-zero");
    } else if port < 1024 {
        report.warn(
            "server.port",
            format!("Port {port} is privileged; binding may need elevated permissions"),
        );
    }
    if config.max_upload_bytes() == 0 {
        report.error("server.maxUploadBytes", "Upload limit must be greater than 0");
    }
}

fn validate_provider(config: &PropscopeConfig, report: &mut ValidationReport) {
    let kind = config.provider_kind();
    if !KNOWN_PROVIDERS.contains(&kind) {
        report.error(
            "provider.kind",
            format!(
                "Unknown provider '{kind}'; expected one of: {}",
                KNOWN_PROVIDERS.join(", ")
            ),
        );
        return;
    }

    let needs_key = matches!(kind, "anthropic" | "openai");
    let has_key = config.api_key().is_some_and(|k| !k.trim().is_empty());
    if needs_key && !has_key {
        report.error(
            "provider.apiKey",
            format!("Provider '{kind}' requires an API key"),
        );
    }

    if config.model().trim().is_empty() {
        report.error("provider.model", "Model cannot be empty");
    }
    if config.max_tokens() == 0 {
        report.error("provider.maxTokens", "maxTokens must be greater than 0");
    }
    if config.timeout_secs() == 0 {
        report.error("provider.timeoutSecs", "timeoutSecs must be greater than 0");
    }
    if let Some(url) = config.base_url() {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            report.error("provider.baseUrl", format!("'{url}' is not an http(s) URL"));
        }
    }
    if kind == "mock" {
        report.warn("provider.kind", "Mock provider returns canned results");
    }
}

fn validate_samples(config: &PropscopeConfig, report: &mut ValidationReport) {
    let dir = config.samples_dir();
    if !dir.is_dir() {
        report.warn(
            "samples.dir",
            format!("Sample directory '{}' does not exist; sample lookups will fail", dir.display()),
        );
    }
}

fn validate_logging(config: &PropscopeConfig, report: &mut ValidationReport) {
    let level = config.log_level();
    // Full filter directives like "propscope=debug,info" pass through untouched.
    if !level.contains('=') && !KNOWN_LOG_LEVELS.contains(&level.to_ascii_lowercase().as_str()) {
        report.warn("logging.level", format!("Unrecognized log level '{level}'"));
    }
}
