//! CLI Config Command
//!
//! Shows the effective config with secrets masked, plus validation results.

use std::path::Path;

use anyhow::{Context, Result};

use propscope_config::{redact, PropscopeConfig, ValidationReport};

use crate::terminal_output::{print_report, say, Tone};

pub fn run(path: &Path, config: &PropscopeConfig, report: &ValidationReport) -> Result<()> {
    say(Tone::Info, &format!("Config file: {}", path.display()));
    print!("{}", render_redacted(config)?);

    print_report(report);
    if report.is_valid() {
        say(Tone::Ok, "Configuration is valid");
    }
    Ok(())
}

fn render_redacted(config: &PropscopeConfig) -> Result<String> {
    let value = serde_json::to_value(config).context("Failed to serialize config")?;
    serde_yaml::to_string(&redact(&value)).context("Failed to render config as YAML")
}
