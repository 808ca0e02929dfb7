//! Wiring from loaded config to a ready pipeline.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use tracing::info;

use propscope_config::{PropscopeConfig, ValidationReport};
use propscope_media::{Normalizer, SampleCatalog};
use propscope_understanding::{
    build_provider, ClassificationPipeline, Classifier, ClassifierOptions, ProviderKind,
};

use crate::terminal_output::print_report;

/// Print config problems; fail if any of them is an error.
pub fn ensure_valid(report: &ValidationReport) -> Result<()> {
    print_report(report);
    if !report.is_valid() {
        bail!("Configuration has {} error(s); run `propscope config` for details", report.errors.len());
    }
    Ok(())
}

pub fn catalog(config: &PropscopeConfig) -> SampleCatalog {
    SampleCatalog::new(config.samples_dir())
}

/// Build the provider, classifier and normalizer the config describes.
pub fn build_pipeline(config: &PropscopeConfig) -> Result<ClassificationPipeline> {
    let kind: ProviderKind = config.provider_kind().parse()?;
    let provider = build_provider(kind, config.api_key(), config.base_url())
        .context("Failed to construct vision provider")?;

    let options = ClassifierOptions {
        model: config.model().to_string(),
        max_tokens: config.max_tokens(),
        timeout: Duration::from_secs(config.timeout_secs()),
    };
    info!(
        provider = %kind,
        model = %options.model,
        samples = %config.samples_dir().display(),
        "Classification pipeline ready"
    );

    Ok(ClassificationPipeline::new(
        Normalizer::new(catalog(config)),
        Classifier::new(provider, options),
    ))
}
