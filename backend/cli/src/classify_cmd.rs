//! CLI Classify Command
//!
//! Classifies one local file or one catalog sample and prints the result.

use std::path::Path;

use anyhow::{Context, Result};

use propscope_config::PropscopeConfig;
use propscope_core::{ClassificationResult, ImageInput, Upload};

use crate::app::build_pipeline;
use crate::terminal_output::{alert, bold, two_columns};

/// What to classify.
pub enum Target<'a> {
    File(&'a Path),
    Sample(&'a str),
}

pub async fn run(config: &PropscopeConfig, target: Target<'_>, summary: bool) -> Result<()> {
    let pipeline = build_pipeline(config)?;
    let input = match target {
        Target::File(path) => read_upload(path).await?,
        Target::Sample(name) => ImageInput::reference(name),
    };

    let result = pipeline.run(input).await.context("Classification failed")?;

    if summary {
        print!("{}", render_summary(&result));
    } else {
        println!("{}", serde_json::to_string_pretty(&result)?);
    }
    Ok(())
}

/// Local files carry no declared content type; the normalizer types them
/// by extension.
async fn read_upload(path: &Path) -> Result<ImageInput> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read image: {}", path.display()))?;
    let mut upload = Upload::new(bytes, None);
    if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
        upload = upload.with_file_name(name);
    }
    Ok(ImageInput::Uploaded(upload))
}

fn render_summary(result: &ClassificationResult) -> String {
    let mut out = format!(
        "{} ({})\n\n",
        bold(result.space_label()),
        result.location_type()
    );
    let flagged = result.flagged();
    if flagged.is_empty() {
        out.push_str("No risk features detected.\n");
        return out;
    }
    let rows: Vec<(String, String)> = flagged
        .iter()
        .map(|key| (alert(key), "yes".to_string()))
        .collect();
    out.push_str(&two_columns(("Feature", "Flagged"), &rows));
    out
}
