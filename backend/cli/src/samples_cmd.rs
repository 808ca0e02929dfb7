//! CLI Samples Command
//!
//! Lists the sample images available by reference.

use anyhow::Result;

use propscope_config::PropscopeConfig;

use crate::app::catalog;
use crate::terminal_output::{say, two_columns, Tone};

pub async fn run(config: &PropscopeConfig) -> Result<()> {
    let catalog = catalog(config);
    let samples = catalog.list().await?;

    if samples.is_empty() {
        say(Tone::Info, &format!("No sample images in {}", catalog.root().display()));
        return Ok(());
    }

    let rows: Vec<(String, String)> = samples
        .into_iter()
        .map(|name| (name, catalog.media_type().to_string()))
        .collect();
    print!("{}", two_columns(("Sample", "Type"), &rows));
    Ok(())
}
