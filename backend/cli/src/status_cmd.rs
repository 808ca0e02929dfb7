//! CLI Status Command
//!
//! Asks a running gateway for its health report.

use anyhow::Result;

use propscope_config::PropscopeConfig;

use crate::terminal_output::{say, Tone};

pub async fn run(config: &PropscopeConfig) -> Result<()> {
    let url = format!("http://localhost:{}/api/health", config.port());
    let client = reqwest::Client::new();

    match client.get(&url).send().await {
        Ok(resp) if resp.status().is_success() => {
            let body: serde_json::Value = resp.json().await?;
            say(Tone::Ok, &format!("propscope is running on port {}", config.port()));
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
        Ok(resp) => say(Tone::Warn, &format!("Health check returned {}", resp.status())),
        Err(_) => say(Tone::Warn, &format!("propscope is not running on port {}", config.port())),
    }
    Ok(())
}
