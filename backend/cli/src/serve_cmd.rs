//! CLI Serve Command
//!
//! Runs the HTTP gateway until ctrl-c.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use tracing::info;

use propscope_config::PropscopeConfig;
use propscope_gateway::{start_server, GatewayState};

use crate::app::build_pipeline;

pub async fn run(config: &PropscopeConfig) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.bind(), config.port())
        .parse()
        .with_context(|| format!("Invalid bind address {}:{}", config.bind(), config.port()))?;

    let pipeline = build_pipeline(config)?;
    info!(
        addr = %addr,
        max_upload_bytes = config.max_upload_bytes(),
        "Starting propscope gateway"
    );

    start_server(addr, GatewayState::new(pipeline, config.max_upload_bytes())).await
}
