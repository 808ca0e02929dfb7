//! Structured Logger
//!
//! Wraps `tracing` with environment-based level control, a console layer,
//! and an optional daily-rotated NDJSON file.

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    fmt::{self, writer::BoxMakeWriter},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

#[derive(Debug, Clone)]
pub struct LoggerOptions {
    /// Filter used when `RUST_LOG` is not set.
    pub level: String,
    /// Directory for `propscope.log.YYYY-MM-DD`; no file output when `None`.
    pub dir: Option<PathBuf>,
    /// JSON lines on the console instead of human-readable output.
    pub json: bool,
    /// Console output goes to stderr, leaving stdout for command output.
    pub stderr: bool,
}

impl Default for LoggerOptions {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            dir: None,
            json: false,
            stderr: false,
        }
    }
}

/// Initialize the global subscriber. Calling it twice is harmless; the
/// second call leaves the first subscriber in place.
pub fn init_logger(options: &LoggerOptions) -> Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&options.level));

    let file_layer = match &options.dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory: {}", dir.display()))?;
            let appender = RollingFileAppender::new(Rotation::DAILY, dir, "propscope.log");
            Some(fmt::layer().json().with_writer(appender).with_ansi(false))
        }
        None => None,
    };

    let console_writer = || {
        if options.stderr {
            BoxMakeWriter::new(std::io::stderr)
        } else {
            BoxMakeWriter::new(std::io::stdout)
        }
    };
    let json_console = options
        .json
        .then(|| fmt::layer().json().with_writer(console_writer()));
    let plain_console = (!options.json).then(|| {
        fmt::layer()
            .with_writer(console_writer())
            .with_target(false)
            .with_ansi(true)
    });

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(json_console)
        .with(plain_console)
        .with(file_layer)
        .try_init();

    Ok(())
}
