mod app;
mod classify_cmd;
mod config_cmd;
mod samples_cmd;
mod serve_cmd;
mod status_cmd;
mod terminal_output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use propscope_config::schema::ServerConfig;
use propscope_config::{load_and_prepare, resolve_config_path, PropscopeConfig};
use propscope_logging::{init_logger, LoggerOptions};

use classify_cmd::Target;

#[derive(Parser)]
#[command(name = "propscope")]
#[command(about = "propscope: classify property photos and flag insurance risks")]
#[command(version)]
struct Cli {
    /// Config file (defaults to $PROPSCOPE_CONFIG, then ~/.propscope/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP classification server
    Serve {
        /// Port to bind the HTTP server to
        #[arg(short, long)]
        port: Option<u16>,
        /// Address to bind the HTTP server to
        #[arg(long)]
        bind: Option<String>,
    },
    /// Classify one image and print the result as JSON
    Classify {
        /// Local image file (png, jpeg, gif or webp)
        #[arg(required_unless_present = "sample", conflicts_with = "sample")]
        file: Option<PathBuf>,
        /// Name of a catalog sample instead of a local file
        #[arg(long)]
        sample: Option<String>,
        /// Print a readable summary instead of JSON
        #[arg(long)]
        summary: bool,
    },
    /// List catalog sample images
    Samples,
    /// Query a running server's health endpoint
    Status,
    /// Show the effective config (secrets masked) and validation results
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = resolve_config_path(cli.config.as_deref());
    let (config, report) = load_and_prepare(&config_path).await?;

    init_logger(&LoggerOptions {
        level: config.log_level().to_string(),
        dir: config.log_dir(),
        json: config.log_json(),
        stderr: !matches!(cli.command, Commands::Serve { .. }),
    })?;

    match cli.command {
        Commands::Serve { port, bind } => {
            let config = with_server_overrides(config, port, bind);
            app::ensure_valid(&report)?;
            serve_cmd::run(&config).await?;
        }
        Commands::Classify { file, sample, summary } => {
            app::ensure_valid(&report)?;
            let target = match (&file, &sample) {
                (Some(path), _) => Target::File(path),
                (None, Some(name)) => Target::Sample(name),
                (None, None) => anyhow::bail!("Provide an image file or --sample <NAME>"),
            };
            classify_cmd::run(&config, target, summary).await?;
        }
        Commands::Samples => samples_cmd::run(&config).await?,
        Commands::Status => status_cmd::run(&config).await?,
        Commands::Config => config_cmd::run(&config_path, &config, &report)?,
    }

    Ok(())
}

/// Command-line flags beat both the config file and the environment.
fn with_server_overrides(
    mut config: PropscopeConfig,
    port: Option<u16>,
    bind: Option<String>,
) -> PropscopeConfig {
    if port.is_none() && bind.is_none() {
        return config;
    }
    let server = config.server.get_or_insert_with(ServerConfig::default);
    if port.is_some() {
        server.port = port;
    }
    if bind.is_some() {
        server.bind = bind;
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn classify_requires_a_target() {
        assert!(Cli::try_parse_from(["propscope", "classify"]).is_err());
        assert!(Cli::try_parse_from(["propscope", "classify", "room.jpg", "--sample", "a.jpg"]).is_err());
        assert!(Cli::try_parse_from(["propscope", "classify", "--sample", "a.jpg"]).is_ok());
    }

    #[test]
    fn port_flag_overrides_config() {
        let config = with_server_overrides(PropscopeConfig::default(), Some(9000), None);
        assert_eq!(config.port(), 9000);
        assert_eq!(config.bind(), "0.0.0.0");
    }
}
