// DLX Command Center
// Main entry point for the dlx binary

use clap::Parser;
use dlx_engine::cli::{Cli, Command, ConfigAction};
use dlx_engine::config::Config;
use dlx_engine::daemon::Daemon;
use dlx_engine::handlers::{handle_config_path, handle_config_show, handle_doctor, OutputFormat};
use dlx_engine::telemetry::init_telemetry_with_level;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // API keys may live in a .env file next to the working directory
    let dotenv = dotenvy::dotenv();

    // Load configuration (or use custom path if provided)
    let config_path = match &cli.config {
        Some(path) => path.clone(),
        None => Config::default_config_path()?,
    };
    let mut config = if cli.config.is_some() {
        Config::load_from_path(&config_path)?
    } else {
        Config::load_or_create()?
    };

    // --log wins over the config file; RUST_LOG wins over both
    if let Some(level) = &cli.log {
        config.core.log_level = level.clone();
    }
    init_telemetry_with_level(&config.core.log_level);

    let version = env!("CARGO_PKG_VERSION");
    let commit = env!("GIT_COMMIT_HASH");
    let timestamp = env!("BUILD_TIMESTAMP");

    tracing::info!("DLX Command Center v{} ({} - {})", version, commit, timestamp);
    match dotenv {
        Ok(path) => tracing::debug!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => {}
        Err(e) => tracing::warn!("Failed to load .env file: {}", e),
    }

    // Determine output format
    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };

    // Handle commands
    match cli.command {
        Command::Serve { bind } => {
            if let Some(bind) = bind {
                config.core.bind = bind;
            }
            tracing::info!("Starting command center on {}", config.core.bind);
            Daemon::new(config).run().await?;
            Ok(())
        }

        Command::Config { action } => match action {
            ConfigAction::Show => handle_config_show(&config, format),
            ConfigAction::Path => handle_config_path(&config_path, format),
        },

        Command::Doctor => {
            tracing::info!("Running diagnostics...");
            handle_doctor(&config, format).await
        }
    }
}
