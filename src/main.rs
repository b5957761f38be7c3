use anyhow::Result;
use clap::Parser;
use crabvoice::{cli, logging};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file before anything else (silently ignore if missing)
    dotenvy::dotenv().ok();

    // Parse CLI arguments first to check for debug flag
    let cli_args = cli::Cli::parse();

    // Config before the subscriber: the logging section (level, file) feeds it
    let config = cli::load_config(cli_args.config.as_deref())?;

    let mut log_config = logging::LogConfig::new()
        .with_debug_mode(cli_args.debug)
        .with_level(config.logging.level.clone())
        .with_log_file(config.logging.file.clone());

    // Custom log directory from env
    if let Ok(log_dir) = std::env::var("CRABVOICE_LOG_DIR") {
        log_config = log_config.with_log_dir(std::path::PathBuf::from(log_dir));
    }

    let log_dir = log_config.log_dir.clone();
    let _guard = logging::init_logging(log_config)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    // Clean up old log files (keep last 7 days)
    if cli_args.debug
        && let Ok(removed) = logging::cleanup_old_logs(&log_dir, 7)
        && removed > 0
    {
        tracing::info!("🧹 Cleaned up {} old log file(s)", removed);
    }

    // Run CLI application
    cli::run(cli_args, config).await
}
