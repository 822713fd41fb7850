use std::fs::OpenOptions;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use video_rename::cli::Args;
use video_rename::config::RenamerConfig;
use video_rename::headless;
use video_rename::probe::MediaInfoCli;
use video_rename::tui;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = RenamerConfig::load(args.config.as_deref())
        .await
        .context("failed to load config")?;
    init_logging(&config, args.is_headless())?;

    let probe = MediaInfoCli::new(&config.mediainfo_path);
    tracing::info!(files = args.files.len(), headless = args.is_headless(), "starting");

    if args.is_headless() {
        let ok = headless::run(&args, &config, Arc::new(probe), &mut std::io::stdout()).await?;
        if !ok {
            std::process::exit(1);
        }
        return Ok(());
    }

    tui::run_tui(args.files, config, probe).await
}

/// Headless runs log to stderr; the TUI owns the terminal, so it logs to a
/// file instead.
fn init_logging(config: &RenamerConfig, headless: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));

    if headless {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
        return Ok(());
    }

    let path = config.log_file_path();
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Arc::new(file))
        .init();
    Ok(())
}
