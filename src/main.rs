//! ytm-backend server binary
//!
//! Usage: `ytm-backend [PORT] [--config FILE] [--yt-dlp PATH]`

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use ytm_backend::{Config, ExtractionEngine, JobLauncher, NoOpEngine, YtDlpEngine};

#[derive(Debug, Parser)]
#[command(name = "ytm-backend", version, about = "Local media backend for the ytm-rs client")]
struct Cli {
    /// Port to listen on (overrides the configured bind port)
    port: Option<u16>,

    /// JSON configuration file
    #[arg(long, short = 'c', env = "YTM_BACKEND_CONFIG")]
    config: Option<PathBuf>,

    /// Path to the yt-dlp executable
    #[arg(long = "yt-dlp", env = "YTM_BACKEND_YT_DLP")]
    yt_dlp: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    if let Some(port) = cli.port {
        config.server.api.bind_address.set_port(port);
    }
    if let Some(path) = cli.yt_dlp {
        config.engine.binary_path = Some(path);
    }

    let engine: Arc<dyn ExtractionEngine> = match YtDlpEngine::from_config(&config.engine) {
        Some(engine) => {
            tracing::info!(path = %engine.binary_path().display(), "using yt-dlp");
            Arc::new(engine)
        }
        None => {
            tracing::warn!("yt-dlp not found, metadata and download requests will fail");
            Arc::new(NoOpEngine)
        }
    };

    let config = Arc::new(config);
    let launcher = Arc::new(JobLauncher::from_config(engine, &config));

    ytm_backend::api::start_api_server(launcher, config).await?;
    Ok(())
}
