//! tubelink - YouTube direct download URL service
//!
//! A small HTTP API that turns a YouTube link into a direct media URL by trying
//! the InnerTube player API, a resolution web API, yt-dlp and Invidious in turn.

use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tubelink::extractor::{self, ytdlp};
use tubelink::server::{self, AppState};
use tubelink::utils::{config, AppSettings};

#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// TOML settings file
    #[arg(long, env = "TUBELINK_CONFIG")]
    config: Option<PathBuf>,

    /// Interface to bind
    #[arg(long, env = "HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(long, env = "PORT")]
    port: Option<u16>,

    /// yt-dlp binary to use instead of searching for one
    #[arg(long, env = "YTDLP_PATH")]
    ytdlp_path: Option<PathBuf>,
}

fn load_settings(args: &Args) -> Result<AppSettings> {
    let mut settings = match &args.config {
        Some(path) => AppSettings::load(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => match config::default_config_path().filter(|p| p.is_file()) {
            Some(path) => {
                info!("Using config file {}", path.display());
                AppSettings::load(&path)?
            }
            None => AppSettings::default(),
        },
    };

    if let Some(host) = &args.host {
        settings.host = host.clone();
    }
    if let Some(port) = args.port {
        settings.port = port;
    }
    if let Some(path) = &args.ytdlp_path {
        settings.ytdlp.path = Some(path.clone());
    }
    settings.validate();
    Ok(settings)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutting down");
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let settings = load_settings(&args)?;

    let client = reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(10))
        .build()
        .context("failed to build HTTP client")?;

    // Missing yt-dlp is not fatal; the other strategies still run
    let ytdlp_path = if settings.ytdlp.enabled {
        ytdlp::find_ytdlp(settings.ytdlp.path.as_deref())
    } else {
        None
    };
    if settings.ytdlp.enabled && ytdlp_path.is_none() {
        warn!("yt-dlp not found; install it with `pip install yt-dlp` to enable its strategies");
    }

    let chain = extractor::build_chain(&settings, &client, ytdlp_path.as_ref());
    let state = Arc::new(AppState::new(chain, ytdlp_path));
    let app = server::router(state);

    let address: SocketAddr = format!("{}:{}", settings.host, settings.port)
        .parse()
        .with_context(|| format!("invalid listen address {}:{}", settings.host, settings.port))?;
    info!("Starting on {}", address);

    let listener = tokio::net::TcpListener::bind(address).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
