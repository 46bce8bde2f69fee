//! silencer-api - Audio silence removal service
//!
//! Accepts audio uploads over HTTP, removes silent spans and returns the
//! trimmed audio: one file directly, several files as a zip archive with a
//! `processing_summary.json` manifest.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use silencer_common::config::{ConfigOverrides, LoggingConfig, ServiceConfig};
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use silencer_api::AppState;

/// Command-line arguments for silencer-api
#[derive(Parser, Debug)]
#[command(name = "silencer-api")]
#[command(about = "Audio silence removal service")]
#[command(version)]
struct Args {
    /// TOML configuration file
    #[arg(short, long, env = "SILENCER_CONFIG")]
    config: Option<PathBuf>,

    /// Address to bind (default 0.0.0.0)
    #[arg(long, env = "SILENCER_HOST")]
    host: Option<String>,

    /// Port to listen on (default 10000)
    #[arg(short, long, env = "PORT")]
    port: Option<u16>,

    /// Log level or filter directive (trace, debug, info, warn, error)
    #[arg(long, env = "SILENCER_LOG_LEVEL")]
    log_level: Option<String>,

    /// Also write logs to this file
    #[arg(long, env = "SILENCER_LOG_FILE")]
    log_file: Option<PathBuf>,

    /// Directory for transient working files
    #[arg(long, env = "SILENCER_WORK_DIR")]
    work_dir: Option<PathBuf>,

    /// Files processed concurrently per batch request
    #[arg(long, env = "SILENCER_MAX_WORKERS")]
    max_workers: Option<usize>,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            host: self.host.clone(),
            port: self.port,
            log_level: self.log_level.clone(),
            log_file: self.log_file.clone(),
            work_dir: self.work_dir.clone(),
            max_workers: self.max_workers,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse();

    let mut config =
        ServiceConfig::load(args.config.as_deref()).context("Failed to load configuration")?;
    config.apply_overrides(args.overrides());
    config.validate().context("Invalid configuration")?;

    init_tracing(&config.logging)?;

    info!("Starting silencer-api v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Build: {} ({}, {})",
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    info!(
        min_silence_len_ms = config.processing.min_silence_len_ms,
        silence_thresh_db = config.processing.silence_thresh_db,
        keep_silence_ms = config.processing.keep_silence_ms,
        "Processing parameters"
    );
    info!(
        max_workers = config.batch.max_workers,
        file_timeout_secs = config.batch.file_timeout_secs,
        max_request_size_bytes = config.limits.max_request_size_bytes,
        work_dir = %config.work_dir().display(),
        "Batch settings"
    );

    let host = config.server.host.clone();
    let port = config.server.port;

    let state = AppState::new(config);
    let app = silencer_api::build_router(state);

    let listener = tokio::net::TcpListener::bind((host.as_str(), port))
        .await
        .with_context(|| format!("Failed to bind to {}:{}", host, port))?;
    let addr = listener.local_addr().context("Failed to read bound address")?;

    info!("Listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Console logging, plus a plain-text copy in the configured log file
///
/// `RUST_LOG` takes precedence over the configured level.
fn init_tracing(logging: &LoggingConfig) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&logging.level)
            .with_context(|| format!("Invalid log level {:?}", logging.level))?,
    };

    let file_layer = match &logging.file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .init();

    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
