//! MedEstudia completion proxy server.
//!
//! Serves `POST /api/ai`, `GET /health` and `GET /metrics`. Configuration is
//! read from the environment after loading `.env.local` and `.env`.

use anyhow::Context;
use clap::Parser;
use medestudia_core::{init_observability, init_tracing, shutdown_observability};
use medestudia_server::{ApiState, ProxyConfig, create_router};
use std::path::PathBuf;
use tracing::{info, warn};

/// Command-line arguments for the proxy server.
#[derive(Parser, Debug)]
#[command(name = "medestudia-server")]
#[command(about = "MedEstudia AI completion proxy")]
#[command(version)]
struct Args {
    /// Listen address, overriding MEDESTUDIA_BIND
    #[arg(long)]
    bind: Option<String>,

    /// Extra dotenv file loaded before .env.local and .env
    #[arg(long)]
    env_file: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, env = "MEDESTUDIA_LOG_JSON")]
    log_json: bool,

    /// Metrics export interval in seconds (with the `metrics` feature)
    #[arg(long, default_value_t = 60)]
    metrics_interval: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut loaded = Vec::new();
    if let Some(path) = &args.env_file {
        dotenvy::from_path(path)
            .with_context(|| format!("Failed to load env file {}", path.display()))?;
        loaded.push(path.display().to_string());
    }
    for name in [".env.local", ".env"] {
        if dotenvy::from_filename(name).is_ok() {
            loaded.push(name.to_string());
        }
    }

    init_tracing(args.log_json)?;
    init_observability("medestudia-server", args.metrics_interval)?;
    info!(env_files = ?loaded, "Starting MedEstudia proxy");

    let mut config = ProxyConfig::from_env()?;
    if let Some(bind) = args.bind {
        config = config.with_bind(bind);
    }

    let bind = config.bind().clone();
    let state = ApiState::new(config)?;
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("Failed to bind {}", bind))?;
    info!(addr = %listener.local_addr()?, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    shutdown_observability();
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
