//! Inertia middleware demo server.
//!
//! ```text
//!  Browser / SPA client
//!        │
//!        ▼
//!  ┌──────────────┐   ┌──────────────┐   ┌──────────────┐   ┌──────────┐
//!  │  TraceLayer  │──▶│   sessions   │──▶│   Inertia    │──▶│  pages   │
//!  │              │   │ (cookie, mem)│   │   adapter    │   │ (render) │
//!  └──────────────┘   └──────────────┘   └──────────────┘   └──────────┘
//! ```

use clap::Parser;
use std::path::PathBuf;
use tokio::net::TcpListener;

use inertia_middleware::config::{load_config, AppConfig};
use inertia_middleware::observability::{logging, metrics};
use inertia_middleware::AppServer;

#[derive(Parser)]
#[command(name = "inertia-demo")]
#[command(about = "Demo server for the Inertia middleware", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the configured asset version.
    #[arg(long)]
    asset_version: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };
    if cli.asset_version.is_some() {
        config.inertia.version = cli.asset_version;
    }

    logging::init_logging(&config.observability.log_level);
    tracing::info!("inertia-demo v{} starting", env!("CARGO_PKG_VERSION"));

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr)?,
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    AppServer::new(config).run(listener, shutdown_signal()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Wait for Ctrl+C.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
