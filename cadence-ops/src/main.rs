//! Cadence Operations (cadence-ops) - Main entry point
//!
//! Serves the sales-operations dashboard core: the follow-up sequence
//! engine and the spaced-repetition trainer, over a REST API backed by
//! SQLite.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cadence_common::config;
use cadence_common::time::SystemClock;
use cadence_ops::api::server::{self, AppContext};

/// Command-line arguments for cadence-ops
#[derive(Parser, Debug)]
#[command(name = "cadence-ops")]
#[command(about = "Follow-up sequencer and trainer service for Cadence")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "5730", env = "CADENCE_PORT")]
    port: u16,

    /// Root folder for the database and configuration
    #[arg(short, long, env = "CADENCE_ROOT")]
    root_folder: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cadence_ops=debug,cadence_common=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Parse command-line arguments
    let args = Args::parse();

    info!("Starting Cadence Operations on port {}", args.port);

    let cli_root = args.root_folder.as_ref().map(|p| p.to_string_lossy());
    let root_folder = config::resolve_root_folder(cli_root.as_deref());
    config::ensure_root_folder(&root_folder).context("Failed to create root folder")?;
    info!("Root folder: {}", root_folder.display());

    let db_path = config::database_path(&root_folder);
    let pool = cadence_common::db::init::init_database(&db_path)
        .await
        .context("Failed to initialize database")?;

    let ctx = AppContext {
        db: pool,
        clock: Arc::new(SystemClock),
    };

    server::run(ctx, args.port, shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
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
