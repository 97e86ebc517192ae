//! # Innkeeper Main Entry Point
//!
//! Loads configuration, prepares the database, starts the checkout
//! scheduler and serves the HTTP API until Ctrl+C.

use std::sync::Arc;

use anyhow::Context;
use innkeeper::{
    config::ConfigLoader, db, scheduler::CheckoutScheduler, server::run_server, telemetry,
};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration from layered env files and variables
    let config = ConfigLoader::new()
        .load()
        .context("Failed to load configuration")?;
    telemetry::init_tracing(&config)?;

    info!(profile = %config.profile, "Loaded configuration");
    if let Ok(redacted_json) = config.redacted_json() {
        info!(config = %redacted_json, "Effective configuration");
    }

    let db = db::init_pool(&config).await?;
    if config.run_migrations {
        db::run_migrations(&db).await?;
    }

    let config = Arc::new(config);
    let shutdown = CancellationToken::new();

    let scheduler_task = if config.scheduler.enabled {
        let scheduler = CheckoutScheduler::new(Arc::clone(&config), Arc::new(db.clone()));
        Some(tokio::spawn(scheduler.run(shutdown.child_token())))
    } else {
        info!("Checkout scheduler disabled");
        None
    };

    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(err) => error!(error = %err, "Failed to listen for Ctrl+C, shutting down"),
        }
        signal_token.cancel();
    });

    let served = run_server(Arc::clone(&config), db, shutdown.clone()).await;
    shutdown.cancel();

    if let Some(task) = scheduler_task {
        match task.await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => error!(error = ?err, "Checkout scheduler exited with error"),
            Err(err) => error!(error = %err, "Checkout scheduler task panicked"),
        }
    }

    served
}
