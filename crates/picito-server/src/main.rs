//! Picito Server — Application entry point.

use std::sync::Arc;

use anyhow::Context;
use picito_db::DbManager;
use picito_server::{AppState, ServerConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("picito=info".parse()?))
        .json()
        .init();

    info!("Starting Picito server...");

    let config = ServerConfig::load_with_dotenv().context("loading configuration")?;
    let db = DbManager::connect(&config.database)
        .await
        .context("connecting to SurrealDB")?;

    let state = Arc::new(AppState::new(db.client().clone(), config.auth.clone()));

    let report = state
        .organizations
        .reconcile()
        .await
        .context("reconciling organizations")?;
    info!(
        promoted = report.promoted.len(),
        deleted = report.deleted.len(),
        "Startup reconciliation done"
    );

    let listener = tokio::net::TcpListener::bind(&config.http.bind_addr)
        .await
        .with_context(|| format!("binding {}", config.http.bind_addr))?;
    info!(addr = %config.http.bind_addr, "Listening");

    axum::serve(listener, picito_server::app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Picito server stopped.");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to listen for shutdown signal");
    }
}
