//! Serve command

use anyhow::{Context, Result};
use std::sync::Arc;

use crate::ServerConfig;
use crate::api::{self, state::ApiState};

pub async fn serve(config: &ServerConfig) -> Result<()> {
    std::fs::create_dir_all(&config.binaries_dir).with_context(|| {
        format!(
            "Failed to create binaries directory {}",
            config.binaries_dir.display()
        )
    })?;

    let service = config.release_service();
    let version = service.versions().resolve();
    let state = Arc::new(ApiState::new(service, config.token.clone()));
    let app = api::create_router(state);

    let addr = config.listen_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    tracing::info!("Server listening on http://{addr}");
    tracing::info!("Binaries in: {}", config.binaries_dir.display());
    tracing::info!("Current version: {version}");
    if config.token.is_none() {
        tracing::warn!("UPDATE_SERVER_TOKEN not set; build endpoints are unauthenticated");
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
}
