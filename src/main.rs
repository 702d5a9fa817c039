use anyhow::{Context, Result};
use learnapp::{api, config, logging, store::InMemoryTopicStore};
use std::net::Ipv4Addr;
use std::sync::Arc;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<()> {
    let config = config::init_config().context("failed to load configuration")?;
    logging::init_tracing();

    let app = api::create_router(Arc::new(InMemoryTopicStore::seeded()));

    let listener = TcpListener::bind((Ipv4Addr::UNSPECIFIED, config.server_port))
        .await
        .with_context(|| format!("failed to bind port {}", config.server_port))?;
    tracing::info!("Learning App running on port {}", config.server_port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server terminated unexpectedly")?;

    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown signal received"),
        Err(err) => {
            tracing::error!(error = %err, "Failed to listen for shutdown signal");
            std::future::pending::<()>().await;
        }
    }
}
