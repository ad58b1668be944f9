use listing_tiers::{build_app, config::Config, observability::init_tracing};
use std::net::SocketAddr;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = Config::load()?;
    config.validate()?;

    // Initialize tracing/logging
    init_tracing(&config.observability);

    tracing::info!("Starting listing-tiers service");
    tracing::info!("Configuration loaded: {:?}", config.server);

    let app = build_app(&config).await?;

    let host: std::net::IpAddr = config
        .server
        .host
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid server host {}: {}", config.server.host, e))?;
    let addr = SocketAddr::from((host, config.server.port));
    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app.router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    if let Some(sweeper) = app.sweeper {
        sweeper.shutdown().await;
    }

    tracing::info!("listing-tiers service stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
