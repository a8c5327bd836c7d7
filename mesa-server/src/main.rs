//! mesa-server: restaurant order, kitchen and settlement service
//!
//! Long-running service that:
//! - Places and advances orders for staff of many restaurants (JWT authenticated)
//! - Serves the kitchen queue
//! - Settles orders into exactly one payment each
//! - Pushes lifecycle events to connected clients over WebSocket

use mesa_server::{AppState, Config, api, utils};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // Load .env file
    let _ = dotenvy::dotenv();

    let config = Config::from_env()?;
    utils::init_logger_with_file(&config.log_level, config.log_dir.as_deref());

    tracing::info!("Starting mesa-server (env: {})", config.environment);
    if config.is_development() && std::env::var("JWT_SECRET").is_err() {
        tracing::warn!("JWT_SECRET not set, using the development secret");
    }

    let state = AppState::new(&config).await?;
    let app = api::router(state);

    let http_addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&http_addr).await?;
    tracing::info!("mesa-server HTTP listening on {http_addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("mesa-server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
