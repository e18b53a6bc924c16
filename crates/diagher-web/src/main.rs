//! DiagHer API server
//!
//! Run with: cargo run -p diagher-web --bin diagher

use tracing::{info, warn};
use tracing_subscriber::{util::SubscriberInitExt, EnvFilter};

use diagher_common::DiagherConfig;
use diagher_web::{router::build_router, state::AppState, telemetry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialise structured logging before the config file is read
    let (subscriber, log_filter) =
        telemetry::build_subscriber(EnvFilter::try_from_default_env().ok(), std::io::stdout);
    subscriber.init();

    let config = DiagherConfig::load()?;
    log_filter.apply(&config.logging)?;

    info!("DiagHer starting up...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));
    info!("Model directory: {}", config.model.dir.display());

    let bind = config.server.bind.clone();
    let preload = config.model.preload;
    let state = AppState::new(config);

    if preload {
        match state.service.preload().await {
            Ok(true) => info!("Diagnosis model preloaded"),
            Ok(false) => warn!("Diagnosis model bundle is incomplete; diagnosis requests will fail"),
            Err(e) => warn!("Diagnosis model preload failed: {}", e),
        }
    }

    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind).await?;
    info!("Server listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("DiagHer stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
