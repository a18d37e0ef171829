//! Cache Proxy - A forwarding HTTP reverse proxy with a bounded response cache

use std::net::SocketAddr;

use anyhow::Context;
use tokio::signal;
use tracing::{info, warn};

use cache_proxy::{
    api::{create_router, AppState},
    config::Config,
    observability::{init_tracing, install_prometheus},
};

/// Main entry point for the caching proxy.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Install the Prometheus metrics recorder
/// 4. Build cache, policy filter and forwarder
/// 5. Start HTTP server on configured port
/// 6. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    info!("Starting cache proxy");

    let config = Config::from_env().context("failed to load configuration")?;
    info!(
        backend = %config.backend_url,
        cache_capacity = config.cache_capacity,
        port = config.server_port,
        timeout_secs = config.request_timeout_secs,
        "Configuration loaded"
    );

    let metrics = install_prometheus().context("failed to install metrics exporter")?;

    let state = AppState::from_config(&config)
        .context("failed to initialize forwarder")?
        .with_metrics(metrics);
    info!(
        denied_methods = ?config.denied_methods,
        denied_suffixes = ?config.denied_suffixes,
        "Forwarder initialized"
    );

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Proxy listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
