//! API Routes
//!
//! Configures the Axum router: the proxy's own endpoints plus a catch-all
//! fallback into the caching forwarder.

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use super::handlers::{health_handler, metrics_handler, proxy_handler, stats_handler, AppState};

/// Creates the main router.
///
/// # Endpoints
/// - `GET /health` - Liveness check, always `OK`
/// - `GET /metrics` - Prometheus exposition
/// - `GET /stats` - Cache statistics
/// - anything else - Forwarded to the backend through the cache, including
///   non-GET methods on the paths above
///
/// # Middleware
/// - Tracing: access log for every request
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler).fallback(proxy_handler))
        .route("/metrics", get(metrics_handler).fallback(proxy_handler))
        .route("/stats", get(stats_handler).fallback(proxy_handler))
        .fallback(proxy_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
