//! API Handlers
//!
//! Handlers for the proxy's own endpoints and the catch-all forwarder.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use metrics_exporter_prometheus::PrometheusHandle;

use crate::cache::LruResponseCache;
use crate::config::Config;
use crate::error::Result;
use crate::models::StatsResponse;
use crate::observability::{EventRecorder, PrometheusRecorder};
use crate::policy::PolicyFilter;
use crate::proxy::{CachingForwarder, ForwarderSettings, UpstreamSettings};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub forwarder: Arc<CachingForwarder>,
    /// Exporter rendered by `/metrics`; `None` when metrics are not installed
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(forwarder: CachingForwarder) -> Self {
        Self {
            forwarder: Arc::new(forwarder),
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    /// Wires cache, policy, upstream client and forwarder from configuration.
    ///
    /// Fails with a configuration error on a bad backend URL or capacity.
    pub fn from_config(config: &Config) -> Result<Self> {
        let cache = Arc::new(LruResponseCache::new(config.cache_capacity)?);
        let recorder: Arc<dyn EventRecorder> = Arc::new(PrometheusRecorder);

        let forwarder = CachingForwarder::new(
            &config.backend_url,
            PolicyFilter::new(config.block_policy()),
            cache,
            recorder,
            ForwarderSettings {
                upstream: UpstreamSettings {
                    timeout: config.request_timeout(),
                    tls_insecure_skip_verify: config.tls_insecure_skip_verify,
                },
                forward_host_header: config.forward_host_header,
            },
        )?;

        Ok(Self::new(forwarder))
    }
}

/// Fallback handler: everything not routed elsewhere goes to the backend.
pub async fn proxy_handler(State(state): State<AppState>, request: Request) -> Response {
    state.forwarder.handle(request).await
}

/// Handler for GET /health
pub async fn health_handler() -> &'static str {
    "OK"
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let cache = state.forwarder.cache();
    Json(StatsResponse::new(&cache.stats(), cache.capacity()))
}

/// Handler for GET /metrics
pub async fn metrics_handler(State(state): State<AppState>) -> Response {
    match state.metrics {
        Some(ref handle) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            Body::from(handle.render()),
        )
            .into_response(),
        None => (StatusCode::SERVICE_UNAVAILABLE, "Metrics exporter not installed").into_response(),
    }
}
