//! Metrics collection and exposition.
//!
//! # Metrics
//! - `proxy_requests_total` (counter): requests by method, path
//! - `proxy_request_duration_seconds` (histogram): handling latency by method, path
//!
//! The forwarder only sees the [`EventRecorder`] trait, so tests can swap in
//! a counting fake.

use std::time::Duration;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::error::{ProxyError, Result};

pub const REQUESTS_TOTAL: &str = "proxy_requests_total";
pub const REQUEST_DURATION_SECONDS: &str = "proxy_request_duration_seconds";

// == Event Recorder ==
/// Per-request metric sink.
pub trait EventRecorder: Send + Sync {
    /// Counts one handled request.
    fn record_request(&self, method: &str, path: &str);

    /// Observes the time taken to handle one request.
    fn record_duration(&self, method: &str, path: &str, elapsed: Duration);
}

/// Recorder that writes to the global `metrics` facade.
///
/// With no exporter installed the facade drops everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrometheusRecorder;

impl EventRecorder for PrometheusRecorder {
    fn record_request(&self, method: &str, path: &str) {
        metrics::counter!(
            REQUESTS_TOTAL,
            "method" => method.to_string(),
            "path" => path.to_string()
        )
        .increment(1);
    }

    fn record_duration(&self, method: &str, path: &str, elapsed: Duration) {
        metrics::histogram!(
            REQUEST_DURATION_SECONDS,
            "method" => method.to_string(),
            "path" => path.to_string()
        )
        .record(elapsed.as_secs_f64());
    }
}

/// Recorder that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopRecorder;

impl EventRecorder for NoopRecorder {
    fn record_request(&self, _method: &str, _path: &str) {}

    fn record_duration(&self, _method: &str, _path: &str, _elapsed: Duration) {}
}

/// Installs the Prometheus exporter as the global metrics recorder.
///
/// Can only succeed once per process.
pub fn install_prometheus() -> Result<PrometheusHandle> {
    PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| ProxyError::Configuration(format!("failed to install metrics recorder: {}", e)))
}
