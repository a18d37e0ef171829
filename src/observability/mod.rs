//! Observability
//!
//! Structured logging setup and per-request metrics.

pub mod logging;
pub mod metrics;

pub use self::logging::init_tracing;
pub use self::metrics::{install_prometheus, EventRecorder, NoopRecorder, PrometheusRecorder};
