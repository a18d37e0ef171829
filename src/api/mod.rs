//! API Module
//!
//! HTTP handlers and routing for the proxy.
//!
//! # Endpoints
//! - `GET /health` - Liveness check
//! - `GET /metrics` - Prometheus exposition
//! - `GET /stats` - Cache statistics
//! - fallback - Caching forwarder

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
