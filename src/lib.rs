//! Cache Proxy - A forwarding HTTP reverse proxy with a bounded response cache
//!
//! Forwards every request to a single backend origin, refuses requests that
//! match a method/suffix deny policy, and caches 200 response bodies by
//! resolved URL with LRU eviction.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod observability;
pub mod policy;
pub mod proxy;

pub use api::{create_router, AppState};
pub use config::Config;
pub use error::{ProxyError, Result};
pub use proxy::CachingForwarder;
