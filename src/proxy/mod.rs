//! Proxy Module
//!
//! The request-forwarding-and-caching pipeline.

pub mod client;
mod forwarder;
pub mod target;

pub use client::{build_client, UpstreamSettings};
pub use forwarder::{CachingForwarder, ForwarderSettings};
pub use target::{decoded_path, parse_backend, resolve_target};
