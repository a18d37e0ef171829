//! Response models for the proxy's own endpoints
//!
//! Proxied traffic is relayed byte for byte; only `/stats` has a JSON body.

pub mod responses;

pub use responses::StatsResponse;
