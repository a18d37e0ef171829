//! Upstream HTTP client construction.

use std::time::Duration;

use tracing::warn;

use crate::error::{ProxyError, Result};

/// Settings for the outbound client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpstreamSettings {
    /// Bound on send plus body read
    pub timeout: Duration,
    /// Accept any upstream certificate
    pub tls_insecure_skip_verify: bool,
}

impl Default for UpstreamSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            tls_insecure_skip_verify: false,
        }
    }
}

/// Builds the shared reqwest client.
///
/// Redirects are followed with reqwest's default limit of 10 hops.
pub fn build_client(settings: UpstreamSettings) -> Result<reqwest::Client> {
    if settings.tls_insecure_skip_verify {
        warn!("Upstream TLS certificate verification is DISABLED; backend identity is not checked");
    }

    reqwest::Client::builder()
        .timeout(settings.timeout)
        .danger_accept_invalid_certs(settings.tls_insecure_skip_verify)
        .build()
        .map_err(|e| ProxyError::Configuration(format!("failed to build upstream client: {}", e)))
}
