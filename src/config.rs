//! Configuration Module
//!
//! Handles loading and managing proxy configuration from environment variables.

use std::env;
use std::time::Duration;

use crate::error::{ProxyError, Result};
use crate::policy::BlockPolicy;

/// Proxy configuration parameters.
///
/// Only `BACKEND_URL` is mandatory; everything else has a default.
#[derive(Debug, Clone)]
pub struct Config {
    /// Origin every request is forwarded to
    pub backend_url: String,
    /// Maximum number of cached responses
    pub cache_capacity: usize,
    /// HTTP server port
    pub server_port: u16,
    /// Upstream request timeout in seconds
    pub request_timeout_secs: u64,
    /// Skip upstream TLS certificate verification
    pub tls_insecure_skip_verify: bool,
    /// Forward the inbound `Host` header instead of the backend authority
    pub forward_host_header: bool,
    /// Methods rejected by the policy filter
    pub denied_methods: Vec<String>,
    /// Path suffixes rejected by the policy filter
    pub denied_suffixes: Vec<String>,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `BACKEND_URL` - Backend origin (required)
    /// - `CACHE_CAPACITY` - Maximum cached responses (default: 128)
    /// - `SERVER_PORT` - HTTP server port (default: 8080)
    /// - `REQUEST_TIMEOUT` - Upstream timeout in seconds (default: 5)
    /// - `TLS_INSECURE_SKIP_VERIFY` - Disable upstream certificate checks (default: false)
    /// - `FORWARD_HOST_HEADER` - Forward the inbound Host header (default: false)
    /// - `DENIED_METHODS` - Comma-separated methods (default: DELETE,PATCH)
    /// - `DENIED_SUFFIXES` - Comma-separated suffixes (default: .exe,.bat,.sh,.cmd)
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a Config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let backend_url = lookup("BACKEND_URL")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ProxyError::Configuration("BACKEND_URL is required".to_string()))?;

        let cache_capacity = match lookup("CACHE_CAPACITY") {
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ProxyError::Configuration(format!(
                        "CACHE_CAPACITY must be a positive integer, got '{}'",
                        raw
                    )))
                }
            },
            None => defaults.cache_capacity,
        };

        Ok(Self {
            backend_url,
            cache_capacity,
            server_port: lookup("SERVER_PORT")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(defaults.server_port),
            request_timeout_secs: lookup("REQUEST_TIMEOUT")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(defaults.request_timeout_secs),
            tls_insecure_skip_verify: lookup("TLS_INSECURE_SKIP_VERIFY")
                .and_then(|v| parse_bool(&v))
                .unwrap_or(defaults.tls_insecure_skip_verify),
            forward_host_header: lookup("FORWARD_HOST_HEADER")
                .and_then(|v| parse_bool(&v))
                .unwrap_or(defaults.forward_host_header),
            denied_methods: lookup("DENIED_METHODS")
                .map(|v| parse_list(&v))
                .unwrap_or(defaults.denied_methods),
            denied_suffixes: lookup("DENIED_SUFFIXES")
                .map(|v| parse_list(&v))
                .unwrap_or(defaults.denied_suffixes),
        })
    }

    /// Upstream timeout as a Duration.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Deny policy described by this configuration.
    pub fn block_policy(&self) -> BlockPolicy {
        BlockPolicy::new(self.denied_methods.clone(), self.denied_suffixes.clone())
    }
}

impl Default for Config {
    fn default() -> Self {
        let policy = BlockPolicy::default();
        Self {
            backend_url: "http://127.0.0.1:9000".to_string(),
            cache_capacity: 128,
            server_port: 8080,
            request_timeout_secs: 5,
            tls_insecure_skip_verify: false,
            forward_host_header: false,
            denied_methods: policy.denied_methods().to_vec(),
            denied_suffixes: policy.denied_suffixes().to_vec(),
        }
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
