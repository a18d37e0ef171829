//! Error types for the caching proxy
//!
//! Provides unified error handling using thiserror. Every variant maps to
//! exactly one terminal HTTP status; the body never carries internal detail.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

// == Proxy Error Enum ==
/// Unified error type for the caching proxy.
#[derive(Error, Debug)]
pub enum ProxyError {
    /// Invalid startup configuration (backend URL, cache capacity, ...)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Request matched the deny policy
    #[error("Request blocked by policy: {method} {path}")]
    Blocked { method: String, path: String },

    /// The outbound request could not be assembled
    #[error("Failed to build upstream request: {0}")]
    RequestConstruction(String),

    /// The outbound request could not be sent or timed out
    #[error("Upstream request failed: {0}")]
    UpstreamTransport(#[source] reqwest::Error),

    /// The backend body could not be fully read
    #[error("Failed to read upstream response: {0}")]
    ResponseRead(#[source] reqwest::Error),
}

impl ProxyError {
    /// HTTP status surfaced to the client for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::Blocked { .. } => StatusCode::FORBIDDEN,
            ProxyError::UpstreamTransport(_) => StatusCode::BAD_GATEWAY,
            ProxyError::Configuration(_)
            | ProxyError::RequestConstruction(_)
            | ProxyError::ResponseRead(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short client-facing explanation.
    fn public_message(&self) -> &'static str {
        match self {
            ProxyError::Blocked { .. } => "Forbidden",
            ProxyError::UpstreamTransport(_) => "Bad gateway: upstream request failed",
            ProxyError::ResponseRead(_) => "Internal error while reading upstream response",
            ProxyError::RequestConstruction(_) => "Internal error while building upstream request",
            ProxyError::Configuration(_) => "Internal error",
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        (self.status(), self.public_message()).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the caching proxy.
pub type Result<T> = std::result::Result<T, ProxyError>;
