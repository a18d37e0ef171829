//! Structured logging.
//!
//! Installs the global `tracing` subscriber used by the binary. Library code
//! only emits events through the `tracing` macros.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Default filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "cache_proxy=info,tower_http=info";

/// Initializes the fmt subscriber with an env filter.
///
/// Defaults to [`DEFAULT_LOG_FILTER`], overridable with `RUST_LOG`.
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
