//! Target Resolution
//!
//! Turns an inbound path and query into the absolute backend URL that serves
//! as both forwarding destination and cache key.

use percent_encoding::percent_decode_str;
use url::Url;

use crate::error::{ProxyError, Result};

/// Parses and validates the backend origin.
///
/// The origin must be an absolute `http` or `https` URL with a host.
pub fn parse_backend(raw: &str) -> Result<Url> {
    let url = Url::parse(raw)
        .map_err(|e| ProxyError::Configuration(format!("invalid backend URL '{}': {}", raw, e)))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ProxyError::Configuration(format!(
            "backend URL '{}' must use http or https",
            raw
        )));
    }
    if url.host_str().is_none() {
        return Err(ProxyError::Configuration(format!(
            "backend URL '{}' has no host",
            raw
        )));
    }

    Ok(url)
}

/// Resolves `path` and `query` against `backend`.
///
/// Scheme and authority always come from the backend; the inbound path
/// replaces the backend path and dot segments are normalized. A path that
/// starts with `//` stays a path and cannot redirect to another host.
pub fn resolve_target(backend: &Url, path: &str, query: Option<&str>) -> Url {
    let mut target = backend.clone();
    target.set_fragment(None);

    if path.is_empty() {
        target.set_path("/");
    } else {
        target.set_path(path);
    }
    target.set_query(query);

    target
}

/// Percent-decoded path of a resolved target, the form the backend
/// interprets. Invalid UTF-8 sequences become U+FFFD.
pub fn decoded_path(target: &Url) -> String {
    percent_decode_str(target.path())
        .decode_utf8_lossy()
        .into_owned()
}
