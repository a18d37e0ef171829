//! Caching Forwarder
//!
//! Per-request pipeline: resolve target, check policy, consult the cache,
//! forward on miss, store 200 responses, relay the backend response.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::{Body, Bytes, HttpBody},
    http::{header, HeaderMap, Request, StatusCode},
    response::{IntoResponse, Response},
};
use tracing::{debug, error, info};
use url::Url;

use crate::cache::ResponseCache;
use crate::error::{ProxyError, Result};
use crate::observability::EventRecorder;
use crate::policy::PolicyFilter;
use crate::proxy::client::{build_client, UpstreamSettings};
use crate::proxy::target::{decoded_path, parse_backend, resolve_target};

/// Construction options for [`CachingForwarder`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ForwarderSettings {
    pub upstream: UpstreamSettings,
    /// Send the inbound `Host` header upstream instead of the backend authority
    pub forward_host_header: bool,
}

// == Caching Forwarder ==
/// Forwards requests to a single backend and caches 200 bodies by
/// resolved URL.
///
/// Holds no per-request state; share it behind an `Arc`.
pub struct CachingForwarder {
    backend: Url,
    policy: PolicyFilter,
    cache: Arc<dyn ResponseCache>,
    recorder: Arc<dyn EventRecorder>,
    client: reqwest::Client,
    forward_host_header: bool,
}

impl CachingForwarder {
    /// Fails with a configuration error if `backend_url` is not an absolute
    /// http(s) URL or the client cannot be built.
    pub fn new(
        backend_url: &str,
        policy: PolicyFilter,
        cache: Arc<dyn ResponseCache>,
        recorder: Arc<dyn EventRecorder>,
        settings: ForwarderSettings,
    ) -> Result<Self> {
        let backend = parse_backend(backend_url)?;
        let client = build_client(settings.upstream)?;

        Ok(Self {
            backend,
            policy,
            cache,
            recorder,
            client,
            forward_host_header: settings.forward_host_header,
        })
    }

    pub fn backend(&self) -> &Url {
        &self.backend
    }

    pub fn cache(&self) -> &Arc<dyn ResponseCache> {
        &self.cache
    }

    pub fn policy(&self) -> &PolicyFilter {
        &self.policy
    }

    /// Handles one inbound request. Every failure becomes a well-formed
    /// error response; each request is counted and timed once.
    pub async fn handle(&self, request: Request<Body>) -> Response {
        let start = Instant::now();
        let method = request.method().to_string();
        let path = request.uri().path().to_string();

        let response = match self.forward(request, start).await {
            Ok(response) => response,
            Err(err) => err.into_response(),
        };

        self.recorder.record_request(&method, &path);
        self.recorder.record_duration(&method, &path, start.elapsed());

        response
    }

    async fn forward(&self, request: Request<Body>, start: Instant) -> Result<Response> {
        let (parts, body) = request.into_parts();

        // 1. Resolve target
        let target = resolve_target(&self.backend, parts.uri.path(), parts.uri.query());
        let key = target.as_str().to_string();

        // 2. Policy check, on the path as the backend will decode it
        let path = decoded_path(&target);
        if self.policy.is_blocked(parts.method.as_str(), &path) {
            return Err(ProxyError::Blocked {
                method: parts.method.to_string(),
                path,
            });
        }

        // 3. Cache lookup
        if let Some(cached) = self.cache.get(&key) {
            info!(method = %parts.method, url = %key, "Cache hit");
            return Ok(Response::new(Body::from(cached)));
        }

        debug!(method = %parts.method, url = %key, "Cache miss, forwarding to backend");

        // 4. Outbound dispatch; the inbound body is streamed, never buffered
        let mut outbound = self
            .client
            .request(parts.method.clone(), target)
            .headers(self.outbound_headers(&parts.headers));
        if body.size_hint().exact() != Some(0) {
            outbound = outbound.body(reqwest::Body::wrap_stream(body.into_data_stream()));
        }

        let upstream = outbound
            .send()
            .await
            .map_err(|e| {
                if e.is_builder() {
                    error!(url = %key, error = %e, "Failed to build upstream request");
                    ProxyError::RequestConstruction(e.to_string())
                } else {
                    error!(url = %key, error = %e, timeout = e.is_timeout(), "Upstream request failed");
                    ProxyError::UpstreamTransport(e)
                }
            })?;

        let status = upstream.status();
        let headers = upstream.headers().clone();

        // 5. Body buffering
        let bytes = upstream.bytes().await.map_err(|e| {
            error!(url = %key, error = %e, "Failed to read upstream response body");
            ProxyError::ResponseRead(e)
        })?;

        // 6. Conditional cache store
        if status == StatusCode::OK {
            self.cache.add(key.clone(), bytes.clone());
        }

        info!(
            method = %parts.method,
            url = %key,
            status = status.as_u16(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Proxied request"
        );

        // 7. Relay
        Ok(relay(status, &headers, bytes))
    }

    /// Inbound headers minus `transfer-encoding` and, unless configured,
    /// `Host`. A declared `content-length` still describes the streamed body.
    fn outbound_headers(&self, inbound: &HeaderMap) -> HeaderMap {
        let mut headers = HeaderMap::with_capacity(inbound.len());
        for (name, value) in inbound.iter() {
            if name == header::TRANSFER_ENCODING {
                continue;
            }
            if name == header::HOST && !self.forward_host_header {
                continue;
            }
            headers.append(name.clone(), value.clone());
        }
        headers
    }
}

/// Copies every backend header (multi-values kept) except
/// `transfer-encoding`, since the body goes out as one buffered payload.
fn relay(status: StatusCode, headers: &HeaderMap, body: Bytes) -> Response {
    let mut response = Response::new(Body::from(body));
    *response.status_mut() = status;

    let relayed = response.headers_mut();
    for (name, value) in headers.iter() {
        if name == header::TRANSFER_ENCODING {
            continue;
        }
        relayed.append(name.clone(), value.clone());
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::LruResponseCache;
    use crate::observability::NoopRecorder;
    use crate::policy::BlockPolicy;
    use axum::{extract::Request as AxumRequest, routing::any, Router};
    use std::net::SocketAddr;

    /// Backend that echoes the Host header and request body.
    async fn spawn_echo_backend() -> SocketAddr {
        let app = Router::new().route(
            "/*path",
            any(|request: AxumRequest| async move {
                let host = request
                    .headers()
                    .get(header::HOST)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("")
                    .to_string();
                let body = axum::body::to_bytes(request.into_body(), usize::MAX)
                    .await
                    .unwrap();
                (
                    [("x-seen-host", host)],
                    body,
                )
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        addr
    }

    fn forwarder(backend: &str, settings: ForwarderSettings) -> CachingForwarder {
        CachingForwarder::new(
            backend,
            PolicyFilter::default(),
            Arc::new(LruResponseCache::new(4).unwrap()),
            Arc::new(NoopRecorder),
            settings,
        )
        .unwrap()
    }

    async fn body_string(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn test_new_rejects_bad_backend() {
        let result = CachingForwarder::new(
            "not a url",
            PolicyFilter::default(),
            Arc::new(LruResponseCache::new(1).unwrap()),
            Arc::new(NoopRecorder),
            ForwarderSettings::default(),
        );
        assert!(matches!(result, Err(ProxyError::Configuration(_))));
    }

    #[test]
    fn test_outbound_headers_strip_host_and_framing() {
        let fwd = forwarder("http://origin.test", ForwarderSettings::default());
        let mut inbound = HeaderMap::new();
        inbound.insert(header::HOST, "client.example".parse().unwrap());
        inbound.insert(header::CONTENT_LENGTH, "3".parse().unwrap());
        inbound.insert(header::TRANSFER_ENCODING, "chunked".parse().unwrap());
        inbound.append("x-custom", "one".parse().unwrap());
        inbound.append("x-custom", "two".parse().unwrap());

        let outbound = fwd.outbound_headers(&inbound);
        assert!(outbound.get(header::HOST).is_none());
        assert!(outbound.get(header::TRANSFER_ENCODING).is_none());
        assert_eq!(outbound.get(header::CONTENT_LENGTH).unwrap(), "3");
        let values: Vec<_> = outbound.get_all("x-custom").iter().collect();
        assert_eq!(values.len(), 2);
    }

    #[test]
    fn test_outbound_headers_forward_host_when_enabled() {
        let fwd = forwarder(
            "http://origin.test",
            ForwarderSettings {
                forward_host_header: true,
                ..Default::default()
            },
        );
        let mut inbound = HeaderMap::new();
        inbound.insert(header::HOST, "client.example".parse().unwrap());

        let outbound = fwd.outbound_headers(&inbound);
        assert_eq!(outbound.get(header::HOST).unwrap(), "client.example");
    }

    #[test]
    fn test_relay_keeps_multi_value_headers() {
        let mut headers = HeaderMap::new();
        headers.append(header::SET_COOKIE, "a=1".parse().unwrap());
        headers.append(header::SET_COOKIE, "b=2".parse().unwrap());
        headers.insert(header::TRANSFER_ENCODING, "chunked".parse().unwrap());

        let response = relay(StatusCode::NOT_FOUND, &headers, Bytes::from_static(b"x"));
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.headers().get_all(header::SET_COOKIE).iter().count(), 2);
        assert!(response.headers().get(header::TRANSFER_ENCODING).is_none());
    }

    #[tokio::test]
    async fn test_host_rewritten_to_backend_by_default() {
        let addr = spawn_echo_backend().await;
        let fwd = forwarder(&format!("http://{}", addr), ForwarderSettings::default());

        let request = Request::builder()
            .uri("/echo")
            .header(header::HOST, "client.example")
            .body(Body::empty())
            .unwrap();
        let response = fwd.handle(request).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get("x-seen-host").unwrap(),
            addr.to_string().as_str()
        );
    }

    #[tokio::test]
    async fn test_inbound_host_forwarded_when_enabled() {
        let addr = spawn_echo_backend().await;
        let fwd = forwarder(
            &format!("http://{}", addr),
            ForwarderSettings {
                forward_host_header: true,
                ..Default::default()
            },
        );

        let request = Request::builder()
            .uri("/echo")
            .header(header::HOST, "client.example")
            .body(Body::empty())
            .unwrap();
        let response = fwd.handle(request).await;

        assert_eq!(response.headers().get("x-seen-host").unwrap(), "client.example");
    }

    #[tokio::test]
    async fn test_request_body_is_forwarded() {
        let addr = spawn_echo_backend().await;
        let fwd = forwarder(&format!("http://{}", addr), ForwarderSettings::default());

        let request = Request::builder()
            .method("POST")
            .uri("/submit")
            .body(Body::from("payload"))
            .unwrap();
        let response = fwd.handle(request).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "payload");
    }

    #[tokio::test]
    async fn test_blocked_request_never_consults_cache() {
        let cache = Arc::new(LruResponseCache::new(4).unwrap());
        cache.add(
            "http://origin.test/tool.exe".to_string(),
            Bytes::from_static(b"cached"),
        );
        let fwd = CachingForwarder::new(
            "http://origin.test",
            PolicyFilter::new(BlockPolicy::default()),
            cache.clone(),
            Arc::new(NoopRecorder),
            ForwarderSettings::default(),
        )
        .unwrap();

        let request = Request::builder()
            .uri("/tool.exe")
            .body(Body::empty())
            .unwrap();
        let response = fwd.handle(request).await;

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let stats = cache.stats();
        assert_eq!(stats.hits + stats.misses, 0);
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_bad_gateway() {
        // Bind then drop to get a port with nothing listening
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let fwd = forwarder(&format!("http://{}", addr), ForwarderSettings::default());
        let request = Request::builder().uri("/a").body(Body::empty()).unwrap();
        let response = fwd.handle(request).await;

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert!(fwd.cache().is_empty());
    }
}
