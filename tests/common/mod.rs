//! Shared test fixtures: a call-counting stub backend and a counting recorder.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    body::to_bytes,
    extract::Request,
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{AppendHeaders, IntoResponse},
    routing::{any, get},
    Router,
};
use cache_proxy::observability::EventRecorder;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

/// Backend stub listening on an ephemeral localhost port.
pub struct StubBackend {
    pub addr: SocketAddr,
    calls: Arc<AtomicUsize>,
}

impl StubBackend {
    pub async fn start() -> Self {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        let app = Router::new()
            .route("/a", get(|| async { "A" }))
            .route("/b", get(|| async { "B" }))
            .route("/c", get(|| async { "C" }))
            .route("/tool.exe", get(|| async { "binary" }))
            .route(
                "/missing",
                get(|| async { (StatusCode::NOT_FOUND, "not here") }),
            )
            .route(
                "/boom",
                get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
            )
            .route(
                "/cookies",
                get(|| async {
                    (
                        AppendHeaders([
                            (header::SET_COOKIE, "session=abc"),
                            (header::SET_COOKIE, "theme=dark"),
                        ]),
                        "cookies",
                    )
                }),
            )
            .route(
                "/slow",
                get(|| async {
                    tokio::time::sleep(Duration::from_secs(30)).await;
                    "too late"
                }),
            )
            .route(
                "/delayed",
                get(|| async {
                    tokio::time::sleep(Duration::from_millis(200)).await;
                    "delayed"
                }),
            )
            .route(
                "/echo",
                any(|request: Request| async move {
                    let method = request.method().to_string();
                    let query = request.uri().query().unwrap_or("").to_string();
                    format!("{} {}", method, query)
                }),
            )
            .route(
                "/upload",
                any(|request: Request| async move {
                    let body = to_bytes(request.into_body(), usize::MAX).await.unwrap();
                    body.len().to_string()
                }),
            )
            .route("/stats", any(|| async { "backend stats" }))
            .layer(middleware::from_fn(move |request: Request, next: Next| {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    next.run(request).await.into_response()
                }
            }));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, calls }
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Resolved target URL (and cache key) for `path`.
    pub fn target(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

/// Backend that promises a 100 byte body, sends 7 bytes and hangs up.
pub async fn spawn_truncating_backend() -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            let _ = socket
                .write_all(b"HTTP/1.1 200 OK\r\ncontent-length: 100\r\n\r\npartial")
                .await;
            let _ = socket.shutdown().await;
        }
    });
    addr
}

/// Records every metric event for later inspection.
#[derive(Default)]
pub struct CountingRecorder {
    pub requests: Mutex<Vec<(String, String)>>,
    pub durations: Mutex<Vec<(String, String, Duration)>>,
}

impl CountingRecorder {
    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn duration_count(&self) -> usize {
        self.durations.lock().unwrap().len()
    }
}

impl EventRecorder for CountingRecorder {
    fn record_request(&self, method: &str, path: &str) {
        self.requests
            .lock()
            .unwrap()
            .push((method.to_string(), path.to_string()));
    }

    fn record_duration(&self, method: &str, path: &str, elapsed: Duration) {
        self.durations
            .lock()
            .unwrap()
            .push((method.to_string(), path.to_string(), elapsed));
    }
}
