// tests/common/mod.rs
pub use axum::Router;
pub use tokio::task::JoinHandle;

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use reqwest::Client;

use crate::config::connection::Connection;
use crate::session::Session;

pub const TOKEN_ROUTE: &str = "/sso/oauth/token";
pub const ATTACH_ROUTE: &str = "/vms/{host}/diskattachments";
pub const ACCESS_TOKEN: &str = "1234567890";

/// Spawn an Axum router on an ephemeral port and return (JoinHandle, SocketAddr)
pub async fn spawn_axum(router: Router) -> (JoinHandle<()>, SocketAddr) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind failed");
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, router).await.expect("server failed");
    });
    (handle, addr)
}

pub fn build_reqwest_client() -> Client {
    Client::builder()
        .timeout(Duration::from_secs(5))
        .build()
        .expect("reqwest client")
}

pub fn session_for(addr: SocketAddr) -> Session {
    let connection = Connection::new(format!("http://{}", addr))
        .with_credentials("admin@internal", "secret")
        .insecure(true);
    Session::new(connection, build_reqwest_client())
}

pub fn token_body(expire_in: u64) -> String {
    format!(
        r#"{{ "access_token": "{}", "expires_in": "{}", "token_type": "Bearer"}}"#,
        ACCESS_TOKEN, expire_in
    )
}

/// Engine stub: a counting token route plus a counting attach route that
/// answers 401 unless the bearer token is present.
pub struct EngineStub {
    pub token_hits: Arc<AtomicUsize>,
    pub attach_hits: Arc<AtomicUsize>,
    pub handle: JoinHandle<()>,
    pub addr: SocketAddr,
}

impl EngineStub {
    pub async fn start(token_status: StatusCode, token_response: String, attach_status: StatusCode, attach_response: String) -> Self {
        let token_hits = Arc::new(AtomicUsize::new(0));
        let attach_hits = Arc::new(AtomicUsize::new(0));

        let token_counter = token_hits.clone();
        let attach_counter = attach_hits.clone();
        let router = Router::new()
            .route(TOKEN_ROUTE, post(move || {
                let counter = token_counter.clone();
                let body = token_response.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    (token_status, body)
                }
            }))
            .route(ATTACH_ROUTE, post(move |headers: HeaderMap| {
                let counter = attach_counter.clone();
                let body = attach_response.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    let expected = format!("Bearer {}", ACCESS_TOKEN);
                    match headers.get("authorization").and_then(|v| v.to_str().ok()) {
                        Some(value) if value == expected => (attach_status, body),
                        _ => (StatusCode::UNAUTHORIZED, "missing bearer token".to_owned()),
                    }
                }
            }));

        let (handle, addr) = spawn_axum(router).await;
        Self { token_hits, attach_hits, handle, addr }
    }

    pub async fn with_token(expire_in: u64, attach_response: String) -> Self {
        Self::start(StatusCode::OK, token_body(expire_in), StatusCode::OK, attach_response).await
    }

    pub fn token_hits(&self) -> usize {
        self.token_hits.load(Ordering::SeqCst)
    }

    pub fn attach_hits(&self) -> usize {
        self.attach_hits.load(Ordering::SeqCst)
    }
}

impl Drop for EngineStub {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
