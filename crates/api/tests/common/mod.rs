#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use authgate_api::config::{AuthConfig, ServerConfig};
use authgate_api::router::build_app_router;
use authgate_api::state::AppState;
use authgate_core::{
    MemorySessionStore, RefreshSecretManager, RotationEngine, SecurityAlert, SecurityNotifier,
    SessionStore, TokenCodec,
};

pub const AGENT_A: &str = "agentA/1.0";
pub const AGENT_B: &str = "agentB/2.0";

/// Peer address of the reverse proxy trusted by [`test_config`].
pub const PROXY_IP: &str = "10.0.0.5";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        session_sweep_interval_secs: 3600,
        trusted_proxies: vec!["10.0.0.0/8".parse().unwrap()],
        auth: AuthConfig {
            jwt_secret: "test-jwt-secret".to_string(),
            token_ttl: chrono::Duration::minutes(15),
            refresh_ttl: chrono::Duration::hours(48),
            webhook_url: None,
        },
    }
}

/// Keeps every alert so tests can assert on them.
#[derive(Default)]
pub struct RecordingNotifier {
    alerts: Mutex<Vec<SecurityAlert>>,
}

impl RecordingNotifier {
    pub fn alerts(&self) -> Vec<SecurityAlert> {
        self.alerts.lock().unwrap().clone()
    }
}

impl SecurityNotifier for RecordingNotifier {
    fn notify(&self, alert: SecurityAlert) {
        self.alerts.lock().unwrap().push(alert);
    }
}

/// Router plus handles on its collaborators.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemorySessionStore>,
    pub notifier: Arc<RecordingNotifier>,
}

/// Build the full application router over an in-memory store.
///
/// Uses the same middleware stack as `main.rs` via `build_app_router`.
pub fn build_test_app() -> TestApp {
    let store = Arc::new(MemorySessionStore::new());
    let notifier = Arc::new(RecordingNotifier::default());
    let router = build_app_router_with(store.clone(), notifier.clone());
    TestApp {
        router,
        store,
        notifier,
    }
}

pub fn build_app_router_with(
    store: Arc<dyn SessionStore>,
    notifier: Arc<dyn SecurityNotifier>,
) -> Router {
    let config = test_config();
    let params = argon2::Params::new(1024, 1, 1, None).unwrap();

    let engine = RotationEngine::new(
        TokenCodec::new(config.auth.jwt_secret.as_bytes()),
        RefreshSecretManager::with_params(params),
        store,
        notifier,
        config.auth.rotation_settings(),
    );

    let state = AppState {
        config: Arc::new(config.clone()),
        engine: Arc::new(engine),
    };
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.unwrap()
}

/// Attach the socket peer address a real listener would record.
pub fn from_peer(mut request: Request<Body>, peer: &str) -> Request<Body> {
    let addr = SocketAddr::new(peer.parse().unwrap(), 40_000);
    request.extensions_mut().insert(ConnectInfo(addr));
    request
}

pub async fn get(app: &Router, uri: &str) -> Response<Body> {
    let request = Request::get(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

pub async fn get_auth(app: &Router, uri: &str, authorization: &str) -> Response<Body> {
    let request = Request::get(uri)
        .header("authorization", authorization)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

/// POST /auth/token for `user_id` from the given agent and peer address.
pub async fn issue(app: &Router, user_id: &str, agent: &str, ip: &str) -> Response<Body> {
    let request = Request::post(format!("/auth/token?user_id={user_id}"))
        .header("user-agent", agent)
        .body(Body::empty())
        .unwrap();
    send(app, from_peer(request, ip)).await
}

/// POST /auth/refresh with a raw JSON body.
pub async fn refresh_raw(app: &Router, body: String, agent: &str, ip: &str) -> Response<Body> {
    send(app, from_peer(refresh_request(body, agent, None), ip)).await
}

/// POST /auth/refresh from `peer` carrying an `X-Forwarded-For` header.
pub async fn refresh_forwarded(
    app: &Router,
    pair: &serde_json::Value,
    agent: &str,
    peer: &str,
    forwarded_for: &str,
) -> Response<Body> {
    let request = refresh_request(pair_body(pair), agent, Some(forwarded_for));
    send(app, from_peer(request, peer)).await
}

fn refresh_request(body: String, agent: &str, forwarded_for: Option<&str>) -> Request<Body> {
    let mut builder = Request::post("/auth/refresh")
        .header("content-type", "application/json")
        .header("user-agent", agent);
    if let Some(value) = forwarded_for {
        builder = builder.header("x-forwarded-for", value);
    }
    builder.body(Body::from(body)).unwrap()
}

fn pair_body(pair: &serde_json::Value) -> String {
    serde_json::json!({
        "access_token": pair["access_token"],
        "refresh_token": pair["refresh_token"],
    })
    .to_string()
}

/// POST /auth/refresh with a token pair previously returned by the API.
pub async fn refresh(
    app: &Router,
    pair: &serde_json::Value,
    agent: &str,
    ip: &str,
) -> Response<Body> {
    refresh_raw(app, pair_body(pair), agent, ip).await
}

pub async fn logout(app: &Router, authorization: &str) -> Response<Body> {
    let request = Request::post("/auth/logout")
        .header("authorization", authorization)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
