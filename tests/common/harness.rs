//! Test server harness.
//!
//! Two servers per test: a fake inference upstream that answers like the hosted classifier API,
//! and the real TrueCheck router wired to it through [`HttpClassifierClient`].

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::post,
};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use truecheck::classifier::HttpClassifierClient;
use truecheck::config::Config;
use truecheck::consensus::PolicyKind;
use truecheck::gateway::{HandlerState, create_router_with_state};

const STARTUP_WAIT_TIMEOUT_SECS: u64 = 5;
const STARTUP_POLL_INTERVAL_MS: u64 = 50;

/// How one fake model answers.
#[derive(Debug, Clone)]
pub enum FakeModel {
    Label(&'static str, f64),
    Batched(&'static str, f64),
    Loading,
    Error(u16),
    Slow(Duration, &'static str, f64),
}

#[derive(Debug, Clone, Default)]
struct UpstreamState {
    models: Arc<HashMap<String, FakeModel>>,
    expected_token: Option<String>,
    hits: Arc<Mutex<Vec<String>>>,
}

/// Handle to a running fake upstream.
pub struct FakeUpstream {
    pub addr: SocketAddr,
    hits: Arc<Mutex<Vec<String>>>,
    _handle: JoinHandle<()>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl FakeUpstream {
    /// Base URL that bare model names resolve against.
    pub fn models_url(&self) -> String {
        format!("http://{}/models", self.addr)
    }

    pub fn hits(&self) -> Vec<String> {
        let mut hits = self.hits.lock().unwrap().clone();
        hits.sort();
        hits
    }
}

impl Drop for FakeUpstream {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

async fn fake_classify(
    State(state): State<UpstreamState>,
    Path(name): Path<String>,
    headers: HeaderMap,
    Json(body): Json<serde_json::Value>,
) -> Response {
    state.hits.lock().unwrap().push(name.clone());

    if let Some(token) = &state.expected_token {
        let expected = format!("Bearer {token}");
        let authorized = headers
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .is_some_and(|h| h == expected);
        if !authorized {
            return StatusCode::UNAUTHORIZED.into_response();
        }
    }

    if !body["inputs"].is_string() {
        return StatusCode::UNPROCESSABLE_ENTITY.into_response();
    }

    match state.models.get(&name).cloned() {
        Some(FakeModel::Label(label, score)) => {
            Json(serde_json::json!([{"label": label, "score": score}])).into_response()
        }
        Some(FakeModel::Batched(label, score)) => {
            Json(serde_json::json!([[{"label": label, "score": score}]])).into_response()
        }
        Some(FakeModel::Loading) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(serde_json::json!({"error": "Model is currently loading", "estimated_time": 20.0})),
        )
            .into_response(),
        Some(FakeModel::Error(status)) => StatusCode::from_u16(status)
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            .into_response(),
        Some(FakeModel::Slow(delay, label, score)) => {
            tokio::time::sleep(delay).await;
            Json(serde_json::json!([{"label": label, "score": score}])).into_response()
        }
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

pub async fn spawn_fake_upstream(
    models: Vec<(&str, FakeModel)>,
    expected_token: Option<&str>,
) -> Result<FakeUpstream, ServerStartupError> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;

    let hits = Arc::new(Mutex::new(Vec::new()));
    let state = UpstreamState {
        models: Arc::new(
            models
                .into_iter()
                .map(|(name, model)| (name.to_string(), model))
                .collect(),
        ),
        expected_token: expected_token.map(str::to_string),
        hits: Arc::clone(&hits),
    };

    let app = Router::new()
        .route("/models/{*name}", post(fake_classify))
        .with_state(state);

    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let handle = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
            .unwrap();
    });

    wait_for_server_ready(
        addr,
        Duration::from_secs(STARTUP_WAIT_TIMEOUT_SECS),
        Duration::from_millis(STARTUP_POLL_INTERVAL_MS),
    )
    .await?;

    Ok(FakeUpstream {
        addr,
        hits,
        _handle: handle,
        shutdown_tx: Some(shutdown_tx),
    })
}

#[derive(Debug, Clone)]
pub struct TestServerConfig {
    pub image_models: Vec<String>,
    pub video_models: Vec<String>,
    pub api_token: Option<String>,
    pub result_quota: usize,
    pub classifier_timeout: Duration,
    pub verdict_policy: PolicyKind,
    pub max_media_bytes: usize,
    pub decorate: bool,
}

impl Default for TestServerConfig {
    fn default() -> Self {
        let defaults = Config::default();
        Self {
            image_models: Vec::new(),
            video_models: Vec::new(),
            api_token: None,
            result_quota: defaults.result_quota,
            classifier_timeout: Duration::from_secs(2),
            verdict_policy: defaults.verdict_policy,
            max_media_bytes: defaults.max_media_bytes,
            decorate: true,
        }
    }
}

impl TestServerConfig {
    pub fn image_models(mut self, models: &[&str]) -> Self {
        self.image_models = models.iter().map(|m| m.to_string()).collect();
        self
    }

    pub fn video_models(mut self, models: &[&str]) -> Self {
        self.video_models = models.iter().map(|m| m.to_string()).collect();
        self
    }

    pub fn api_token(mut self, token: &str) -> Self {
        self.api_token = Some(token.to_string());
        self
    }

    pub fn result_quota(mut self, quota: usize) -> Self {
        self.result_quota = quota;
        self
    }

    pub fn classifier_timeout(mut self, timeout: Duration) -> Self {
        self.classifier_timeout = timeout;
        self
    }

    pub fn verdict_policy(mut self, policy: PolicyKind) -> Self {
        self.verdict_policy = policy;
        self
    }

    pub fn max_media_bytes(mut self, max: usize) -> Self {
        self.max_media_bytes = max;
        self
    }
}

pub struct TestServer {
    pub addr: SocketAddr,
    _server_handle: JoinHandle<()>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl TestServer {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

pub async fn wait_for_server_ready(
    addr: SocketAddr,
    timeout: Duration,
    interval: Duration,
) -> Result<(), ServerStartupError> {
    let start = std::time::Instant::now();

    loop {
        if start.elapsed() > timeout {
            return Err(ServerStartupError::Timeout);
        }

        match tokio::net::TcpStream::connect(addr).await {
            Ok(_) => return Ok(()),
            Err(_) => {
                tokio::time::sleep(interval).await;
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ServerStartupError {
    #[error("Server failed to start within timeout")]
    Timeout,
    #[error("Failed to bind to address: {0}")]
    BindError(#[from] std::io::Error),
    #[error("Server startup failed: {0}")]
    StartupFailed(String),
}

/// Spawns TrueCheck on an ephemeral port, resolving bare model names against `upstream`.
pub async fn spawn_test_server(
    upstream: &FakeUpstream,
    config: TestServerConfig,
) -> Result<TestServer, ServerStartupError> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let local_addr = listener.local_addr()?;

    let app_config = Config {
        port: local_addr.port(),
        inference_base_url: upstream.models_url(),
        image_models: config.image_models,
        video_models: config.video_models,
        api_token: config.api_token,
        result_quota: config.result_quota,
        classifier_timeout: config.classifier_timeout,
        verdict_policy: config.verdict_policy,
        max_media_bytes: config.max_media_bytes,
        decorate: config.decorate,
        ..Config::default()
    };
    app_config
        .validate()
        .map_err(|e| ServerStartupError::StartupFailed(e.to_string()))?;

    let client = HttpClassifierClient::new(
        app_config.api_token.clone(),
        app_config.classifier_timeout,
    );
    let state = HandlerState::from_config(&app_config, client)
        .map_err(|e| ServerStartupError::StartupFailed(e.to_string()))?;
    let app = create_router_with_state(state);

    let (shutdown_tx, shutdown_rx) = oneshot::channel();

    let server_handle = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
            .unwrap();
    });

    wait_for_server_ready(
        local_addr,
        Duration::from_secs(STARTUP_WAIT_TIMEOUT_SECS),
        Duration::from_millis(STARTUP_POLL_INTERVAL_MS),
    )
    .await?;

    Ok(TestServer {
        addr: local_addr,
        _server_handle: server_handle,
        shutdown_tx: Some(shutdown_tx),
    })
}
