//! HTTP gateway (Axum) in front of the consensus aggregator.
//!
//! Handles body decoding, data-URL stripping, size limits and CORS, then hands bare base64 to
//! [`ConsensusAggregator::analyze`](crate::consensus::ConsensusAggregator::analyze).

#![allow(missing_docs)]

pub mod error;
pub mod handler;
pub mod payload;
pub mod state;


use std::net::SocketAddr;
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, State},
    http::{HeaderMap, Method, StatusCode, header, header::HeaderValue},
    response::{IntoResponse, Response},
    routing::{MethodRouter, get, post},
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use error::GatewayError;
pub use handler::analyze_handler;
pub use state::HandlerState;

use crate::classifier::ClassifierClient;
use crate::constants::TRUECHECK_STATUS_HEADER;
use payload::request_body_limit;

pub const ANALYZE_PATH: &str = "/api/analyze";

/// Alias for clients built against the Netlify function URL.
pub const LEGACY_ANALYZE_PATH: &str = "/.netlify/functions/analyze";

pub fn create_router_with_state<C>(state: HandlerState<C>) -> Router
where
    C: ClassifierClient + 'static,
{
    let body_limit = request_body_limit(state.max_media_bytes);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/healthz", get(health_handler))
        .route("/ready", get(ready_handler::<C>))
        .route(ANALYZE_PATH, analyze_route::<C>())
        .route(LEGACY_ANALYZE_PATH, analyze_route::<C>())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// `OPTIONS` never reaches this router: the CORS layer answers every preflight with 200.
fn analyze_route<C>() -> MethodRouter<HandlerState<C>>
where
    C: ClassifierClient + 'static,
{
    post(analyze_handler::<C>).fallback(handler::method_not_allowed_handler)
}

#[derive(serde::Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(serde::Serialize)]
pub struct ReadyResponse {
    pub status: &'static str,
    pub policy: &'static str,
    pub classifiers: ClassifierCounts,
}

#[derive(serde::Serialize)]
pub struct ClassifierCounts {
    pub image: usize,
    pub video: usize,
}

/// `true` when `GET /healthz` on `addr` answers 2xx within `timeout`.
pub async fn check_health(addr: SocketAddr, timeout: Duration) -> bool {
    let Ok(client) = reqwest::Client::builder().timeout(timeout).build() else {
        return false;
    };

    match client.get(format!("http://{addr}/healthz")).send().await {
        Ok(res) => res.status().is_success(),
        Err(_) => false,
    }
}

#[tracing::instrument]
pub async fn health_handler() -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(TRUECHECK_STATUS_HEADER, HeaderValue::from_static("healthy"));

    (
        StatusCode::OK,
        headers,
        Json(HealthResponse { status: "ok" }),
    )
        .into_response()
}

#[tracing::instrument(skip(state))]
pub async fn ready_handler<C>(State(state): State<HandlerState<C>>) -> Response
where
    C: ClassifierClient + 'static,
{
    let catalog = state.aggregator.catalog();
    let classifiers = ClassifierCounts {
        image: catalog.image().len(),
        video: catalog.video().len(),
    };

    let is_ready = !catalog.is_empty();
    let (status_code, status_msg) = if is_ready {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "no_classifiers")
    };

    let mut headers = HeaderMap::new();
    headers.insert(TRUECHECK_STATUS_HEADER, HeaderValue::from_static(status_msg));

    (
        status_code,
        headers,
        Json(ReadyResponse {
            status: status_msg,
            policy: state.aggregator.policy_name(),
            classifiers,
        }),
    )
        .into_response()
}
