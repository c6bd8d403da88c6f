use axum::{
    Json,
    body::Bytes,
    extract::{State, rejection::BytesRejection},
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use tracing::{debug, info, instrument};

use crate::classifier::ClassifierClient;
use crate::constants::TRUECHECK_STATUS_HEADER;
use crate::gateway::error::GatewayError;
use crate::gateway::payload::{AnalyzeRequest, AnalyzeResponse, decode_media};
use crate::gateway::state::HandlerState;

#[instrument(
    skip(state, body),
    fields(media_type = tracing::field::Empty, verdict = tracing::field::Empty)
)]
pub async fn analyze_handler<C>(
    State(state): State<HandlerState<C>>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, GatewayError>
where
    C: ClassifierClient + 'static,
{
    let body = body.map_err(|rejection| body_rejection(rejection, state.max_media_bytes))?;
    let request: AnalyzeRequest = serde_json::from_slice(&body)
        .map_err(|e| GatewayError::InvalidRequest(format!("Invalid request body: {}", e)))?;

    let media = decode_media(&request, state.max_media_bytes)?;
    let span = tracing::Span::current();
    span.record("media_type", tracing::field::display(media.kind));
    debug!(decoded_len = media.decoded_len, "Media accepted");

    let outcome = state.aggregator.analyze(media.kind, &media.base64).await?;
    span.record("verdict", tracing::field::display(outcome.verdict));

    let decoration = state.annotator.annotate(media.kind, &outcome);
    let response = AnalyzeResponse::new(outcome, media.kind, decoration);

    info!(score = response.score, "Analysis complete");
    Ok(make_response(response))
}

/// The router's body cap sits just above the base64 size of `max_media_bytes`, so hitting it
/// means the decoded media is over the limit too.
fn body_rejection(rejection: BytesRejection, max_media_bytes: usize) -> GatewayError {
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        GatewayError::PayloadTooLarge {
            max_bytes: max_media_bytes,
        }
    } else {
        GatewayError::InvalidRequest(rejection.body_text())
    }
}

pub fn make_response(response: AnalyzeResponse) -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(TRUECHECK_STATUS_HEADER, HeaderValue::from_static("analyzed"));

    (StatusCode::OK, headers, Json(response)).into_response()
}

pub async fn method_not_allowed_handler() -> GatewayError {
    GatewayError::MethodNotAllowed
}
