use axum::{
    Json,
    http::{HeaderMap, HeaderValue, StatusCode, header::RETRY_AFTER},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::consensus::ConsensusError;
use crate::constants::TRUECHECK_STATUS_HEADER;
use crate::gateway::payload::describe_limit;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("payload exceeds {max_bytes} decoded bytes")]
    PayloadTooLarge { max_bytes: usize },

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("models unavailable: {0}")]
    ModelsUnavailable(#[from] ConsensusError),
}

#[derive(serde::Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after_secs: Option<u64>,
}

impl ErrorResponse {
    fn message(error: String) -> Self {
        Self {
            error,
            details: None,
            retry: None,
            retry_after_secs: None,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let mut headers = HeaderMap::new();

        let (status, body, truecheck_status) = match &self {
            GatewayError::InvalidRequest(_) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::message(self.to_string()),
                "invalid_request",
            ),
            GatewayError::PayloadTooLarge { max_bytes } => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::message(format!(
                    "File too large. Max {}.",
                    describe_limit(*max_bytes)
                )),
                "payload_too_large",
            ),
            GatewayError::MethodNotAllowed => (
                StatusCode::METHOD_NOT_ALLOWED,
                ErrorResponse::message(self.to_string()),
                "method_not_allowed",
            ),
            GatewayError::ModelsUnavailable(err) => {
                let retry_after = err.retry_after_secs();
                headers.insert(RETRY_AFTER, HeaderValue::from(retry_after));
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    ErrorResponse {
                        error: err.wait_hint(),
                        details: Some(err.to_string()),
                        retry: Some(err.is_retryable()),
                        retry_after_secs: Some(retry_after),
                    },
                    "models_loading",
                )
            }
        };

        headers.insert(
            TRUECHECK_STATUS_HEADER,
            HeaderValue::from_static(truecheck_status),
        );

        (status, headers, Json(body)).into_response()
    }
}
