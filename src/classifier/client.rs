use std::cmp::Ordering;
use std::time::Duration;

use reqwest::{Client as HttpClient, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::descriptor::ClassifierDescriptor;
use super::error::ClassifierError;

/// One `{label, score}` entry returned by a classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawClassification {
    pub label: String,
    pub score: f64,
}

impl RawClassification {
    pub fn new(label: impl Into<String>, score: f64) -> Self {
        Self {
            label: label.into(),
            score,
        }
    }
}

/// Returns the highest-scoring entry. The first one wins on ties.
pub fn strongest(classifications: &[RawClassification]) -> Option<&RawClassification> {
    classifications.iter().reduce(|best, next| {
        match next.score.partial_cmp(&best.score) {
            Some(Ordering::Greater) => next,
            _ => best,
        }
    })
}

/// Minimal async interface the aggregator needs from a classifier transport.
pub trait ClassifierClient: Send + Sync {
    /// Submits base64 media to `classifier` and returns its non-empty classification list.
    fn classify(
        &self,
        classifier: &ClassifierDescriptor,
        media_base64: &str,
    ) -> impl std::future::Future<Output = Result<Vec<RawClassification>, ClassifierError>> + Send;
}

#[derive(Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
}

/// Inference APIs answer either a flat list or a one-element batch of lists.
#[derive(Deserialize)]
#[serde(untagged)]
enum InferenceResponse {
    Flat(Vec<RawClassification>),
    Batched(Vec<Vec<RawClassification>>),
}

impl InferenceResponse {
    fn into_flat(self) -> Vec<RawClassification> {
        match self {
            InferenceResponse::Flat(list) => list,
            InferenceResponse::Batched(batches) => batches.into_iter().next().unwrap_or_default(),
        }
    }
}

/// reqwest-backed client for hosted inference endpoints.
#[derive(Clone)]
pub struct HttpClassifierClient {
    http: HttpClient,
    bearer_token: Option<String>,
    timeout: Duration,
}

impl std::fmt::Debug for HttpClassifierClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClassifierClient")
            .field("has_bearer_token", &self.bearer_token.is_some())
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl HttpClassifierClient {
    pub fn new(bearer_token: Option<String>, timeout: Duration) -> Self {
        Self {
            http: HttpClient::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_else(|_| HttpClient::new()),
            bearer_token,
            timeout,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn transport_error(&self, model: &str, err: reqwest::Error) -> ClassifierError {
        if err.is_timeout() {
            ClassifierError::Timeout {
                model: model.to_string(),
                after: self.timeout,
            }
        } else {
            ClassifierError::Transport {
                model: model.to_string(),
                message: err.to_string(),
            }
        }
    }
}

impl ClassifierClient for HttpClassifierClient {
    async fn classify(
        &self,
        classifier: &ClassifierDescriptor,
        media_base64: &str,
    ) -> Result<Vec<RawClassification>, ClassifierError> {
        let model = classifier.name.as_str();

        let mut request = self.http.post(&classifier.endpoint).json(&InferenceRequest {
            inputs: media_base64,
        });
        if let Some(token) = &self.bearer_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| self.transport_error(model, e))?;

        let status = response.status();
        if status == StatusCode::SERVICE_UNAVAILABLE {
            return Err(ClassifierError::ColdStart {
                model: model.to_string(),
            });
        }
        if !status.is_success() {
            return Err(ClassifierError::UpstreamStatus {
                model: model.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| self.transport_error(model, e))?;

        parse_classifications(model, &body)
    }
}

/// Decodes an inference response body into a non-empty classification list.
pub fn parse_classifications(
    model: &str,
    body: &[u8],
) -> Result<Vec<RawClassification>, ClassifierError> {
    let parsed: InferenceResponse =
        serde_json::from_slice(body).map_err(|e| ClassifierError::MalformedResponse {
            model: model.to_string(),
            reason: e.to_string(),
        })?;

    let classifications = parsed.into_flat();
    if classifications.is_empty() {
        return Err(ClassifierError::MalformedResponse {
            model: model.to_string(),
            reason: "empty classification array".to_string(),
        });
    }

    debug!(model, entries = classifications.len(), "Classifier response parsed");
    Ok(classifications)
}
