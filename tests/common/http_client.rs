//! HTTP client helpers for tests.

use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;

const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(DEFAULT_TIMEOUT_SECS);

pub struct TestClient {
    client: reqwest::Client,
    base_url: String,
}

/// Raw status, `x-truecheck-status` header and JSON body of one call.
#[derive(Debug)]
pub struct TestResponse {
    pub status: u16,
    pub truecheck_status: String,
    pub retry_after: Option<String>,
    pub body: serde_json::Value,
}

impl TestClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        let path = path.trim_start_matches('/');
        format!("{}/{}", self.base_url, path)
    }

    pub async fn analyze(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<TestResponse, TestClientError> {
        let resp = self
            .client
            .post(self.url(path))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;
        Self::collect(resp).await
    }

    pub async fn analyze_bytes(
        &self,
        media: &[u8],
        media_type: &str,
    ) -> Result<TestResponse, TestClientError> {
        self.analyze(
            "/api/analyze",
            serde_json::json!({"media": STANDARD.encode(media), "type": media_type}),
        )
        .await
    }

    pub async fn request(
        &self,
        method: reqwest::Method,
        path: &str,
    ) -> Result<TestResponse, TestClientError> {
        let resp = self.client.request(method, self.url(path)).send().await?;
        Self::collect(resp).await
    }

    pub async fn health(&self) -> Result<HealthResponse, TestClientError> {
        let resp = self.client.get(self.url("/healthz")).send().await?;

        if resp.status().is_success() {
            Ok(resp.json().await?)
        } else {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            Err(TestClientError::UnexpectedStatus(status, body))
        }
    }

    async fn collect(resp: reqwest::Response) -> Result<TestResponse, TestClientError> {
        let status = resp.status().as_u16();
        let header = |name: &str| {
            resp.headers()
                .get(name)
                .and_then(|h| h.to_str().ok())
                .map(str::to_string)
        };
        let truecheck_status = header("x-truecheck-status").unwrap_or_else(|| "unknown".into());
        let retry_after = header("retry-after");

        let text = resp.text().await?;
        let body = if text.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_str(&text).map_err(|_| TestClientError::NotJson(status, text))?
        };

        Ok(TestResponse {
            status,
            truecheck_status,
            retry_after,
            body,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Debug, thiserror::Error)]
pub enum TestClientError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("unexpected status {0}: {1}")]
    UnexpectedStatus(u16, String),
    #[error("status {0} with non-JSON body: {1}")]
    NotJson(u16, String),
}
