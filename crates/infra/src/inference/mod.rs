//! Remote chat-completion transport (OpenAI-compatible, bearer-token auth).
//!
//! Every call is bounded by a request timeout and retried a bounded number
//! of times on transient failures with exponential backoff.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;

use wardcast_ai::triage::{ChatRequest, InferenceClient, RemoteResponse, RemoteServiceError};

pub const DEFAULT_INFERENCE_URL: &str = "https://router.huggingface.co/v1/chat/completions";

/// Longest slice of an error body kept in [`RemoteServiceError::Status`].
const MAX_ERROR_BODY_CHARS: usize = 200;

#[derive(Clone)]
pub struct HttpInferenceConfig {
    pub endpoint: String,
    /// Bearer token. `None` makes every call fail with `MissingToken`.
    pub token: Option<String>,
    pub timeout: Duration,
    /// Total attempts including the first; at least 1.
    pub max_attempts: u32,
    pub initial_backoff: Duration,
}

impl Default for HttpInferenceConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_INFERENCE_URL.to_string(),
            token: None,
            timeout: Duration::from_secs(30),
            max_attempts: 2,
            initial_backoff: Duration::from_millis(500),
        }
    }
}

impl fmt::Debug for HttpInferenceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpInferenceConfig")
            .field("endpoint", &self.endpoint)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .field("max_attempts", &self.max_attempts)
            .field("initial_backoff", &self.initial_backoff)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct HttpInferenceClient {
    http: reqwest::Client,
    config: HttpInferenceConfig,
}

impl HttpInferenceClient {
    pub fn new(config: HttpInferenceConfig) -> Self {
        Self {
            http: reqwest::Client::builder()
                .timeout(config.timeout)
                .build()
                .unwrap_or_default(),
            config,
        }
    }

    async fn send_once(&self, token: &str, request: &ChatRequest) -> Result<RemoteResponse, RemoteServiceError> {
        let res = self
            .http
            .post(&self.config.endpoint)
            .bearer_auth(token)
            // Per-request as well, in case the builder fell back to defaults.
            .timeout(self.config.timeout)
            .json(request)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = res.status();
        let body = res.text().await.map_err(map_transport_error)?;

        if !status.is_success() {
            return Err(RemoteServiceError::Status {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        match serde_json::from_str::<RemoteResponse>(&body) {
            Ok(RemoteResponse::ServiceError { error }) => Err(RemoteServiceError::Service(error)),
            Ok(response) => Ok(response),
            Err(e) => Err(RemoteServiceError::Decode(e.to_string())),
        }
    }
}

#[async_trait]
impl InferenceClient for HttpInferenceClient {
    async fn chat(&self, request: &ChatRequest) -> Result<RemoteResponse, RemoteServiceError> {
        let token = self
            .config
            .token
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .ok_or(RemoteServiceError::MissingToken)?;

        let max_attempts = self.config.max_attempts.max(1);
        let mut backoff = self.config.initial_backoff;
        let mut attempt = 1;

        loop {
            match self.send_once(token, request).await {
                Err(e) if e.is_transient() && attempt < max_attempts => {
                    tracing::warn!(
                        attempt,
                        max_attempts,
                        backoff_ms = backoff.as_millis() as u64,
                        error = %e,
                        "inference call failed, retrying"
                    );
                    tokio::time::sleep(backoff).await;
                    backoff = backoff.saturating_mul(2);
                    attempt += 1;
                }
                other => return other,
            }
        }
    }
}

fn map_transport_error(e: reqwest::Error) -> RemoteServiceError {
    if e.is_timeout() {
        RemoteServiceError::Timeout
    } else {
        RemoteServiceError::Transport(e.without_url().to_string())
    }
}

/// `{"error": ".."}` bodies yield their message; anything else is truncated raw text.
fn error_message(body: &str) -> String {
    if let Ok(serde_json::Value::Object(map)) = serde_json::from_str::<serde_json::Value>(body) {
        if let Some(msg) = map.get("error").and_then(|e| {
            e.as_str()
                .map(str::to_string)
                .or_else(|| e.get("message").and_then(|m| m.as_str()).map(str::to_string))
        }) {
            return msg;
        }
    }
    body.chars().take(MAX_ERROR_BODY_CHARS).collect()
}
