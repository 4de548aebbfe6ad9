use async_trait::async_trait;
use thiserror::Error;

use super::prompt::ChatRequest;
use super::response::RemoteResponse;

/// Anything that went wrong talking to the remote inference service.
///
/// Never surfaces as a request failure; the triage adapter turns it into
/// advisory text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteServiceError {
    #[error("inference API token is not configured")]
    MissingToken,

    #[error("request timed out")]
    Timeout,

    #[error("transport error: {0}")]
    Transport(String),

    #[error("service returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("service error: {0}")]
    Service(String),

    #[error("malformed response: {0}")]
    Decode(String),
}

impl RemoteServiceError {
    /// Worth another attempt (rate limiting, overload, flaky network).
    pub fn is_transient(&self) -> bool {
        match self {
            RemoteServiceError::Timeout | RemoteServiceError::Transport(_) => true,
            RemoteServiceError::Status { status, .. } => matches!(status, 429 | 502 | 503 | 504),
            _ => false,
        }
    }
}

/// Transport to a remote chat-completion endpoint.
#[async_trait]
pub trait InferenceClient: Send + Sync {
    async fn chat(&self, request: &ChatRequest) -> Result<RemoteResponse, RemoteServiceError>;
}
