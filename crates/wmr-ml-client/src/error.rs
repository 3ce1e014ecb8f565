//! Model client error types.

use thiserror::Error;

pub type MlResult<T> = Result<T, MlError>;

#[derive(Debug, Error)]
pub enum MlError {
    #[error("Model service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Timeout after {0} seconds")]
    Timeout(u64),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl MlError {
    /// Map a transport error, keeping timeouts distinguishable.
    pub(crate) fn from_transport(e: reqwest::Error, timeout_secs: u64) -> Self {
        if e.is_timeout() {
            MlError::Timeout(timeout_secs)
        } else if e.is_connect() {
            MlError::ServiceUnavailable(e.to_string())
        } else {
            MlError::Network(e)
        }
    }

    /// Short, stable label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            MlError::ServiceUnavailable(_) => "unavailable",
            MlError::RequestFailed(_) => "request_failed",
            MlError::InvalidResponse(_) => "invalid_response",
            MlError::Timeout(_) => "timeout",
            MlError::Network(_) => "network",
            MlError::Json(_) => "json",
        }
    }
}
