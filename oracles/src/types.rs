//! Oracle-specific data types

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// A single chat-completions message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Classified failure of a single raw service call
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiFailure {
    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("rate limit exceeded")]
    RateLimitExceeded,

    #[error("server error: {0}")]
    ServerError(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("network error: {0}")]
    NetworkError(String),

    #[error("call exceeded deadline of {0:?}")]
    Timeout(Duration),

    #[error("malformed response body: {0}")]
    MalformedBody(String),
}

impl ApiFailure {
    /// Map a non-success HTTP status to a failure class
    pub fn from_status(status: u16, detail: impl Into<String>) -> Self {
        match status {
            401 | 403 => ApiFailure::AuthenticationFailed,
            429 => ApiFailure::RateLimitExceeded,
            500..=599 => ApiFailure::ServerError(format!("HTTP {status}: {}", detail.into())),
            _ => ApiFailure::InvalidRequest(format!("HTTP {status}: {}", detail.into())),
        }
    }

    /// Whether another attempt may succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiFailure::RateLimitExceeded
            | ApiFailure::ServerError(_)
            | ApiFailure::NetworkError(_)
            | ApiFailure::Timeout(_)
            | ApiFailure::MalformedBody(_) => true,
            ApiFailure::AuthenticationFailed | ApiFailure::InvalidRequest(_) => false,
        }
    }
}
