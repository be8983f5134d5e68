//! Commerce API failures and their mapping onto retry attempts.

use stocksync_core::AttemptFailure;
use thiserror::Error;

/// Longest response body excerpt kept in an error message.
const BODY_EXCERPT_LEN: usize = 300;

#[derive(Debug, Error)]
pub enum CommerceError {
    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("network error: {0}")]
    Transport(String),

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("GraphQL error: {}", messages.join("; "))]
    GraphQl { status: u16, throttled: bool, messages: Vec<String> },

    #[error("invalid response: {0}")]
    Decode(String),
}

impl CommerceError {
    pub fn http(status: u16, body: &str) -> Self {
        let body = body.trim();
        let body = if body.is_empty() {
            reqwest::StatusCode::from_u16(status)
                .ok()
                .and_then(|s| s.canonical_reason())
                .unwrap_or("empty response")
                .to_string()
        } else {
            body.chars().take(BODY_EXCERPT_LEN).collect()
        };
        Self::Http { status, body }
    }

    /// Status the classifier should see, if any.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            Self::GraphQl { throttled: true, .. } => Some(429),
            Self::GraphQl { status, .. } => Some(*status),
            Self::Timeout | Self::Connect(_) | Self::Transport(_) | Self::Decode(_) => None,
        }
    }
}

impl From<reqwest::Error> for CommerceError {
    /// The request URL is dropped: shop hosts and ports are not failure text.
    fn from(err: reqwest::Error) -> Self {
        let err = err.without_url();
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_connect() {
            Self::Connect(err.to_string())
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

impl From<CommerceError> for AttemptFailure {
    fn from(err: CommerceError) -> Self {
        let message = match &err {
            CommerceError::Http { body, .. } => body.clone(),
            other => other.to_string(),
        };
        AttemptFailure { message, http_status: err.http_status() }
    }
}
