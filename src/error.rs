//! Error types for the trending-token scanner

use thiserror::Error;

/// Errors that can occur when calling an upstream data source
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Network request failed
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// Invalid response from provider
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Rate limit exceeded (HTTP 429 or an explicit throttling signal)
    ///
    /// Kept separate from the other failures so sentiment callers can map it
    /// to an "unavailable" reading instead of a zero score.
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Source is switched off by configuration (e.g. missing credentials)
    #[error("Source disabled: {0}")]
    Disabled(String),

    /// Provider API error
    #[error("Provider API error: {0}")]
    ApiError(String),

    /// Timeout waiting for response
    #[error("Request timeout")]
    Timeout,
}

impl ProviderError {
    /// Creates an InvalidResponse error
    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }

    /// Creates an ApiError
    pub fn api_error(msg: impl Into<String>) -> Self {
        Self::ApiError(msg.into())
    }

    /// Creates a Disabled error
    pub fn disabled(msg: impl Into<String>) -> Self {
        Self::Disabled(msg.into())
    }

    /// True when the failure is an explicit throttling signal
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimitExceeded)
    }
}
