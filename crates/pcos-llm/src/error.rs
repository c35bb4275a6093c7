//! Error types for pcos-llm

use std::time::Duration;
use thiserror::Error;

/// LLM error type
#[derive(Debug, Error)]
pub enum Error {
    /// Provider not configured (missing or empty API key, bad base URL)
    #[error("provider not configured: {0}")]
    NotConfigured(String),

    /// Credentials rejected by the provider
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Request rejected by the provider (malformed request, unknown model)
    #[error("api error: {0}")]
    Api(String),

    /// Rate limit exceeded
    #[error("rate limit exceeded")]
    RateLimit {
        /// Delay suggested by the provider, if any
        retry_after: Option<Duration>,
    },

    /// Provider-side 5xx error
    #[error("server error: {0}")]
    ServerError(String),

    /// Network error
    #[error("network error: {0}")]
    Network(String),

    /// Timeout
    #[error("timeout after {0}ms")]
    Timeout(u64),

    /// Invalid response
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Transient failures persisted past the retry cap
    #[error("retries exhausted after {attempts} attempts: {last}")]
    RetriesExhausted {
        /// Total attempts made, including the first one
        attempts: u32,
        /// The last transient error observed
        last: Box<Error>,
    },
}

/// Retry classification of a backend error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Expected to succeed on retry (rate limit, timeout, 5xx, network)
    Transient,
    /// Retrying cannot help (credentials, malformed request, exhausted budget)
    Fatal,
}

impl Error {
    /// Classify this error for the retry loop
    #[must_use]
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::RateLimit { .. } | Self::ServerError(_) | Self::Network(_) | Self::Timeout(_) => {
                ErrorClass::Transient
            }
            Self::NotConfigured(_)
            | Self::Auth(_)
            | Self::Api(_)
            | Self::InvalidResponse(_)
            | Self::RetriesExhausted { .. } => ErrorClass::Fatal,
        }
    }

    /// Whether a retry may succeed
    #[must_use]
    pub fn is_transient(&self) -> bool {
        self.class() == ErrorClass::Transient
    }

    /// Provider-suggested delay before the next attempt
    #[must_use]
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimit { retry_after } => *retry_after,
            _ => None,
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(Error::RateLimit { retry_after: None }.is_transient());
        assert!(Error::ServerError("503".into()).is_transient());
        assert!(Error::Network("connection reset".into()).is_transient());
        assert!(Error::Timeout(1000).is_transient());
    }

    #[test]
    fn test_fatal_classification() {
        assert_eq!(Error::Auth("bad key".into()).class(), ErrorClass::Fatal);
        assert_eq!(Error::Api("bad request".into()).class(), ErrorClass::Fatal);
        assert_eq!(
            Error::NotConfigured("no key".into()).class(),
            ErrorClass::Fatal
        );
        assert_eq!(
            Error::InvalidResponse("empty".into()).class(),
            ErrorClass::Fatal
        );
    }

    #[test]
    fn test_exhausted_is_fatal() {
        let err = Error::RetriesExhausted {
            attempts: 4,
            last: Box::new(Error::Timeout(500)),
        };
        assert!(!err.is_transient());
        assert!(err.to_string().contains("4 attempts"));
        assert!(err.to_string().contains("timeout after 500ms"));
    }

    #[test]
    fn test_retry_after_only_on_rate_limit() {
        let hint = Duration::from_secs(3);
        assert_eq!(
            Error::RateLimit {
                retry_after: Some(hint)
            }
            .retry_after(),
            Some(hint)
        );
        assert_eq!(Error::ServerError("x".into()).retry_after(), None);
    }
}
