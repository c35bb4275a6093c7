//! Error types for pcos-core

use thiserror::Error;

/// Core error type
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid configuration (bad profile name, empty registry, bad pattern)
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A profile with this name is already registered
    #[error("agent already registered: {0}")]
    DuplicateName(String),

    /// No profile with this name
    #[error("agent not found: {0}")]
    NotFound(String),

    /// Speaker is neither the user nor a session participant
    #[error("unknown speaker: {0}")]
    UnknownSpeaker(String),

    /// Registry was sealed when the orchestrator started
    #[error("agent registry is sealed; cannot register {0}")]
    RegistrySealed(String),

    /// Session already terminated
    #[error("session {0} is closed")]
    SessionClosed(String),

    /// Generation failed for an agent turn; the session is terminated
    #[error("orchestration failed for {agent}: {source}")]
    OrchestrationFailure {
        /// Agent whose turn failed
        agent: String,
        /// Backend error (fatal, or retries exhausted)
        #[source]
        source: pcos_llm::Error,
    },
}

impl Error {
    /// Whether this error indicates a bug in the caller rather than a runtime condition
    #[must_use]
    pub fn is_programming_error(&self) -> bool {
        matches!(
            self,
            Self::DuplicateName(_)
                | Self::UnknownSpeaker(_)
                | Self::RegistrySealed(_)
                | Self::SessionClosed(_)
        )
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_orchestration_failure_keeps_source() {
        let err = Error::OrchestrationFailure {
            agent: "PCOS_Specialist".to_string(),
            source: pcos_llm::Error::Auth("bad key".to_string()),
        };
        assert!(err.to_string().contains("PCOS_Specialist"));
        assert!(err.source().is_some());
        assert!(!err.is_programming_error());
    }

    #[test]
    fn test_programming_errors() {
        assert!(Error::UnknownSpeaker("Ghost".into()).is_programming_error());
        assert!(Error::DuplicateName("A".into()).is_programming_error());
        assert!(!Error::Configuration("x".into()).is_programming_error());
    }
}
