//! Chat endpoint
//!
//! Each request opens a fresh conversation and runs one agent pass over
//! the message. The pass is cancelled if the client disconnects.

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use pcos_core::{CancellationToken, Error as CoreError, TerminationReason};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use uuid::Uuid;

use super::{ApiError, AppState};

/// Chat request
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

/// One turn as returned to clients
#[derive(Debug, Serialize)]
pub struct ChatTurn {
    pub seq: u64,
    pub speaker: String,
    pub text: String,
}

/// Chat response
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub session_id: Uuid,
    pub turns: Vec<ChatTurn>,
    pub termination: Option<TerminationReason>,
}

async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    if request.message.trim().is_empty() {
        return Err(ApiError::bad_request("message must not be empty"));
    }
    let orchestrator = state
        .orchestrator
        .ok_or_else(|| ApiError::unavailable("LLM provider is not configured"))?;

    let mut conversation = orchestrator
        .start_session()
        .map_err(|e| ApiError::unavailable(e.to_string()))?;

    // Dropping the handler future (client gone) cancels generation
    let cancel = CancellationToken::new();
    let _guard = cancel.clone().drop_guard();

    let outcome = orchestrator
        .submit(&mut conversation, &request.message, &cancel)
        .await
        .map_err(|e| {
            warn!(session_id = %conversation.id(), error = %e, "Chat pass failed");
            map_core_error(e)
        })?;

    info!(
        session_id = %conversation.id(),
        turns = outcome.turns.len(),
        termination = ?outcome.termination,
        "Chat pass complete"
    );

    Ok(Json(ChatResponse {
        session_id: conversation.id(),
        turns: outcome
            .turns
            .into_iter()
            .map(|turn| ChatTurn {
                seq: turn.seq,
                speaker: turn.speaker.to_string(),
                text: turn.text,
            })
            .collect(),
        termination: outcome.termination,
    }))
}

/// Status for a failed pass: backend failures are upstream problems,
/// caller bugs are internal errors
fn map_core_error(e: CoreError) -> ApiError {
    match e {
        CoreError::OrchestrationFailure { .. } => ApiError::bad_gateway(e.to_string()),
        other if other.is_programming_error() => {
            error!(error = %other, "Orchestrator misuse in chat handler");
            ApiError::internal("internal error")
        }
        other => ApiError::bad_request(other.to_string()),
    }
}

/// Chat routes
pub fn chat_routes() -> Router<AppState> {
    Router::new().route("/api/chat", post(chat))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::loader::default_config;
    use crate::server::providers::build_orchestrator_with;
    use pcos_llm::{Error as LlmError, LlmBackend, MockProvider, RetryPolicy};
    use std::sync::Arc;
    use std::time::Duration;

    fn state_with(provider: MockProvider) -> AppState {
        let mut config = default_config();
        config.orchestrator.max_consecutive_turns = 2;
        let backend = LlmBackend::new(Arc::new(provider)).with_policy(
            RetryPolicy::default()
                .with_retry_attempts(1)
                .with_delays(Duration::from_millis(1), Duration::from_millis(1))
                .without_jitter(),
        );
        AppState::default().with_orchestrator(build_orchestrator_with(&config, backend).unwrap())
    }

    fn request(message: &str) -> Json<ChatRequest> {
        Json(ChatRequest {
            message: message.to_string(),
        })
    }

    #[tokio::test]
    async fn test_chat_runs_one_pass() {
        let provider = MockProvider::new();
        provider.push_reply("Specialist here.");
        provider.push_reply("Nutritionist here.");
        provider.push_reply("Coach here.");

        let response = chat(State(state_with(provider.clone())), request("I was diagnosed with PCOS"))
            .await
            .unwrap();

        let speakers: Vec<_> = response.0.turns.iter().map(|t| t.speaker.as_str()).collect();
        assert_eq!(
            speakers,
            vec!["User", "PCOS_Specialist", "PCOS_Nutritionist", "PCOS_Fitness_Coach"]
        );
        assert_eq!(response.0.turns[1].text, "Specialist here.");
        assert_eq!(response.0.turns[0].seq, 1);
        assert!(response.0.termination.is_none());
        assert_eq!(provider.call_count(), 3);
    }

    #[tokio::test]
    async fn test_stop_keyword_ends_without_turns() {
        let provider = MockProvider::new();
        let response = chat(State(state_with(provider.clone())), request("bye"))
            .await
            .unwrap();

        assert!(response.0.turns.is_empty());
        assert_eq!(response.0.termination, Some(TerminationReason::UserEnded));
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_empty_message_is_bad_request() {
        let err = chat(State(state_with(MockProvider::new())), request("  "))
            .await
            .unwrap_err();
        assert_eq!(err.status, axum::http::StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_no_orchestrator_is_unavailable() {
        let err = chat(State(AppState::default()), request("hello"))
            .await
            .unwrap_err();
        assert_eq!(err.status, axum::http::StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_core_error_status() {
        use axum::http::StatusCode;

        let failure = CoreError::OrchestrationFailure {
            agent: "PCOS_Specialist".to_string(),
            source: LlmError::Timeout(10),
        };
        assert_eq!(map_core_error(failure).status, StatusCode::BAD_GATEWAY);

        let closed = map_core_error(CoreError::SessionClosed("s".to_string()));
        assert_eq!(closed.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(closed.message, "internal error");

        let unknown = map_core_error(CoreError::UnknownSpeaker("Dermatologist".to_string()));
        assert_eq!(unknown.status, StatusCode::INTERNAL_SERVER_ERROR);

        let config = map_core_error(CoreError::Configuration("no agents".to_string()));
        assert_eq!(config.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_backend_failure_is_bad_gateway() {
        let provider = MockProvider::new();
        provider.push_error(LlmError::Auth("invalid key".to_string()));

        let err = chat(State(state_with(provider)), request("hello"))
            .await
            .unwrap_err();
        assert_eq!(err.status, axum::http::StatusCode::BAD_GATEWAY);
        assert!(err.message.contains("PCOS_Specialist"));
    }
}
