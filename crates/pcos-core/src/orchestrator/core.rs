//! Orchestrator core structure
//!
//! Contains the `Orchestrator` itself and the per-session `Conversation`
//! handle it drives.

use pcos_llm::LlmBackend;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use super::config::OrchestratorConfig;
use super::selection::SelectionPolicy;
use super::state::OrchestrationState;
use crate::error::{Error, Result};
use crate::registry::AgentRegistry;
use crate::session::{ConversationSession, TerminationReason, Turn};

/// Drives agent turns for any number of independent conversations.
///
/// The orchestrator itself is immutable; each conversation carries its own
/// session and state, so one orchestrator can be shared across tasks.
pub struct Orchestrator {
    pub(crate) registry: Arc<AgentRegistry>,
    pub(crate) backend: LlmBackend,
    pub(crate) config: OrchestratorConfig,
    pub(crate) policy: SelectionPolicy,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("agents", &self.registry.len())
            .field("backend", &self.backend)
            .field("config", &self.config)
            .finish()
    }
}

impl Orchestrator {
    /// Create an orchestrator. Seals `registry`.
    pub fn new(
        registry: Arc<AgentRegistry>,
        backend: LlmBackend,
        config: OrchestratorConfig,
    ) -> Result<Self> {
        let handoff = config.validate()?;
        registry.seal();

        info!(
            agents = registry.len(),
            provider = %backend.provider_name(),
            model = %backend.model(),
            max_rounds = config.max_rounds,
            "Orchestrator ready"
        );

        Ok(Self {
            policy: SelectionPolicy {
                handoff,
                max_consecutive_turns: config.max_consecutive_turns,
            },
            registry,
            backend,
            config,
        })
    }

    /// The sealed registry
    #[must_use]
    pub fn registry(&self) -> &Arc<AgentRegistry> {
        &self.registry
    }

    /// Configuration in effect
    #[must_use]
    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Start a new conversation with every registered agent as a participant
    pub fn start_session(&self) -> Result<Conversation> {
        let participants: Vec<_> = self.registry.list().collect();
        if participants.is_empty() {
            return Err(Error::Configuration(
                "cannot start a session without agents".to_string(),
            ));
        }

        let session = ConversationSession::new(participants);
        info!(session_id = %session.id(), "Session started");
        Ok(Conversation {
            session,
            state: OrchestrationState::default(),
        })
    }
}

/// One conversation: its session transcript and orchestration state
#[derive(Debug, Clone)]
pub struct Conversation {
    pub(crate) session: ConversationSession,
    pub(crate) state: OrchestrationState,
}

impl Conversation {
    /// Session identifier
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.session.id()
    }

    /// The session transcript and participants
    #[must_use]
    pub fn session(&self) -> &ConversationSession {
        &self.session
    }

    /// Current orchestration state
    #[must_use]
    pub fn state(&self) -> &OrchestrationState {
        &self.state
    }

    /// Whether the conversation has ended
    #[must_use]
    pub fn is_terminated(&self) -> bool {
        self.session.is_terminated()
    }

    pub(crate) fn terminate(&mut self, reason: TerminationReason) {
        self.session.terminate(reason);
        self.state.terminate(reason);
    }
}

/// Result of one `submit` call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PassOutcome {
    /// Turns appended during this call, user turn first
    pub turns: Vec<Turn>,
    /// Set when the session ended during this call
    pub termination: Option<TerminationReason>,
}

impl PassOutcome {
    /// Agent turns only
    pub fn agent_turns(&self) -> impl Iterator<Item = &Turn> {
        self.turns.iter().filter(|t| !t.speaker.is_user())
    }
}
