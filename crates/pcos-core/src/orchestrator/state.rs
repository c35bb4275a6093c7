//! Orchestration state

use crate::session::TerminationReason;
use serde::Serialize;

/// Where a conversation is in the turn cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Waiting for the next user message
    AwaitingUserInput,
    /// Choosing the next agent
    SelectingSpeaker,
    /// Waiting on the backend
    GeneratingResponse,
    /// Recording the agent turn
    AppendingTurn,
    /// Session ended
    Terminated,
}

/// Per-conversation state owned by the orchestrator
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrchestrationState {
    /// Current phase
    pub phase: Phase,
    /// Turns appended so far (user and agent)
    pub round: usize,
    /// Agent holding the floor, while one is selected
    pub current_speaker: Option<String>,
    /// Why the session ended
    pub termination: Option<TerminationReason>,
}

impl Default for OrchestrationState {
    fn default() -> Self {
        Self {
            phase: Phase::AwaitingUserInput,
            round: 0,
            current_speaker: None,
            termination: None,
        }
    }
}

impl OrchestrationState {
    pub(crate) fn enter(&mut self, phase: Phase) {
        self.phase = phase;
    }

    pub(crate) fn turn_appended(&mut self) {
        self.round += 1;
    }

    pub(crate) fn terminate(&mut self, reason: TerminationReason) {
        self.phase = Phase::Terminated;
        self.current_speaker = None;
        if self.termination.is_none() {
            self.termination = Some(reason);
        }
    }

    pub(crate) fn await_user(&mut self) {
        self.phase = Phase::AwaitingUserInput;
        self.current_speaker = None;
    }

    /// Whether the conversation has ended
    #[must_use]
    pub fn is_terminated(&self) -> bool {
        self.phase == Phase::Terminated
    }
}
