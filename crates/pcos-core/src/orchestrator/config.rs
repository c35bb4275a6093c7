//! Orchestrator configuration

use super::selection::HandOffMatcher;
use crate::error::{Error, Result};
use pcos_llm::ModelParams;

/// Default hand-off marker: `HANDOFF: Name` or `HANDOFF: @Name`, keyword case-insensitive
pub const DEFAULT_HANDOFF_PATTERN: &str = r"(?i)\bHANDOFF:\s*@?(?P<name>[A-Za-z0-9_]+)";

/// Default conversation-complete marker
pub const DEFAULT_DONE_MARKER: &str = "TERMINATE";

/// Configuration for the orchestrator
#[derive(Debug, Clone, PartialEq)]
pub struct OrchestratorConfig {
    /// Total turns (user and agent) after which the session ends
    pub max_rounds: usize,
    /// Longest run of turns a single agent may hold without user input
    pub max_consecutive_turns: usize,
    /// Agent turns generated per user turn. `None` means one per participant,
    /// `Some(0)` means no limit.
    pub agent_turns_per_user_turn: Option<usize>,
    /// Inputs that end the conversation (case-insensitive, trimmed)
    pub stop_keywords: Vec<String>,
    /// Treat empty or whitespace input as a stop signal
    pub stop_on_empty_input: bool,
    /// Substring an agent emits when the conversation is complete
    pub done_marker: String,
    /// Regex recognising a hand-off. Uses the `name` capture group, else group 1.
    pub handoff_pattern: String,
    /// How the hand-off syntax is described to agents in their system prompt
    pub handoff_hint: String,
    /// Token budget for the rendered transcript
    pub context_token_budget: usize,
    /// Generation parameters used where a profile leaves them unset
    pub default_params: ModelParams,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_rounds: 50,
            max_consecutive_turns: 2,
            agent_turns_per_user_turn: None,
            stop_keywords: vec!["exit".to_string(), "quit".to_string(), "bye".to_string()],
            stop_on_empty_input: true,
            done_marker: DEFAULT_DONE_MARKER.to_string(),
            handoff_pattern: DEFAULT_HANDOFF_PATTERN.to_string(),
            handoff_hint: "HANDOFF: <Name>".to_string(),
            context_token_budget: 24_000,
            default_params: ModelParams::default(),
        }
    }
}

impl OrchestratorConfig {
    /// Create a new configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the turn bound
    #[must_use]
    pub fn with_max_rounds(mut self, max: usize) -> Self {
        self.max_rounds = max;
        self
    }

    /// Set the consecutive-turn cap
    #[must_use]
    pub fn with_max_consecutive_turns(mut self, max: usize) -> Self {
        self.max_consecutive_turns = max;
        self
    }

    /// Set the number of agent turns per user turn (0 = unbounded)
    #[must_use]
    pub fn with_agent_turns_per_user_turn(mut self, turns: usize) -> Self {
        self.agent_turns_per_user_turn = Some(turns);
        self
    }

    /// Set the stop keywords
    #[must_use]
    pub fn with_stop_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stop_keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    /// Set the done marker
    #[must_use]
    pub fn with_done_marker(mut self, marker: impl Into<String>) -> Self {
        self.done_marker = marker.into();
        self
    }

    /// Set the hand-off regex and how it is described to agents
    #[must_use]
    pub fn with_handoff_pattern(
        mut self,
        pattern: impl Into<String>,
        hint: impl Into<String>,
    ) -> Self {
        self.handoff_pattern = pattern.into();
        self.handoff_hint = hint.into();
        self
    }

    /// Set the transcript token budget
    #[must_use]
    pub fn with_context_token_budget(mut self, budget: usize) -> Self {
        self.context_token_budget = budget;
        self
    }

    /// Set session-level generation parameters
    #[must_use]
    pub fn with_default_params(mut self, params: ModelParams) -> Self {
        self.default_params = params;
        self
    }

    /// Agent turns allowed in one pass for `participants` agents
    #[must_use]
    pub fn pass_limit(&self, participants: usize) -> usize {
        match self.agent_turns_per_user_turn {
            None => participants,
            Some(0) => usize::MAX,
            Some(n) => n,
        }
    }

    /// Whether `input` ends the conversation
    #[must_use]
    pub fn is_stop_input(&self, input: &str) -> bool {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return self.stop_on_empty_input;
        }
        self.stop_keywords
            .iter()
            .any(|k| k.trim().eq_ignore_ascii_case(trimmed))
    }

    /// Validate and compile the hand-off pattern
    pub fn validate(&self) -> Result<HandOffMatcher> {
        if self.max_rounds == 0 {
            return Err(Error::Configuration(
                "max_rounds must be at least 1".to_string(),
            ));
        }
        if self.max_consecutive_turns == 0 {
            return Err(Error::Configuration(
                "max_consecutive_turns must be at least 1".to_string(),
            ));
        }
        if self.done_marker.trim().is_empty() {
            return Err(Error::Configuration(
                "done_marker must not be empty".to_string(),
            ));
        }
        if self.context_token_budget == 0 {
            return Err(Error::Configuration(
                "context_token_budget must be at least 1".to_string(),
            ));
        }
        HandOffMatcher::new(&self.handoff_pattern)
    }
}
