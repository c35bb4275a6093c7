//! Conversation Session
//!
//! An append-only transcript bound to a fixed set of participants.

use crate::error::{Error, Result};
use crate::registry::AgentProfile;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Label used for the human participant in transcripts
pub const USER_LABEL: &str = "User";

/// Who produced a turn
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum Speaker {
    /// The human participant
    User,
    /// A registered agent, by name
    Agent(String),
}

impl Speaker {
    /// Agent name, or `None` for the user
    #[must_use]
    pub fn agent_name(&self) -> Option<&str> {
        match self {
            Self::User => None,
            Self::Agent(name) => Some(name),
        }
    }

    /// Whether this is the user
    #[must_use]
    pub fn is_user(&self) -> bool {
        matches!(self, Self::User)
    }
}

impl fmt::Display for Speaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => f.write_str(USER_LABEL),
            Self::Agent(name) => f.write_str(name),
        }
    }
}

/// One immutable contribution to the conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    /// Sequence number, starting at 1 with no gaps
    pub seq: u64,
    /// Speaker
    pub speaker: Speaker,
    /// Message text
    pub text: String,
    /// When the turn was appended
    pub at: DateTime<Utc>,
}

/// Why a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationReason {
    /// The user sent a stop signal
    UserEnded,
    /// The turn bound was reached
    MaxRoundsReached,
    /// An agent emitted the completion marker
    AgentSignaledDone,
    /// Generation failed and could not be recovered
    BackendError,
    /// The caller cancelled the session
    Cancelled,
}

impl TerminationReason {
    /// Stable identifier, as serialized
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UserEnded => "user_ended",
            Self::MaxRoundsReached => "max_rounds_reached",
            Self::AgentSignaledDone => "agent_signaled_done",
            Self::BackendError => "backend_error",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered transcript plus the participants bound at creation
#[derive(Debug, Clone)]
pub struct ConversationSession {
    id: Uuid,
    participants: Vec<AgentProfile>,
    turns: Vec<Turn>,
    terminated: Option<TerminationReason>,
    created_at: DateTime<Utc>,
}

impl ConversationSession {
    /// Create an empty session with a fixed participant list
    #[must_use]
    pub fn new(participants: Vec<AgentProfile>) -> Self {
        Self {
            id: Uuid::new_v4(),
            participants,
            turns: Vec::new(),
            terminated: None,
            created_at: Utc::now(),
        }
    }

    /// Session identifier
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Creation time
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Append a turn. This is the only mutator of the transcript.
    pub fn append(&mut self, speaker: Speaker, text: impl Into<String>) -> Result<Turn> {
        if self.terminated.is_some() {
            return Err(Error::SessionClosed(self.id.to_string()));
        }
        if let Speaker::Agent(name) = &speaker {
            if !self.participants.iter().any(|p| &p.name == name) {
                return Err(Error::UnknownSpeaker(name.clone()));
            }
        }

        let turn = Turn {
            seq: self.turns.len() as u64 + 1,
            speaker,
            text: text.into(),
            at: Utc::now(),
        };
        self.turns.push(turn.clone());
        Ok(turn)
    }

    /// Snapshot of the transcript
    #[must_use]
    pub fn transcript(&self) -> Vec<Turn> {
        self.turns.clone()
    }

    /// Borrowed view of the transcript
    #[must_use]
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Participants, in round-robin order
    #[must_use]
    pub fn participants(&self) -> &[AgentProfile] {
        &self.participants
    }

    /// Participant by exact name
    #[must_use]
    pub fn participant(&self, name: &str) -> Option<&AgentProfile> {
        self.participants.iter().find(|p| p.name == name)
    }

    /// Number of appended turns
    #[must_use]
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Whether no turn has been appended
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Most recent turn
    #[must_use]
    pub fn last_turn(&self) -> Option<&Turn> {
        self.turns.last()
    }

    /// Mark the session terminated. The first reason wins.
    pub fn terminate(&mut self, reason: TerminationReason) {
        if self.terminated.is_none() {
            self.terminated = Some(reason);
        }
    }

    /// Termination reason, if the session has ended
    #[must_use]
    pub fn termination(&self) -> Option<TerminationReason> {
        self.terminated
    }

    /// Whether the session has ended
    #[must_use]
    pub fn is_terminated(&self) -> bool {
        self.terminated.is_some()
    }
}
