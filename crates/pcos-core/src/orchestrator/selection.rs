//! Next-speaker selection
//!
//! A pure function of the transcript and participant list. The last speaker
//! and its streak are read from the transcript tail, so selection carries no
//! state between calls.

use crate::error::{Error, Result};
use crate::registry::{find_ignoring_case, AgentProfile};
use crate::session::{Speaker, Turn};
use regex::Regex;
use serde::Serialize;

/// Hand-off target that returns the floor to the user
const USER_TARGET: &str = "user";

/// Compiled hand-off marker
#[derive(Debug, Clone)]
pub struct HandOffMatcher {
    regex: Regex,
}

impl HandOffMatcher {
    /// Compile `pattern`; it must contain a capture group for the target name
    pub fn new(pattern: &str) -> Result<Self> {
        let regex = Regex::new(pattern)
            .map_err(|e| Error::Configuration(format!("invalid hand-off pattern: {e}")))?;
        if regex.captures_len() < 2 {
            return Err(Error::Configuration(
                "hand-off pattern needs a capture group for the agent name".to_string(),
            ));
        }
        Ok(Self { regex })
    }

    /// Target named by the last hand-off marker in `text`
    #[must_use]
    pub fn target<'t>(&self, text: &'t str) -> Option<&'t str> {
        self.regex
            .captures_iter(text)
            .filter_map(|caps| caps.name("name").or_else(|| caps.get(1)))
            .last()
            .map(|m| m.as_str())
    }
}

/// Inputs to [`select_next_speaker`] that come from configuration
#[derive(Debug, Clone)]
pub struct SelectionPolicy {
    /// Hand-off marker
    pub handoff: HandOffMatcher,
    /// Longest run one agent may hold the floor
    pub max_consecutive_turns: usize,
}

/// How the next speaker was chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionReason {
    /// Registration order
    RoundRobin,
    /// Named by the previous agent
    HandOff,
    /// A hand-off was refused by the consecutive-turn cap
    CapFallback,
}

/// Chosen speaker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    /// Participant name
    pub speaker: String,
    /// Why it was chosen
    pub reason: SelectionReason,
}

/// Pick the next agent to speak, or `None` to yield the floor to the user.
pub fn select_next_speaker(
    transcript: &[Turn],
    participants: &[AgentProfile],
    policy: &SelectionPolicy,
) -> Option<Selection> {
    let first = participants.first()?;

    let last = match transcript.last() {
        Some(turn) => turn,
        None => return Some(round_robin(&first.name)),
    };
    let last_agent = match &last.speaker {
        Speaker::User => return Some(round_robin(&first.name)),
        Speaker::Agent(name) => name.as_str(),
    };

    let streak = transcript
        .iter()
        .rev()
        .take_while(|t| t.speaker.agent_name() == Some(last_agent))
        .count();
    let run_length = |candidate: &str| if candidate == last_agent { streak + 1 } else { 1 };

    let next_index = participants
        .iter()
        .position(|p| p.name == last_agent)
        .map_or(0, |i| (i + 1) % participants.len());
    let fallback = &participants[next_index].name;

    let mut reason = SelectionReason::RoundRobin;
    if let Some(target) = policy.handoff.target(&last.text) {
        if target.eq_ignore_ascii_case(USER_TARGET) {
            return None;
        }
        if let Some(named) = find_ignoring_case(participants, target) {
            if run_length(&named.name) <= policy.max_consecutive_turns {
                return Some(Selection {
                    speaker: named.name.clone(),
                    reason: SelectionReason::HandOff,
                });
            }
            reason = SelectionReason::CapFallback;
        }
    }

    // With a single participant the fallback is the same agent
    if run_length(fallback) > policy.max_consecutive_turns {
        return None;
    }
    Some(Selection {
        speaker: fallback.clone(),
        reason,
    })
}

fn round_robin(name: &str) -> Selection {
    Selection {
        speaker: name.to_string(),
        reason: SelectionReason::RoundRobin,
    }
}
