//! Prompt construction
//!
//! The system text is the persona plus a short protocol note. The prompt is
//! the transcript as `Speaker: text` lines, windowed to a token budget from
//! the newest turn backwards, followed by a cue line for the acting agent.

use super::config::OrchestratorConfig;
use crate::registry::AgentProfile;
use crate::session::{Turn, USER_LABEL};
use pcos_llm::TOKEN_COUNTER;

/// Rendered prompt for one generation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPrompt {
    /// Prompt text
    pub text: String,
    /// Turns dropped by windowing
    pub omitted: usize,
    /// Estimated tokens of the kept transcript lines
    pub tokens: usize,
}

/// System text for `agent`: persona followed by the conversation protocol
#[must_use]
pub fn build_system_prompt(
    agent: &AgentProfile,
    participants: &[AgentProfile],
    config: &OrchestratorConfig,
) -> String {
    let mut roster = format!("- {USER_LABEL}: the person asking for help");
    for p in participants {
        if p.name == agent.name {
            continue;
        }
        roster.push_str(&format!("\n- {}", p.name));
        if !p.description.is_empty() {
            roster.push_str(&format!(": {}", p.description));
        }
    }

    format!(
        "{persona}\n\n\
         You are {name}, taking part in a group conversation with:\n\
         {roster}\n\n\
         Reply only as {name}, without prefixing your name. \
         To pass the floor to another participant, end your message with `{hint}`; \
         use {USER_LABEL} as the name to hand back to the user. \
         When the user's request has been fully addressed, include {done} in your message.",
        persona = agent.system_prompt.trim_end(),
        name = agent.name,
        roster = roster,
        hint = config.handoff_hint,
        done = config.done_marker,
    )
}

/// Render `turns` for `speaker` within `token_budget`.
///
/// The newest turns are kept while they fit; the latest turn is always kept
/// even if it alone exceeds the budget.
#[must_use]
pub fn render_prompt(turns: &[Turn], speaker: &str, token_budget: usize) -> RenderedPrompt {
    let lines: Vec<String> = turns
        .iter()
        .map(|t| format!("{}: {}", t.speaker, t.text))
        .collect();

    let mut kept = 0;
    let mut tokens = 0;
    for line in lines.iter().rev() {
        let cost = TOKEN_COUNTER.count_line_tokens(line);
        if kept > 0 && tokens + cost > token_budget {
            break;
        }
        tokens += cost;
        kept += 1;
    }

    let omitted = lines.len() - kept;
    let mut text = String::new();
    if omitted > 0 {
        text.push_str(&format!("[{omitted} earlier turns omitted]\n"));
    }
    for line in &lines[omitted..] {
        text.push_str(line);
        text.push('\n');
    }
    text.push_str(speaker);
    text.push(':');

    RenderedPrompt {
        text,
        omitted,
        tokens,
    }
}
