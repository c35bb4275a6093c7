//! Orchestrator - Turn-taking state machine
//!
//! # Module Structure
//!
//! - `config`: `OrchestratorConfig` and its validation
//! - `selection`: pure next-speaker selection and hand-off parsing
//! - `prompt`: system prompt and windowed transcript rendering
//! - `state`: `Phase` and `OrchestrationState`
//! - `core`: `Orchestrator`, `Conversation` and `PassOutcome`
//! - `process`: the `submit` turn loop

mod config;
mod core;
mod process;
mod prompt;
mod selection;
mod state;


pub use config::{OrchestratorConfig, DEFAULT_DONE_MARKER, DEFAULT_HANDOFF_PATTERN};
pub use core::{Conversation, Orchestrator, PassOutcome};
pub use prompt::{build_system_prompt, render_prompt, RenderedPrompt};
pub use selection::{
    select_next_speaker, HandOffMatcher, Selection, SelectionPolicy, SelectionReason,
};
pub use state::{OrchestrationState, Phase};
