//! PCOS Core - Multi-agent conversation harness
//!
//! This crate coordinates the PCOS care agents and the user:
//! - Registry: agent profiles, sealed once orchestration starts
//! - Personas: the built-in specialist, nutritionist and fitness coach
//! - Session: append-only conversation transcript
//! - Orchestrator: speaker selection, termination and the generation loop

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod orchestrator;
pub mod personas;
pub mod registry;
pub mod session;

pub use error::{Error, Result};
pub use orchestrator::{
    select_next_speaker, Conversation, OrchestrationState, Orchestrator, OrchestratorConfig,
    PassOutcome, Phase, Selection, SelectionPolicy, SelectionReason,
};
pub use personas::{default_profiles, register_defaults};
pub use registry::{AgentProfile, AgentRegistry};
pub use session::{ConversationSession, Speaker, TerminationReason, Turn};
pub use tokio_util::sync::CancellationToken;
