//! Turn loop
//!
//! `submit` takes one user message through a full agent pass: append the
//! user turn, then select, generate and append agent turns until the pass
//! limit, a yield to the user, or a termination condition.

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::core::{Conversation, Orchestrator, PassOutcome};
use super::prompt::{build_system_prompt, render_prompt};
use super::selection::select_next_speaker;
use super::state::Phase;
use crate::error::{Error, Result};
use crate::session::{Speaker, TerminationReason};

impl Orchestrator {
    /// Feed one user message and run the agent pass that follows.
    ///
    /// A stop input ends the session without being appended. Cancelling
    /// `cancel` stops generation and ends the session with `Cancelled`;
    /// turns already appended are kept. A backend failure ends the session
    /// with `BackendError` and is returned as `OrchestrationFailure`.
    pub async fn submit(
        &self,
        conversation: &mut Conversation,
        input: &str,
        cancel: &CancellationToken,
    ) -> Result<PassOutcome> {
        if conversation.is_terminated() {
            return Err(Error::SessionClosed(conversation.id().to_string()));
        }
        let session_id = conversation.id();
        let mut outcome = PassOutcome {
            turns: Vec::new(),
            termination: None,
        };

        if self.config.is_stop_input(input) {
            info!(session_id = %session_id, "User ended the conversation");
            conversation.terminate(TerminationReason::UserEnded);
            outcome.termination = Some(TerminationReason::UserEnded);
            return Ok(outcome);
        }

        let user_turn = conversation.session.append(Speaker::User, input)?;
        conversation.state.turn_appended();
        outcome.turns.push(user_turn);
        if let Some(reason) = self.check_termination(conversation) {
            conversation.terminate(reason);
            outcome.termination = Some(reason);
            return Ok(outcome);
        }

        let limit = self
            .config
            .pass_limit(conversation.session.participants().len());
        let mut generated = 0usize;

        while generated < limit {
            conversation.state.enter(Phase::SelectingSpeaker);
            let selection = match select_next_speaker(
                conversation.session.turns(),
                conversation.session.participants(),
                &self.policy,
            ) {
                Some(selection) => selection,
                None => {
                    debug!(session_id = %session_id, "Floor yielded to user");
                    break;
                }
            };

            let agent = conversation
                .session
                .participant(&selection.speaker)
                .cloned()
                .ok_or_else(|| Error::UnknownSpeaker(selection.speaker.clone()))?;

            conversation.state.current_speaker = Some(agent.name.clone());
            conversation.state.enter(Phase::GeneratingResponse);

            let system = build_system_prompt(
                &agent,
                conversation.session.participants(),
                &self.config,
            );
            let prompt = render_prompt(
                conversation.session.turns(),
                &agent.name,
                self.config.context_token_budget,
            );
            if prompt.omitted > 0 {
                debug!(
                    session_id = %session_id,
                    omitted = prompt.omitted,
                    tokens = prompt.tokens,
                    "Transcript windowed"
                );
            }
            let params = agent.params.or(&self.config.default_params);

            debug!(
                session_id = %session_id,
                agent = %agent.name,
                reason = ?selection.reason,
                "Generating agent turn"
            );

            let generated_text = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!(session_id = %session_id, agent = %agent.name, "Session cancelled");
                    conversation.terminate(TerminationReason::Cancelled);
                    outcome.termination = Some(TerminationReason::Cancelled);
                    return Ok(outcome);
                }
                result = self.backend.generate(&prompt.text, &system, &params) => result,
            };

            let text = match generated_text {
                Ok(text) => text,
                Err(source) => {
                    warn!(
                        session_id = %session_id,
                        agent = %agent.name,
                        error = %source,
                        "Generation failed, ending session"
                    );
                    conversation.terminate(TerminationReason::BackendError);
                    return Err(Error::OrchestrationFailure {
                        agent: agent.name,
                        source,
                    });
                }
            };

            conversation.state.enter(Phase::AppendingTurn);
            let turn = conversation
                .session
                .append(Speaker::Agent(agent.name.clone()), text.trim())?;
            conversation.state.turn_appended();
            generated += 1;
            outcome.turns.push(turn);

            if let Some(reason) = self.check_termination(conversation) {
                info!(session_id = %session_id, reason = %reason, "Session terminated");
                conversation.terminate(reason);
                outcome.termination = Some(reason);
                return Ok(outcome);
            }
        }

        conversation.state.await_user();
        Ok(outcome)
    }

    /// Termination checks after an appended turn, first match wins
    fn check_termination(&self, conversation: &Conversation) -> Option<TerminationReason> {
        let session = &conversation.session;
        if session.len() >= self.config.max_rounds {
            return Some(TerminationReason::MaxRoundsReached);
        }
        let last = session.last_turn()?;
        if !last.speaker.is_user() && last.text.contains(&self.config.done_marker) {
            return Some(TerminationReason::AgentSignaledDone);
        }
        None
    }
}
