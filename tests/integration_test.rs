//! Integration tests for PCOS Care
//!
//! These tests drive whole conversations through the public crate APIs:
//! - pcos-core: registry, built-in personas, orchestrator and sessions
//! - pcos-llm: retrying backend over the scripted mock provider

use std::sync::Arc;
use std::time::Duration;

use pcos_core::{
    register_defaults, AgentRegistry, CancellationToken, Error, Orchestrator, OrchestratorConfig,
    Speaker, TerminationReason,
};
use pcos_llm::{LlmBackend, MockProvider, RetryPolicy};
use tokio_test::{assert_err, assert_ok};

const SPECIALIST: &str = "PCOS_Specialist";
const NUTRITIONIST: &str = "PCOS_Nutritionist";
const COACH: &str = "PCOS_Fitness_Coach";

fn care_team(provider: &MockProvider, config: OrchestratorConfig) -> Orchestrator {
    let registry = AgentRegistry::new();
    register_defaults(&registry).unwrap();
    let backend = LlmBackend::new(Arc::new(provider.clone())).with_policy(
        RetryPolicy::default()
            .with_retry_attempts(2)
            .with_delays(Duration::from_millis(10), Duration::from_secs(5))
            .without_jitter(),
    );
    Orchestrator::new(Arc::new(registry), backend, config).unwrap()
}

fn names(turns: &[pcos_core::Turn]) -> Vec<String> {
    turns.iter().map(|t| t.speaker.to_string()).collect()
}

// ============================================================================
// Full conversations
// ============================================================================

#[tokio::test]
async fn test_care_team_conversation_with_handoffs() {
    let provider = MockProvider::new();
    provider.push_reply("Irregular cycles are common in PCOS. HANDOFF: PCOS_Fitness_Coach");
    provider.push_reply("Start with brisk walks after meals. HANDOFF: user");
    provider.push_reply("Diet matters a lot here. HANDOFF: @PCOS_Nutritionist");
    provider.push_reply("Favour fibre and protein at breakfast. TERMINATE");

    let orchestrator = care_team(&provider, OrchestratorConfig::default());
    let cancel = CancellationToken::new();
    let mut conversation = orchestrator.start_session().unwrap();

    // First pass: specialist hands to the coach, the coach yields to the user
    let first = orchestrator
        .submit(&mut conversation, "My cycles are irregular", &cancel)
        .await
        .unwrap();
    assert_eq!(first.termination, None);
    assert_eq!(names(&first.turns), vec!["User", SPECIALIST, COACH]);

    // Second pass: round-robin restarts at the specialist, who hands off
    let second = orchestrator
        .submit(&mut conversation, "What should I eat?", &cancel)
        .await
        .unwrap();
    assert_eq!(names(&second.turns), vec!["User", SPECIALIST, NUTRITIONIST]);
    assert_eq!(second.termination, Some(TerminationReason::AgentSignaledDone));
    assert!(conversation.is_terminated());

    // Transcript is ordered, gapless and complete
    let seqs: Vec<u64> = conversation.session().turns().iter().map(|t| t.seq).collect();
    assert_eq!(seqs, (1..=6).collect::<Vec<_>>());

    // The nutritionist saw the whole conversation and its own persona
    let requests = provider.requests();
    assert_eq!(requests.len(), 4);
    let last = &requests[3];
    assert!(last.prompt.contains("User: My cycles are irregular"));
    assert!(last.prompt.contains("PCOS_Fitness_Coach: Start with brisk walks"));
    assert!(last.prompt.ends_with("PCOS_Nutritionist:"));
    assert!(last.system.contains(SPECIALIST));
    assert!(last.system.contains("TERMINATE"));

    // A closed session accepts nothing more
    let err = assert_err!(
        orchestrator
            .submit(&mut conversation, "thanks", &cancel)
            .await
    );
    assert!(matches!(err, Error::SessionClosed(_)));
}

#[tokio::test]
async fn test_user_can_end_after_agents_answer() {
    let provider = MockProvider::new();
    let orchestrator = care_team(&provider, OrchestratorConfig::default());
    let cancel = CancellationToken::new();
    let mut conversation = orchestrator.start_session().unwrap();

    let outcome = assert_ok!(
        orchestrator
            .submit(&mut conversation, "Hello team", &cancel)
            .await
    );
    assert_eq!(outcome.agent_turns().count(), 3);

    let outcome = assert_ok!(orchestrator.submit(&mut conversation, "  EXIT ", &cancel).await);
    assert!(outcome.turns.is_empty());
    assert_eq!(outcome.termination, Some(TerminationReason::UserEnded));
    assert_eq!(conversation.session().len(), 4);
    assert_eq!(provider.call_count(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_rate_limit_hint_is_honoured() {
    let provider = MockProvider::new();
    provider.push_error(pcos_llm::Error::RateLimit {
        retry_after: Some(Duration::from_secs(2)),
    });
    provider.push_reply("Answer after waiting");

    let orchestrator = care_team(
        &provider,
        OrchestratorConfig::default().with_agent_turns_per_user_turn(1),
    );
    let mut conversation = orchestrator.start_session().unwrap();

    let started = tokio::time::Instant::now();
    let outcome = orchestrator
        .submit(&mut conversation, "hi", &CancellationToken::new())
        .await
        .unwrap();

    assert!(started.elapsed() >= Duration::from_secs(2));
    assert_eq!(provider.call_count(), 2);
    let agent_turns: Vec<_> = outcome.agent_turns().collect();
    assert_eq!(agent_turns.len(), 1);
    assert_eq!(agent_turns[0].text, "Answer after waiting");
}

#[tokio::test]
async fn test_exhausted_retries_end_session_and_keep_transcript() {
    let provider = MockProvider::new();
    provider.push_reply("Specialist answer");
    for _ in 0..3 {
        provider.push_error(pcos_llm::Error::ServerError("503 unavailable".into()));
    }

    let orchestrator = care_team(&provider, OrchestratorConfig::default());
    let mut conversation = orchestrator.start_session().unwrap();

    let err = orchestrator
        .submit(&mut conversation, "hello", &CancellationToken::new())
        .await
        .unwrap_err();

    match err {
        Error::OrchestrationFailure { agent, source } => {
            assert_eq!(agent, NUTRITIONIST);
            assert!(matches!(
                source,
                pcos_llm::Error::RetriesExhausted { attempts: 3, .. }
            ));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(
        conversation.session().termination(),
        Some(TerminationReason::BackendError)
    );
    assert_eq!(names(conversation.session().turns()), vec!["User", SPECIALIST]);
}

#[tokio::test]
async fn test_max_rounds_bounds_a_long_conversation() {
    let provider = MockProvider::new();
    let orchestrator = care_team(&provider, OrchestratorConfig::default().with_max_rounds(6));
    let cancel = CancellationToken::new();
    let mut conversation = orchestrator.start_session().unwrap();

    let first = orchestrator
        .submit(&mut conversation, "one", &cancel)
        .await
        .unwrap();
    assert_eq!(first.termination, None);

    let second = orchestrator
        .submit(&mut conversation, "two", &cancel)
        .await
        .unwrap();
    assert_eq!(second.termination, Some(TerminationReason::MaxRoundsReached));
    assert_eq!(conversation.session().len(), 6);
    assert_eq!(
        conversation.session().last_turn().map(|t| t.speaker.clone()),
        Some(Speaker::Agent(SPECIALIST.to_string()))
    );
}
