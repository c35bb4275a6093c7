//! Interactive terminal chat
//!
//! Reads user messages from stdin and prints each agent turn as
//! `Name: text`. Ctrl+C cancels the current pass and exits.

use crate::server::{build_orchestrator, load_config};
use anyhow::{Context, Result};
use pcos_core::{
    CancellationToken, Conversation, Error as CoreError, Orchestrator, TerminationReason, Turn,
};
use std::io::{BufRead, Write};
use tokio::sync::mpsc;
use tracing::{debug, warn};

const GOODBYE: &str = "Thank you for using PCOS Care Agents. Goodbye!";

pub async fn run() -> Result<()> {
    let config = load_config().context("Failed to load configuration")?;
    let orchestrator = build_orchestrator(&config)?;

    println!("{}", banner(&orchestrator, &config.orchestrator.stop_keywords));

    let mut lines = spawn_line_reader(std::io::BufReader::new(std::io::stdin()));
    let mut conversation = orchestrator.start_session()?;

    loop {
        print!("User: ");
        std::io::stdout().flush()?;

        let line = tokio::select! {
            line = lines.recv() => line.transpose().context("Failed to read input")?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else {
            println!();
            println!("{}", GOODBYE);
            return Ok(());
        };

        let cancel = CancellationToken::new();
        let interrupt = {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    cancel.cancel();
                }
            })
        };
        let result = orchestrator.submit(&mut conversation, &line, &cancel).await;
        interrupt.abort();

        match result {
            Ok(outcome) => {
                for turn in outcome.agent_turns() {
                    println!("\n{}\n", format_turn(turn));
                }
                match outcome.termination {
                    None => {}
                    Some(TerminationReason::UserEnded) => {
                        println!("{}", GOODBYE);
                        return Ok(());
                    }
                    Some(TerminationReason::Cancelled) => {
                        println!("\n[Interrupted]");
                        println!("{}", GOODBYE);
                        return Ok(());
                    }
                    Some(reason) => {
                        println!("{}", ended_notice(reason));
                        conversation = restart(&orchestrator, &conversation)?;
                    }
                }
            }
            Err(e @ CoreError::OrchestrationFailure { .. }) => {
                warn!(error = %e, "Agent pass failed");
                eprintln!("Error: {}", e);
                println!("{}", ended_notice(TerminationReason::BackendError));
                conversation = restart(&orchestrator, &conversation)?;
            }
            Err(e) => return Err(e.into()),
        }
    }
}

/// Read lines on a plain OS thread.
///
/// Blocking stdin reads cannot be cancelled; a detached thread does not
/// hold up runtime shutdown the way a pending `tokio::io::stdin` read does.
/// The channel closes at end of input.
pub fn spawn_line_reader<R>(reader: R) -> mpsc::Receiver<std::io::Result<String>>
where
    R: BufRead + Send + 'static,
{
    let (tx, rx) = mpsc::channel(1);
    std::thread::spawn(move || {
        for line in reader.lines() {
            let failed = line.is_err();
            if tx.blocking_send(line).is_err() || failed {
                break;
            }
        }
    });
    rx
}

fn restart(orchestrator: &Orchestrator, previous: &Conversation) -> Result<Conversation> {
    debug!(session_id = %previous.id(), turns = previous.session().len(), "Starting a new session");
    Ok(orchestrator.start_session()?)
}

/// Welcome text listing the care team
pub fn banner(orchestrator: &Orchestrator, stop_keywords: &[String]) -> String {
    let mut out = String::from("Welcome to PCOS Care Agents\n\nYour care team:\n");
    for profile in orchestrator.registry().list() {
        if profile.description.is_empty() {
            out.push_str(&format!("  - {}\n", profile.name));
        } else {
            out.push_str(&format!("  - {}: {}\n", profile.name, profile.description));
        }
    }
    match stop_keywords.first() {
        Some(keyword) => out.push_str(&format!("\nType '{}' to end the conversation.\n", keyword)),
        None => out.push_str("\nPress Ctrl+D to end the conversation.\n"),
    }
    out
}

/// One transcript line as printed in the terminal
pub fn format_turn(turn: &Turn) -> String {
    format!("{}: {}", turn.speaker, turn.text)
}

/// Notice printed when a session ends and a new one begins
pub fn ended_notice(reason: TerminationReason) -> String {
    let why = match reason {
        TerminationReason::UserEnded => "you ended it",
        TerminationReason::MaxRoundsReached => "the turn limit was reached",
        TerminationReason::AgentSignaledDone => "the care team finished",
        TerminationReason::BackendError => "the assistant could not respond",
        TerminationReason::Cancelled => "it was interrupted",
    };
    format!("[Conversation ended: {}. Starting a new conversation.]", why)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::loader::default_config;
    use crate::server::providers::build_orchestrator_with;
    use chrono::Utc;
    use pcos_core::Speaker;
    use pcos_llm::{LlmBackend, MockProvider};
    use std::sync::Arc;

    #[test]
    fn test_banner_lists_agents() {
        let config = default_config();
        let backend = LlmBackend::new(Arc::new(MockProvider::new()));
        let orchestrator = build_orchestrator_with(&config, backend).unwrap();

        let text = banner(&orchestrator, &config.orchestrator.stop_keywords);
        assert!(text.contains("PCOS_Specialist"));
        assert!(text.contains("PCOS_Nutritionist"));
        assert!(text.contains("PCOS_Fitness_Coach"));
        assert!(text.contains("Type 'exit'"));

        let text = banner(&orchestrator, &[]);
        assert!(text.contains("Ctrl+D"));
    }

    #[tokio::test]
    async fn test_line_reader_delivers_lines_then_closes() {
        let input = std::io::Cursor::new("hello\nexit\n");
        let mut lines = spawn_line_reader(input);

        assert_eq!(lines.recv().await.unwrap().unwrap(), "hello");
        assert_eq!(lines.recv().await.unwrap().unwrap(), "exit");
        assert!(lines.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_line_reader_does_not_block_shutdown() {
        // A reader that never yields, like an idle terminal
        struct Stalled;
        impl std::io::Read for Stalled {
            fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
                std::thread::sleep(std::time::Duration::from_secs(3600));
                Ok(0)
            }
        }

        let mut lines = spawn_line_reader(std::io::BufReader::new(Stalled));
        let waited =
            tokio::time::timeout(std::time::Duration::from_millis(50), lines.recv()).await;
        assert!(waited.is_err());
    }

    #[test]
    fn test_format_turn() {
        let turn = Turn {
            seq: 2,
            speaker: Speaker::Agent("PCOS_Specialist".to_string()),
            text: "Hello".to_string(),
            at: Utc::now(),
        };
        assert_eq!(format_turn(&turn), "PCOS_Specialist: Hello");
    }

    #[test]
    fn test_ended_notice() {
        assert!(ended_notice(TerminationReason::MaxRoundsReached).contains("turn limit"));
        assert!(ended_notice(TerminationReason::AgentSignaledDone).contains("new conversation"));
    }
}
