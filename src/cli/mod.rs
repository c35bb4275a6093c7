//! CLI module for PCOS Care
//!
//! Provides commands:
//! - `chat`: Interactive multi-agent conversation in the terminal
//! - `serve`: HTTP server with the search page and chat API
//! - `doctor`: Configuration and connectivity diagnostics

use clap::{Parser, Subcommand};

pub mod chat;
pub mod doctor;

/// PCOS Care Agents CLI
#[derive(Parser, Debug)]
#[command(name = "pcos-care")]
#[command(about = "Multi-agent PCOS care assistant")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Chat with the care team in the terminal
    Chat,
    /// Start the HTTP server
    Serve,
    /// Check configuration and provider connectivity
    Doctor,
}

/// Run the CLI command
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Some(Commands::Chat) => chat::run().await,
        Some(Commands::Serve) => crate::server::run().await,
        Some(Commands::Doctor) => doctor::run().await,
        None => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            cmd.print_help()?;
            println!();
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_subcommands() {
        let cli = Cli::try_parse_from(["pcos-care", "chat"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Chat)));

        let cli = Cli::try_parse_from(["pcos-care", "serve"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Serve)));

        let cli = Cli::try_parse_from(["pcos-care"]).unwrap();
        assert!(cli.command.is_none());

        assert!(Cli::try_parse_from(["pcos-care", "unknown"]).is_err());
    }
}
