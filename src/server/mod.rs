//! Server module for PCOS Care
//!
//! # Module Structure
//!
//! - `config`: Configuration structures
//! - `loader`: Configuration loading from files and environment
//! - `providers`: LLM backend, agent registry and orchestrator construction
//! - `init`: HTTP server initialization and run loop

pub mod config;
mod init;
pub mod loader;
pub mod providers;

// Re-export public API
pub use init::run;
pub use loader::load_config;
pub use providers::build_orchestrator;
