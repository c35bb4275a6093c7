//! PCOS LLM - LLM backend adapter
//!
//! This crate provides the generation side of the PCOS care agents:
//! - Provider: the `LlmProvider` trait every backend implements
//! - Gemini: Google Gemini REST provider
//! - Mock: scripted provider for tests and offline runs
//! - Backend: `LlmBackend`, which classifies provider errors and retries
//!   transient ones with exponential backoff
//! - Token: client-side token counting for context windowing

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod backend;
pub mod completion;
pub mod error;
pub mod gemini;
pub mod mock;
pub mod provider;
pub mod token;
pub mod util;

pub use backend::{LlmBackend, RetryPolicy};
pub use completion::{CompletionRequest, CompletionResponse, ModelParams, TokenUsage};
pub use error::{Error, ErrorClass, Result};
pub use gemini::{GeminiConfig, GeminiProvider};
pub use mock::MockProvider;
pub use provider::LlmProvider;
pub use token::{count_tokens, TokenCounter, TOKEN_COUNTER};
