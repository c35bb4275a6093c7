//! Application configuration types
//!
//! Deserialized from `config/default.toml` plus overrides; see `loader`.

use anyhow::Result;
use pcos_core::{AgentProfile, OrchestratorConfig};
use pcos_llm::util::mask_api_key;
use pcos_llm::{ModelParams, RetryPolicy};
use serde::Deserialize;
use std::fmt;
use std::time::Duration;

/// Environment variables consulted when `llm.provider_api_key` is unset
const API_KEY_FALLBACK_VARS: &[&str] = &["GOOGLE_GEMINI_API_KEY", "GEMINI_API_KEY"];

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub llm: LlmConfig,
    #[serde(default)]
    pub orchestrator: OrchestratorAppConfig,
    #[serde(default)]
    pub search: SearchConfig,
    /// Replaces the built-in agents when non-empty
    #[serde(default)]
    pub agents: Vec<AgentProfile>,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}

/// LLM provider configuration
#[derive(Clone, Deserialize)]
pub struct LlmConfig {
    /// `gemini` or `mock`
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default)]
    pub provider_api_key: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub max_tokens: Option<u32>,
}

fn default_provider() -> String {
    "gemini".to_string()
}

fn default_llm_timeout() -> u64 {
    120
}

// SECURITY: Custom Debug implementation to mask credentials
impl fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmConfig")
            .field("provider", &self.provider)
            .field(
                "provider_api_key",
                &self.provider_api_key.as_deref().map(mask_api_key),
            )
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

impl LlmConfig {
    /// API key from configuration, else from the Gemini environment variables
    #[must_use]
    pub fn api_key(&self) -> Option<String> {
        self.provider_api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| {
                API_KEY_FALLBACK_VARS
                    .iter()
                    .filter_map(|var| std::env::var(var).ok())
                    .find(|value| !value.trim().is_empty())
            })
    }

    /// Session-level generation parameters
    #[must_use]
    pub fn params(&self) -> ModelParams {
        ModelParams {
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }
}

/// Orchestrator configuration (exposed to TOML)
#[derive(Debug, Clone, Deserialize)]
pub struct OrchestratorAppConfig {
    #[serde(default = "default_max_rounds")]
    pub max_rounds: usize,
    /// Backend retries after the first attempt
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,
    #[serde(default = "default_initial_retry_delay_ms")]
    pub initial_retry_delay_ms: u64,
    #[serde(default = "default_max_retry_delay_ms")]
    pub max_retry_delay_ms: u64,
    #[serde(default = "default_max_consecutive_turns")]
    pub max_consecutive_turns: usize,
    #[serde(default)]
    pub agent_turns_per_user_turn: Option<usize>,
    #[serde(default = "default_stop_keywords")]
    pub stop_keywords: Vec<String>,
    #[serde(default = "default_true")]
    pub stop_on_empty_input: bool,
    #[serde(default)]
    pub done_marker: Option<String>,
    #[serde(default)]
    pub handoff_pattern: Option<String>,
    #[serde(default)]
    pub handoff_hint: Option<String>,
    #[serde(default = "default_context_token_budget")]
    pub context_token_budget: usize,
}

fn default_max_rounds() -> usize {
    50
}

fn default_retry_attempts() -> u32 {
    3
}

fn default_initial_retry_delay_ms() -> u64 {
    500
}

fn default_max_retry_delay_ms() -> u64 {
    30_000
}

fn default_max_consecutive_turns() -> usize {
    2
}

fn default_stop_keywords() -> Vec<String> {
    vec!["exit".to_string(), "quit".to_string(), "bye".to_string()]
}

fn default_true() -> bool {
    true
}

fn default_context_token_budget() -> usize {
    24_000
}

impl Default for OrchestratorAppConfig {
    fn default() -> Self {
        Self {
            max_rounds: default_max_rounds(),
            retry_attempts: default_retry_attempts(),
            initial_retry_delay_ms: default_initial_retry_delay_ms(),
            max_retry_delay_ms: default_max_retry_delay_ms(),
            max_consecutive_turns: default_max_consecutive_turns(),
            agent_turns_per_user_turn: None,
            stop_keywords: default_stop_keywords(),
            stop_on_empty_input: true,
            done_marker: None,
            handoff_pattern: None,
            handoff_hint: None,
            context_token_budget: default_context_token_budget(),
        }
    }
}

/// Remote research search configuration
#[derive(Clone, Deserialize)]
pub struct SearchConfig {
    #[serde(default)]
    pub api_url: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_search_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

fn default_search_timeout() -> u64 {
    15
}

fn default_max_results() -> usize {
    10
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_url: None,
            api_key: None,
            timeout_secs: default_search_timeout(),
            max_results: default_max_results(),
        }
    }
}

// SECURITY: Custom Debug implementation to mask credentials
impl fmt::Debug for SearchConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchConfig")
            .field("api_url", &self.api_url)
            .field("api_key", &self.api_key.as_deref().map(mask_api_key))
            .field("timeout_secs", &self.timeout_secs)
            .field("max_results", &self.max_results)
            .finish()
    }
}

impl AppConfig {
    /// Orchestrator settings with library defaults for anything unset
    #[must_use]
    pub fn orchestrator_config(&self) -> OrchestratorConfig {
        let o = &self.orchestrator;
        let defaults = OrchestratorConfig::default();
        OrchestratorConfig {
            max_rounds: o.max_rounds,
            max_consecutive_turns: o.max_consecutive_turns,
            agent_turns_per_user_turn: o.agent_turns_per_user_turn,
            stop_keywords: o.stop_keywords.clone(),
            stop_on_empty_input: o.stop_on_empty_input,
            done_marker: o.done_marker.clone().unwrap_or(defaults.done_marker),
            handoff_pattern: o.handoff_pattern.clone().unwrap_or(defaults.handoff_pattern),
            handoff_hint: o.handoff_hint.clone().unwrap_or(defaults.handoff_hint),
            context_token_budget: o.context_token_budget,
            default_params: self.llm.params(),
        }
    }

    /// Backend retry policy
    #[must_use]
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::default()
            .with_retry_attempts(self.orchestrator.retry_attempts)
            .with_delays(
                Duration::from_millis(self.orchestrator.initial_retry_delay_ms),
                Duration::from_millis(self.orchestrator.max_retry_delay_ms),
            )
            .with_call_timeout(Duration::from_secs(self.llm.timeout_secs))
    }

    /// Reject settings the orchestrator cannot run with
    pub fn validate(&self) -> Result<()> {
        self.orchestrator_config()
            .validate()
            .map_err(|e| anyhow::anyhow!("invalid [orchestrator] settings: {e}"))?;

        match self.llm.provider.as_str() {
            "gemini" | "mock" => {}
            other => anyhow::bail!("unknown llm.provider '{other}' (expected gemini or mock)"),
        }
        if self.llm.timeout_secs == 0 {
            anyhow::bail!("llm.timeout_secs must be at least 1");
        }
        Ok(())
    }
}
