//! LLM backend and orchestrator construction

use super::config::AppConfig;
use anyhow::{Context, Result};
use pcos_core::{register_defaults, AgentRegistry, Orchestrator};
use pcos_llm::{GeminiConfig, GeminiProvider, LlmBackend, LlmProvider, MockProvider};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Build the configured provider.
///
/// A missing Gemini key is a configuration error.
pub fn resolve_llm_provider(config: &AppConfig) -> Result<Arc<dyn LlmProvider>> {
    match config.llm.provider.as_str() {
        "mock" => {
            warn!("Using mock LLM provider; agent replies are canned");
            Ok(Arc::new(MockProvider::new().with_default_reply(
                "This is an offline reply. Configure a Gemini API key for real answers.",
            )))
        }
        _ => {
            let api_key = config.llm.api_key().context(
                "Gemini API key not configured: set PCOS_LLM__PROVIDER_API_KEY or GOOGLE_GEMINI_API_KEY",
            )?;

            let mut gemini = GeminiConfig::new(api_key)
                .with_timeout(Duration::from_secs(config.llm.timeout_secs));
            if let Some(model) = &config.llm.model {
                gemini = gemini.with_model(model.clone());
            }
            if let Some(base_url) = &config.llm.base_url {
                gemini = gemini.with_base_url(base_url.clone());
            }

            let provider = GeminiProvider::new(gemini).context("Invalid Gemini configuration")?;
            info!(model = %provider.default_model(), "Gemini provider configured");
            Ok(Arc::new(provider))
        }
    }
}

/// Build the retrying backend around the configured provider
pub fn build_backend(config: &AppConfig) -> Result<LlmBackend> {
    let provider = resolve_llm_provider(config)?;
    Ok(LlmBackend::new(provider).with_policy(config.retry_policy()))
}

/// Registry with the configured agents, or the built-in ones
pub fn build_registry(config: &AppConfig) -> Result<Arc<AgentRegistry>> {
    let registry = AgentRegistry::new();
    if config.agents.is_empty() {
        register_defaults(&registry).context("Failed to register built-in agents")?;
    } else {
        for profile in &config.agents {
            let name = profile.name.clone();
            registry
                .register(profile.clone())
                .with_context(|| format!("Invalid agent '{name}' in configuration"))?;
        }
    }
    Ok(Arc::new(registry))
}

/// Orchestrator over `backend` with the configured agents
pub fn build_orchestrator_with(config: &AppConfig, backend: LlmBackend) -> Result<Arc<Orchestrator>> {
    let registry = build_registry(config)?;
    let orchestrator = Orchestrator::new(registry, backend, config.orchestrator_config())
        .context("Invalid orchestrator configuration")?;
    Ok(Arc::new(orchestrator))
}

/// Orchestrator with the configured provider
pub fn build_orchestrator(config: &AppConfig) -> Result<Arc<Orchestrator>> {
    build_orchestrator_with(config, build_backend(config)?)
}
