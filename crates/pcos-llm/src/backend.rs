//! LLM backend with retry
//!
//! `LlmBackend` is the only place generation is retried. Each attempt runs
//! under a per-call timeout; transient failures are retried on an
//! exponential schedule until the attempt cap, fatal ones are returned as-is.

use crate::completion::{CompletionRequest, ModelParams};
use crate::error::{Error, Result};
use crate::provider::LlmProvider;
use backoff::backoff::Backoff;
use backoff::ExponentialBackoff;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Retry and timeout settings for [`LlmBackend`]
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Retries after the first attempt (total attempts = 1 + retry_attempts)
    pub retry_attempts: u32,
    /// Delay before the first retry
    pub initial_delay: Duration,
    /// Upper bound on any single delay, including provider hints
    pub max_delay: Duration,
    /// Growth factor between consecutive delays
    pub multiplier: f64,
    /// Jitter applied to each delay (0.0 disables it)
    pub randomization_factor: f64,
    /// Timeout for a single provider call
    pub call_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retry_attempts: 3,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
            multiplier: 2.0,
            randomization_factor: 0.2,
            call_timeout: Duration::from_secs(120),
        }
    }
}

impl RetryPolicy {
    /// Set the retry cap
    #[must_use]
    pub fn with_retry_attempts(mut self, attempts: u32) -> Self {
        self.retry_attempts = attempts;
        self
    }

    /// Set the initial and maximum delays
    #[must_use]
    pub fn with_delays(mut self, initial: Duration, max: Duration) -> Self {
        self.initial_delay = initial;
        self.max_delay = max;
        self
    }

    /// Set the per-call timeout
    #[must_use]
    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    /// Disable jitter (deterministic delays)
    #[must_use]
    pub fn without_jitter(mut self) -> Self {
        self.randomization_factor = 0.0;
        self
    }

    fn schedule(&self) -> ExponentialBackoff {
        let mut schedule = ExponentialBackoff {
            current_interval: self.initial_delay,
            initial_interval: self.initial_delay,
            randomization_factor: self.randomization_factor,
            multiplier: self.multiplier,
            max_interval: self.max_delay,
            // The attempt cap bounds retries, not wall-clock time
            max_elapsed_time: None,
            ..Default::default()
        };
        schedule.reset();
        schedule
    }
}

/// Generation backend: a provider plus retry policy
#[derive(Clone)]
pub struct LlmBackend {
    provider: Arc<dyn LlmProvider>,
    policy: RetryPolicy,
    model: Option<String>,
}

impl std::fmt::Debug for LlmBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmBackend")
            .field("provider", &self.provider.name())
            .field("policy", &self.policy)
            .field("model", &self.model)
            .finish()
    }
}

impl LlmBackend {
    /// Create a backend with the default retry policy
    #[must_use]
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        Self {
            provider,
            policy: RetryPolicy::default(),
            model: None,
        }
    }

    /// Set the retry policy
    #[must_use]
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Override the provider's default model
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Name of the wrapped provider
    #[must_use]
    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Model used for generation
    #[must_use]
    pub fn model(&self) -> &str {
        self.model
            .as_deref()
            .unwrap_or_else(|| self.provider.default_model())
    }

    /// Retry policy in effect
    #[must_use]
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Generate a completion for `prompt` under the `system` persona.
    ///
    /// Transient errors are retried; once the cap is reached the last one is
    /// wrapped in [`Error::RetriesExhausted`]. Fatal errors return immediately.
    pub async fn generate(
        &self,
        prompt: &str,
        system: &str,
        params: &ModelParams,
    ) -> Result<String> {
        let mut request = CompletionRequest::new(system, prompt).with_params(params.clone());
        if let Some(model) = &self.model {
            request = request.with_model(model.clone());
        }

        let mut schedule = self.policy.schedule();
        let max_attempts = self.policy.retry_attempts.saturating_add(1);
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            let error = match self.attempt(request.clone()).await {
                Ok(content) => {
                    if attempt > 1 {
                        debug!(attempt, "Generation succeeded after retry");
                    }
                    return Ok(content);
                }
                Err(e) => e,
            };

            if !error.is_transient() {
                warn!(provider = %self.provider.name(), error = %error, "Fatal backend error, not retrying");
                return Err(error);
            }

            if attempt >= max_attempts {
                warn!(
                    provider = %self.provider.name(),
                    attempts = attempt,
                    error = %error,
                    "Backend retries exhausted"
                );
                return Err(Error::RetriesExhausted {
                    attempts: attempt,
                    last: Box::new(error),
                });
            }

            let scheduled = schedule.next_backoff().unwrap_or(self.policy.max_delay);
            let delay = error
                .retry_after()
                .unwrap_or(scheduled)
                .min(self.policy.max_delay);

            warn!(
                provider = %self.provider.name(),
                attempt,
                delay_ms = delay.as_millis() as u64,
                error = %error,
                "Transient backend error, retrying"
            );
            tokio::time::sleep(delay).await;
        }
    }

    async fn attempt(&self, request: CompletionRequest) -> Result<String> {
        let timeout = self.policy.call_timeout;
        match tokio::time::timeout(timeout, self.provider.complete(request)).await {
            Ok(result) => result.map(|response| response.content),
            Err(_) => Err(Error::Timeout(timeout.as_millis() as u64)),
        }
    }
}
