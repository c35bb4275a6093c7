//! Gemini provider implementation

use super::config::GeminiConfig;
use super::security::sanitize_api_error;
use super::types::{GeminiContent, GeminiError, GeminiRequest, GeminiResponse, GenerationConfig};
use crate::completion::{CompletionRequest, CompletionResponse, TokenUsage};
use crate::error::{Error, Result};
use crate::provider::LlmProvider;
use reqwest::header::HeaderValue;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Google Gemini provider
pub struct GeminiProvider {
    client: Client,
    config: GeminiConfig,
}

impl GeminiProvider {
    /// Create a new Gemini provider
    pub fn new(config: GeminiConfig) -> Result<Self> {
        config.validate()?;
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Network(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// The configuration this provider was built with
    #[must_use]
    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    pub(crate) fn build_request(request: &CompletionRequest) -> GeminiRequest {
        let system_instruction = if request.system.trim().is_empty() {
            None
        } else {
            Some(GeminiContent::text(None, request.system.clone()))
        };

        let generation_config =
            if request.params.temperature.is_none() && request.params.max_tokens.is_none() {
                None
            } else {
                Some(GenerationConfig {
                    temperature: request.params.temperature,
                    max_output_tokens: request.params.max_tokens,
                })
            };

        GeminiRequest {
            contents: vec![GeminiContent::text(Some("user"), request.prompt.clone())],
            system_instruction,
            generation_config,
        }
    }

    fn map_transport_error(&self, err: reqwest::Error) -> Error {
        if err.is_timeout() {
            Error::Timeout(self.config.timeout.as_millis() as u64)
        } else {
            // Strip the URL: it carries the API key as a query parameter
            Error::Network(err.without_url().to_string())
        }
    }
}

#[async_trait::async_trait]
impl LlmProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    fn default_model(&self) -> &str {
        &self.config.default_model
    }

    #[instrument(skip(self, request), fields(model))]
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        let model = request
            .model
            .clone()
            .unwrap_or_else(|| self.config.default_model.clone());
        tracing::Span::current().record("model", model.as_str());

        // SECURITY: Don't log the full URL (contains API key)
        debug!(prompt_len = request.prompt.len(), "Sending request to Gemini");

        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.config.base_url, model, self.config.api_key
        );

        let response = self
            .client
            .post(&url)
            .json(&Self::build_request(&request))
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let status = response.status();
        let header_delay = parse_retry_after(response.headers().get("retry-after"));
        let body = response
            .text()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        if !status.is_success() {
            warn!(status = %status, "Gemini API error response");
            return Err(map_http_error(status, &body, header_delay));
        }

        let parsed: GeminiResponse = serde_json::from_str(&body)
            .map_err(|e| Error::InvalidResponse(format!("failed to parse Gemini response: {e}")))?;

        into_completion(parsed, model)
    }
}

/// Convert a parsed Gemini response into a completion
pub(crate) fn into_completion(response: GeminiResponse, model: String) -> Result<CompletionResponse> {
    let usage = response.usage_metadata.map(|u| TokenUsage {
        prompt_tokens: u.prompt_token_count,
        completion_tokens: u.candidates_token_count.unwrap_or(0),
        total_tokens: u.total_token_count,
    });

    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| Error::InvalidResponse("Gemini returned no candidates".to_string()))?;

    let content = candidate
        .content
        .map(|c| {
            c.parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    if content.trim().is_empty() {
        return Err(Error::InvalidResponse(format!(
            "Gemini returned no text (finish reason: {})",
            candidate.finish_reason.as_deref().unwrap_or("unknown")
        )));
    }

    Ok(CompletionResponse {
        content,
        model: response.model_version.unwrap_or(model),
        finish_reason: candidate.finish_reason,
        usage,
    })
}

/// Map a non-success HTTP status and body to a classified error
pub(crate) fn map_http_error(status: StatusCode, body: &str, header_delay: Option<Duration>) -> Error {
    let detail = serde_json::from_str::<GeminiError>(body).ok().map(|e| e.error);

    let message = detail
        .as_ref()
        .map(|d| {
            if d.status.is_empty() {
                d.message.clone()
            } else {
                format!("{}: {}", d.status, d.message)
            }
        })
        .unwrap_or_else(|| format!("HTTP {}", status));

    match status {
        StatusCode::TOO_MANY_REQUESTS => {
            let hinted = detail
                .as_ref()
                .and_then(|d| d.details.as_deref())
                .and_then(parse_retry_delay);
            Error::RateLimit {
                retry_after: hinted.or(header_delay),
            }
        }
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            Error::Auth(sanitize_api_error(&message))
        }
        StatusCode::REQUEST_TIMEOUT => Error::ServerError(sanitize_api_error(&message)),
        s if s.is_server_error() => Error::ServerError(sanitize_api_error(&message)),
        _ => {
            // Gemini reports a bad key as 400 INVALID_ARGUMENT
            if message.to_lowercase().contains("api key") {
                Error::Auth(sanitize_api_error(&message))
            } else {
                Error::Api(sanitize_api_error(&message))
            }
        }
    }
}

/// Parse `retryDelay` ("7s", "1.5s") from Gemini error details
pub(crate) fn parse_retry_delay(details: &[serde_json::Value]) -> Option<Duration> {
    details.iter().find_map(|detail| {
        let raw = detail.get("retryDelay")?.as_str()?;
        let secs: f64 = raw.strip_suffix('s')?.trim().parse().ok()?;
        // Rejects negative, NaN and out-of-range values
        Duration::try_from_secs_f64(secs).ok()
    })
}

fn parse_retry_after(header: Option<&HeaderValue>) -> Option<Duration> {
    let value = header?.to_str().ok()?;
    // Retry-After HTTP-date form is not used by Gemini
    value.trim().parse::<u64>().ok().map(Duration::from_secs)
}
