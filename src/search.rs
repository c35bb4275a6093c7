//! Research search client
//!
//! `/api/search` forwards queries to a remote research API. The remote
//! service is opaque: it receives `{query, limit}` and answers with
//! `{results: [...]}` in the shape of [`SearchResult`].

use crate::server::config::SearchConfig;
use pcos_llm::util::truncate_safe;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// One research paper card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default, rename = "abstract")]
    pub abstract_text: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub publication_date: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// Search errors
#[derive(Debug, Error)]
pub enum SearchError {
    /// Remote API failed or answered with something unusable
    #[error("search upstream error: {0}")]
    Upstream(String),
}

/// Query interface for the research API
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait SearchBackend: Send + Sync {
    /// Search for up to `limit` results
    async fn search(&self, query: String, limit: usize) -> Result<Vec<SearchResult>, SearchError>;
}

#[derive(Serialize)]
struct RemoteQuery<'a> {
    query: &'a str,
    limit: usize,
}

#[derive(Deserialize)]
struct RemoteResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

/// reqwest client for the remote research API
pub struct RemoteSearchClient {
    client: reqwest::Client,
    api_url: String,
    api_key: Option<String>,
    max_results: usize,
}

impl RemoteSearchClient {
    /// Build a client from configuration; `None` when no API URL is set
    pub fn from_config(config: &SearchConfig) -> anyhow::Result<Option<Self>> {
        let Some(api_url) = config.api_url.clone().filter(|u| !u.trim().is_empty()) else {
            return Ok(None);
        };
        if !api_url.starts_with("http://") && !api_url.starts_with("https://") {
            anyhow::bail!("search.api_url must be http(s): {api_url}");
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Some(Self {
            client,
            api_url,
            api_key: config.api_key.clone().filter(|k| !k.is_empty()),
            max_results: config.max_results.max(1),
        }))
    }

    /// Upper bound applied to every request
    #[must_use]
    pub fn max_results(&self) -> usize {
        self.max_results
    }
}

#[async_trait::async_trait]
impl SearchBackend for RemoteSearchClient {
    async fn search(&self, query: String, limit: usize) -> Result<Vec<SearchResult>, SearchError> {
        let limit = limit.clamp(1, self.max_results);
        debug!(query_len = query.len(), limit, "Forwarding search query");

        let mut request = self.client.post(&self.api_url).json(&RemoteQuery {
            query: &query,
            limit,
        });
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| SearchError::Upstream(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, "Search API error response");
            return Err(SearchError::Upstream(format!(
                "HTTP {}: {}",
                status,
                truncate_safe(&body, 200)
            )));
        }

        let body: RemoteResponse = response
            .json()
            .await
            .map_err(|e| SearchError::Upstream(format!("unreadable response: {e}")))?;

        let mut results = body.results;
        results.truncate(limit);
        Ok(results)
    }
}
