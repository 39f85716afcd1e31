//! Search collection against the Tavily web-search API.
//!
//! The [`Collector`] issues two templated queries per company (general
//! firmographics and change events, then tech stack) and returns a bounded,
//! ordered list of hits per query. A failed search is surfaced as a
//! [`SearchError`]; an empty result set is never returned as success.

use crate::config::SearchConfig;
use crate::error::{ConfigError, SearchError};
use crate::prompt::PromptLibrary;
use crate::types::{ResearchQuery, SearchHit, SearchResults};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Abstraction over the outbound search call.
#[async_trait]
pub trait SearchClient: Send + Sync {
    /// Run one search and return at most `max_results` hits, in order.
    async fn search(&self, query: &str, max_results: usize)
        -> Result<Vec<SearchHit>, SearchError>;
}

/// Tavily search API client.
pub struct TavilyClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    search_depth: String,
    timeout_secs: u64,
}

#[derive(Serialize)]
struct TavilyRequest<'a> {
    query: &'a str,
    search_depth: &'a str,
    max_results: usize,
}

#[derive(Deserialize)]
struct TavilyResponse {
    #[serde(default)]
    results: Vec<TavilyResult>,
}

#[derive(Deserialize)]
struct TavilyResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    content: String,
    #[serde(default)]
    score: f64,
}

impl TavilyClient {
    /// Create a client, reading the API key from the environment variable
    /// named in `config.api_key_env`.
    pub fn new(config: &SearchConfig) -> Result<Self, ConfigError> {
        let api_key = std::env::var(&config.api_key_env).map_err(|_| {
            ConfigError::EnvVarMissing {
                var: config.api_key_env.clone(),
            }
        })?;
        Self::new_with_key(config, api_key)
    }

    /// Create a client with an explicitly provided API key.
    pub fn new_with_key(config: &SearchConfig, api_key: String) -> Result<Self, ConfigError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent("onepager/0.3")
            .build()
            .map_err(|e| ConfigError::Invalid {
                message: format!("Failed to build search HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            api_key,
            search_depth: config.search_depth.clone(),
            timeout_secs: config.request_timeout_secs,
        })
    }

    fn map_http_error(status: reqwest::StatusCode, body_text: &str) -> SearchError {
        match status.as_u16() {
            401 | 403 => SearchError::AuthFailed,
            429 => {
                let retry_after = serde_json::from_str::<serde_json::Value>(body_text)
                    .ok()
                    .and_then(|v| v["retry_after"].as_u64())
                    .unwrap_or(30);
                SearchError::RateLimited {
                    retry_after_secs: retry_after,
                }
            }
            _ => SearchError::RequestFailed {
                message: format!("HTTP {status} from search API: {body_text}"),
            },
        }
    }
}

#[async_trait]
impl SearchClient for TavilyClient {
    async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<SearchHit>, SearchError> {
        if query.trim().is_empty() {
            return Err(SearchError::EmptyQuery);
        }

        let url = format!("{}/search", self.base_url);
        let body = TavilyRequest {
            query,
            search_depth: &self.search_depth,
            max_results,
        };

        debug!(url = url.as_str(), "Sending search request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SearchError::Timeout {
                        timeout_secs: self.timeout_secs,
                    }
                } else {
                    SearchError::RequestFailed {
                        message: format!("Search request failed: {e}"),
                    }
                }
            })?;

        let status = response.status();
        let body_text = response
            .text()
            .await
            .map_err(|e| SearchError::RequestFailed {
                message: format!("Failed to read search response body: {e}"),
            })?;

        if !status.is_success() {
            return Err(Self::map_http_error(status, &body_text));
        }

        let parsed: TavilyResponse =
            serde_json::from_str(&body_text).map_err(|e| SearchError::RequestFailed {
                message: format!("Invalid JSON in search response: {e}"),
            })?;

        let hits: Vec<SearchHit> = parsed
            .results
            .into_iter()
            .filter(|r| !r.content.trim().is_empty())
            .take(max_results)
            .map(|r| SearchHit {
                title: r.title,
                url: r.url,
                content: r.content,
                score: r.score,
            })
            .collect();

        Ok(hits)
    }
}

/// Collects search results for a research query.
pub struct Collector {
    client: Arc<dyn SearchClient>,
    prompts: Arc<PromptLibrary>,
    config: SearchConfig,
}

impl Collector {
    pub fn new(
        client: Arc<dyn SearchClient>,
        prompts: Arc<PromptLibrary>,
        config: SearchConfig,
    ) -> Self {
        Self {
            client,
            prompts,
            config,
        }
    }

    /// Run the general and tech-stack searches for the query.
    ///
    /// Returns one `SearchResults` per labeled query. If both come back
    /// empty the collection fails with `SearchError::NoResults`; an empty
    /// list is never treated as success.
    pub async fn collect(&self, query: &ResearchQuery) -> Result<Vec<SearchResults>, SearchError> {
        if !query.is_valid() {
            return Err(SearchError::EmptyQuery);
        }

        let general = self
            .prompts
            .general_query(query)
            .map_err(|e| SearchError::RequestFailed {
                message: format!("Query template failed to render: {e}"),
            })?;
        let tech = self
            .prompts
            .tech_query(query)
            .map_err(|e| SearchError::RequestFailed {
                message: format!("Query template failed to render: {e}"),
            })?;

        let mut results = Vec::with_capacity(2);
        for (label, text) in [("general", general), ("tech_stack", tech)] {
            let hits = self.search_with_retry(&text).await?;
            debug!(label, hits = hits.len(), "Search query completed");
            results.push(SearchResults::new(label, hits));
        }

        if results.iter().all(|r| r.is_empty()) {
            return Err(SearchError::NoResults {
                query: query.company.clone(),
            });
        }

        Ok(results)
    }

    /// Run one search, retrying once immediately on a transient failure.
    async fn search_with_retry(&self, query: &str) -> Result<Vec<SearchHit>, SearchError> {
        let max = self.config.max_results_per_query;
        match self.client.search(query, max).await {
            Ok(hits) => Ok(hits),
            Err(e) if self.config.retry_transient && is_transient(&e) => {
                warn!(error = %e, "Retrying search after transient failure");
                self.client.search(query, max).await
            }
            Err(e) => Err(e),
        }
    }
}

/// Whether a search error is worth the single immediate retry.
fn is_transient(err: &SearchError) -> bool {
    matches!(
        err,
        SearchError::RequestFailed { .. } | SearchError::Timeout { .. }
    )
}

/// A scripted search client for tests.
pub struct MockSearchClient {
    responses: std::sync::Mutex<Vec<Result<Vec<SearchHit>, SearchError>>>,
}

impl MockSearchClient {
    pub fn new() -> Self {
        Self {
            responses: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// A client that answers every search with the same hits.
    pub fn with_hits(hits: Vec<SearchHit>) -> Self {
        let mock = Self::new();
        for _ in 0..8 {
            mock.queue(Ok(hits.clone()));
        }
        mock
    }

    /// Queue a response for the next `search` call (drained in order).
    pub fn queue(&self, response: Result<Vec<SearchHit>, SearchError>) {
        self.responses.lock().unwrap().push(response);
    }

    /// A hit with filler content, for building test fixtures.
    pub fn hit(title: &str) -> SearchHit {
        SearchHit {
            title: title.to_string(),
            url: format!("https://example.com/{}", title.to_lowercase().replace(' ', "-")),
            content: format!("{title}: article text."),
            score: 0.8,
        }
    }
}

impl Default for MockSearchClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SearchClient for MockSearchClient {
    async fn search(
        &self,
        _query: &str,
        max_results: usize,
    ) -> Result<Vec<SearchHit>, SearchError> {
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            return Ok(Vec::new());
        }
        responses
            .remove(0)
            .map(|hits| hits.into_iter().take(max_results).collect())
    }
}
