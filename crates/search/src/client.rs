//! Web search fallback chain with per-stage timeouts.
//!
//! Stages are tried in order. A stage that errors, times out, or answers
//! with no results hands over to the next one. Exhausting the chain yields
//! an empty list rather than an error.

use ragchat_config::SearchConfig;
use ragchat_core::error::SearchError;
use ragchat_core::search::{SearchProvider, WebResult};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::duckduckgo::DuckDuckGoSearch;
use crate::wikipedia::WikipediaSearch;

/// Send `request` and decode a JSON body, mapping each failure to a
/// [`SearchError`] tagged with `provider`.
pub(crate) async fn get_json<T: DeserializeOwned>(
    provider: &str,
    request: reqwest::RequestBuilder,
) -> Result<T, SearchError> {
    let response = request
        .header("Accept", "application/json")
        .send()
        .await
        .map_err(|e| SearchError::Transport {
            provider: provider.to_string(),
            reason: e.to_string(),
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(SearchError::Status {
            provider: provider.to_string(),
            status_code: status.as_u16(),
        });
    }

    let body = response.bytes().await.map_err(|e| SearchError::Transport {
        provider: provider.to_string(),
        reason: e.to_string(),
    })?;

    serde_json::from_slice(&body).map_err(|e| SearchError::Parse {
        provider: provider.to_string(),
        reason: e.to_string(),
    })
}

/// An ordered list of search providers, each with its own timeout.
pub struct WebSearchClient {
    chain: Vec<SearchStage>,
}

struct SearchStage {
    provider: Arc<dyn SearchProvider>,
    timeout: Duration,
}

impl WebSearchClient {
    /// A client with no stages; every search returns nothing.
    pub fn new() -> Self {
        Self { chain: Vec::new() }
    }

    /// Append a stage to the chain.
    pub fn add(mut self, provider: Arc<dyn SearchProvider>, timeout: Duration) -> Self {
        self.chain.push(SearchStage { provider, timeout });
        self
    }

    /// DuckDuckGo first, then Wikipedia, sharing one HTTP client.
    pub fn from_config(config: &SearchConfig, client: reqwest::Client) -> Self {
        let timeout = config.timeout();
        Self::new()
            .add(
                Arc::new(DuckDuckGoSearch::new(
                    client.clone(),
                    &config.duckduckgo_url,
                    &config.user_agent,
                )),
                timeout,
            )
            .add(
                Arc::new(WikipediaSearch::new(
                    client,
                    &config.wikipedia_url,
                    &config.user_agent,
                )),
                timeout,
            )
    }

    pub fn len(&self) -> usize {
        self.chain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    /// Search the chain for `query`, returning at most `limit` results from
    /// the first stage that produces any.
    pub async fn search(&self, query: &str, limit: usize) -> Vec<WebResult> {
        let query = query.trim();
        if query.is_empty() || limit == 0 {
            return Vec::new();
        }

        for (i, stage) in self.chain.iter().enumerate() {
            let provider = stage.provider.name();

            info!(
                provider,
                attempt = i + 1,
                total = self.chain.len(),
                "Web search: trying provider"
            );

            match tokio::time::timeout(stage.timeout, stage.provider.search(query, limit)).await {
                Ok(Ok(mut results)) if !results.is_empty() => {
                    results.truncate(limit);
                    debug!(provider, results = results.len(), "Web search: provider answered");
                    return results;
                }
                Ok(Ok(_)) => {
                    warn!(provider, "Web search: no results, trying next");
                }
                Ok(Err(e)) => {
                    warn!(provider, error = %e, "Web search: provider failed, trying next");
                }
                Err(_) => {
                    let e = SearchError::Timeout {
                        provider: provider.to_string(),
                        timeout_secs: stage.timeout.as_secs(),
                    };
                    warn!(provider, error = %e, "Web search: provider timed out, trying next");
                }
            }
        }

        Vec::new()
    }
}

impl Default for WebSearchClient {
    fn default() -> Self {
        Self::new()
    }
}
