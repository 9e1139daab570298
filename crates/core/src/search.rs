//! Web search provider trait and its normalized result record.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::error::SearchError;

/// One normalized web search hit, whichever provider answered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebResult {
    pub title: String,
    pub link: String,
    pub snippet: String,
}

/// A single stage of the web-search fallback chain.
///
/// Implementations return `Ok(vec![])` when the provider answered but had
/// nothing usable; the chain treats that the same as a failure.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Provider name used in logs (e.g., "duckduckgo").
    fn name(&self) -> &str;

    /// Search for `query`, returning at most `limit` results.
    async fn search(&self, query: &str, limit: usize) -> std::result::Result<Vec<WebResult>, SearchError>;
}
