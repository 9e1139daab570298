//! Wikipedia full-text search provider (MediaWiki `list=search`).

use async_trait::async_trait;
use ragchat_core::error::SearchError;
use ragchat_core::search::{SearchProvider, WebResult};
use serde::Deserialize;

use crate::client::get_json;
use crate::text::{collapse_whitespace, html_to_text};

const ARTICLE_BASE: &str = "https://en.wikipedia.org/wiki/";

pub struct WikipediaSearch {
    client: reqwest::Client,
    api_url: String,
    user_agent: String,
}

impl WikipediaSearch {
    pub fn new(
        client: reqwest::Client,
        api_url: impl Into<String>,
        user_agent: impl Into<String>,
    ) -> Self {
        Self {
            client,
            api_url: api_url.into(),
            user_agent: user_agent.into(),
        }
    }

    fn article_link(&self, title: &str) -> String {
        let slug = title.split_whitespace().collect::<Vec<_>>().join("_");
        format!("{ARTICLE_BASE}{}", encode_component(&slug))
    }
}

/// Percent-encode a path segment, leaving `!'()*` literal as browsers'
/// `encodeURIComponent` does.
fn encode_component(segment: &str) -> String {
    let mut out = urlencoding::encode(segment).into_owned();
    for (escaped, literal) in [("%21", "!"), ("%27", "'"), ("%28", "("), ("%29", ")"), ("%2A", "*")] {
        out = out.replace(escaped, literal);
    }
    out
}

#[async_trait]
impl SearchProvider for WikipediaSearch {
    fn name(&self) -> &str {
        "wikipedia"
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<WebResult>, SearchError> {
        let srlimit = limit.to_string();
        let request = self
            .client
            .get(&self.api_url)
            .query(&[
                ("action", "query"),
                ("list", "search"),
                ("srsearch", query),
                ("format", "json"),
                ("utf8", "1"),
                ("srlimit", srlimit.as_str()),
            ])
            .header("User-Agent", &self.user_agent);

        let response: SearchResponse = get_json(self.name(), request).await?;

        let results = response
            .query
            .map(|q| q.search)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|hit| {
                let title = collapse_whitespace(hit.title.as_deref().unwrap_or(""));
                if title.is_empty() {
                    return None;
                }
                Some(WebResult {
                    link: self.article_link(&title),
                    snippet: html_to_text(hit.snippet.as_deref().unwrap_or("")),
                    title,
                })
            })
            .take(limit)
            .collect();

        Ok(results)
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    query: Option<QueryBlock>,
}

#[derive(Debug, Deserialize)]
struct QueryBlock {
    #[serde(default)]
    search: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    snippet: Option<String>,
}
