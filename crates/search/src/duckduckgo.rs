//! DuckDuckGo instant-answer provider.
//!
//! Uses the JSON instant-answer API (no scraping). Results come from
//! `RelatedTopics`, descending one level into grouped `Topics`.

use async_trait::async_trait;
use ragchat_core::error::SearchError;
use ragchat_core::search::{SearchProvider, WebResult};
use serde::Deserialize;

use crate::client::get_json;
use crate::text::{html_to_text, title_before_dash};

const FALLBACK_TITLE: &str = "DuckDuckGo Related Topic";

pub struct DuckDuckGoSearch {
    client: reqwest::Client,
    base_url: String,
    user_agent: String,
}

impl DuckDuckGoSearch {
    pub fn new(
        client: reqwest::Client,
        base_url: impl Into<String>,
        user_agent: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            user_agent: user_agent.into(),
        }
    }
}

#[async_trait]
impl SearchProvider for DuckDuckGoSearch {
    fn name(&self) -> &str {
        "duckduckgo"
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<WebResult>, SearchError> {
        let request = self
            .client
            .get(&self.base_url)
            .query(&[
                ("q", query),
                ("format", "json"),
                ("no_redirect", "1"),
                ("no_html", "1"),
            ])
            .header("User-Agent", &self.user_agent);

        let response: InstantAnswer = get_json(self.name(), request).await?;
        Ok(collect_topics(&response.related_topics, limit))
    }
}

fn collect_topics(topics: &[Topic], limit: usize) -> Vec<WebResult> {
    let mut out = Vec::new();

    for topic in topics {
        if out.len() >= limit {
            break;
        }

        if let Some(result) = topic.to_result() {
            out.push(result);
            continue;
        }

        for nested in &topic.topics {
            if out.len() >= limit {
                break;
            }
            if let Some(result) = nested.to_result() {
                out.push(result);
            }
        }
    }

    out
}

#[derive(Debug, Deserialize)]
struct InstantAnswer {
    #[serde(rename = "RelatedTopics", default)]
    related_topics: Vec<Topic>,
}

#[derive(Debug, Deserialize)]
struct Topic {
    #[serde(rename = "Text", default)]
    text: Option<String>,
    #[serde(rename = "FirstURL", default)]
    first_url: Option<String>,
    #[serde(rename = "Topics", default)]
    topics: Vec<Topic>,
}

impl Topic {
    fn to_result(&self) -> Option<WebResult> {
        let text = self.text.as_deref().filter(|t| !t.is_empty())?;
        let link = self.first_url.as_deref().filter(|u| !u.is_empty())?;

        let snippet = html_to_text(text);
        let title = match title_before_dash(&snippet) {
            "" => FALLBACK_TITLE.to_string(),
            t => t.to_string(),
        };

        Some(WebResult {
            title,
            link: link.to_string(),
            snippet,
        })
    }
}
