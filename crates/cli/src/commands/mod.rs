pub mod chat;
pub mod config_cmd;
pub mod search;

use std::path::Path;
use std::sync::Arc;

use ragchat_agent::ChatOrchestrator;
use ragchat_config::{AppConfig, SharedConfig};
use ragchat_memory::InMemoryConversationStore;
use ragchat_retrieval::LocalRetriever;
use ragchat_search::WebSearchClient;
use tracing::debug;

/// Load configuration from `path`, with environment overrides applied.
pub fn load_config(path: &Path) -> Result<AppConfig, Box<dyn std::error::Error>> {
    let config = AppConfig::load(path).map_err(|e| format!("Failed to load config: {e}"))?;
    debug!(
        path = %path.display(),
        enabled = config.ai.enabled,
        model = %config.ai.model,
        "Config loaded"
    );
    Ok(config)
}

/// Wire an orchestrator from a loaded configuration.
pub fn build_orchestrator(config: &AppConfig) -> ChatOrchestrator {
    let http = reqwest::Client::new();

    let mut retriever = LocalRetriever::new(&config.corpus.root);
    if let Some(base) = &config.corpus.source_base {
        retriever = retriever.with_source_base(base);
    }

    let web = WebSearchClient::from_config(&config.search, http.clone());
    debug!(
        corpus = %config.corpus.root.display(),
        search_stages = web.len(),
        "Orchestrator wired"
    );

    ChatOrchestrator::new(
        Arc::new(SharedConfig::new(config.ai.clone())),
        Arc::new(InMemoryConversationStore::new()),
        web,
        retriever,
    )
    .with_http_client(http)
}
