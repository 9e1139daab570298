//! The chat orchestrator.
//!
//! One call walks `Validating → Retrieving → Assembling → Calling →
//! Committing`. Any failure before `Committing` leaves session history
//! untouched; there is no retry at any stage.

use std::sync::Arc;

use ragchat_config::{AiConfig, ConfigSource};
use ragchat_core::error::{Error, ProviderError, Result};
use ragchat_core::memory::ConversationStore;
use ragchat_core::message::{Message, SessionId};
use ragchat_core::provider::{Provider, ProviderRequest};
use ragchat_core::search::WebResult;
use ragchat_providers::OpenAiCompatProvider;
use ragchat_retrieval::{LocalRetriever, RetrievalLimits, ScoredSnippet};
use ragchat_search::WebSearchClient;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::context::{build_context_block, build_system_instruction};

pub const DISABLED_MESSAGE: &str = "AI is disabled. Set AI_ENABLED=true to enable it.";
pub const MISSING_KEY_MESSAGE: &str = "AI API key is missing. Set AI_API_KEY in the environment.";

/// A single chat turn as submitted by a caller.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    pub session_id: String,
    pub message: String,
    /// Extra instruction appended after the base system prompt
    #[serde(default)]
    pub system_instruction: Option<String>,
    /// Overrides `enable_rag` for this call
    #[serde(default)]
    pub use_rag: Option<bool>,
    /// Overrides `enable_web_search` for this call
    #[serde(default)]
    pub use_web_search: Option<bool>,
}

impl ChatRequest {
    pub fn new(session_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            message: message.into(),
            ..Default::default()
        }
    }

    pub fn with_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(instruction.into());
        self
    }

    pub fn with_rag(mut self, enabled: bool) -> Self {
        self.use_rag = Some(enabled);
        self
    }

    pub fn with_web_search(mut self, enabled: bool) -> Self {
        self.use_web_search = Some(enabled);
        self
    }
}

/// Where a local snippet came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RagSource {
    pub source: String,
    pub line: usize,
}

/// The outcome of a successful chat turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatReply {
    pub session_id: String,
    pub model: String,
    pub reply: String,
    /// History length after this turn was committed
    pub messages_in_memory: usize,
    pub rag_sources: Vec<RagSource>,
    pub web_sources: Vec<WebResult>,
}

/// Local and web retrieval output for one query.
#[derive(Debug, Clone, Default)]
pub struct RetrievedContext {
    pub snippets: Vec<ScoredSnippet>,
    pub web: Vec<WebResult>,
}

impl RetrievedContext {
    /// The rendered context block; empty when nothing was retrieved.
    pub fn block(&self) -> String {
        build_context_block(&self.snippets, &self.web)
    }
}

/// Ties retrieval, prompt assembly, the completion call and session
/// history together.
pub struct ChatOrchestrator {
    config: Arc<dyn ConfigSource>,
    store: Arc<dyn ConversationStore>,
    web: WebSearchClient,
    retriever: LocalRetriever,
    http: reqwest::Client,
    /// Replaces the per-call endpoint client when set
    provider: Option<Arc<dyn Provider>>,
}

impl ChatOrchestrator {
    pub fn new(
        config: Arc<dyn ConfigSource>,
        store: Arc<dyn ConversationStore>,
        web: WebSearchClient,
        retriever: LocalRetriever,
    ) -> Self {
        Self {
            config,
            store,
            web,
            retriever,
            http: reqwest::Client::new(),
            provider: None,
        }
    }

    /// Share an existing HTTP client for completion calls.
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http = client;
        self
    }

    /// Use a fixed provider instead of building one from each snapshot.
    pub fn with_provider(mut self, provider: Arc<dyn Provider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Run one chat turn.
    pub async fn chat(&self, request: ChatRequest) -> Result<ChatReply> {
        let config = self.config.snapshot();

        // ── Validating ──
        if !config.enabled {
            return Err(Error::config(DISABLED_MESSAGE));
        }
        let Some(endpoint) = OpenAiCompatProvider::from_config(&config, self.http.clone()) else {
            return Err(Error::config(MISSING_KEY_MESSAGE));
        };

        let session = SessionId::normalize(&request.session_id);
        let message = request.message.trim();
        let instruction = request
            .system_instruction
            .as_deref()
            .map(str::trim)
            .unwrap_or("");
        let use_rag = request.use_rag.unwrap_or(config.enable_rag);
        let use_web = request.use_web_search.unwrap_or(config.enable_web_search);

        let history = self.store.get(&session).await;

        // ── Retrieving ──
        let context = self.gather(&config, message, use_rag, use_web).await;

        // ── Assembling ──
        let system = build_system_instruction(&config.system_prompt, instruction, &context.block());

        let mut conversation = history;
        conversation.push(Message::user(message));

        let mut outbound = Vec::with_capacity(conversation.len() + 1);
        outbound.push(Message::system(system));
        outbound.extend(conversation.iter().cloned());

        // ── Calling ──
        let provider: Arc<dyn Provider> = match &self.provider {
            Some(p) => p.clone(),
            None => Arc::new(endpoint),
        };

        debug!(
            session = %session,
            provider = provider.name(),
            model = %config.model,
            messages = outbound.len(),
            "Calling completion endpoint"
        );

        let completion = ProviderRequest {
            model: config.model.clone(),
            messages: outbound,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        };

        let response = match tokio::time::timeout(config.timeout(), provider.complete(completion)).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                warn!(session = %session, error = %e, "Completion failed");
                return Err(e.into());
            }
            Err(_) => {
                let e = ProviderError::Timeout(format!("{}ms", config.timeout_ms));
                warn!(session = %session, error = %e, "Completion timed out");
                return Err(e.into());
            }
        };

        let reply = response.content.trim();
        if reply.is_empty() {
            return Err(ProviderError::EmptyReply.into());
        }

        // ── Committing ──
        conversation.push(Message::assistant(reply));
        let messages_in_memory = conversation.len().min(config.max_history_messages);
        self.store
            .set(&session, conversation, config.max_history_messages)
            .await;

        info!(
            session = %session,
            store = self.store.name(),
            model = %config.model,
            snippets = context.snippets.len(),
            results = context.web.len(),
            messages = messages_in_memory,
            "Chat turn complete"
        );

        Ok(ChatReply {
            session_id: session.to_string(),
            model: config.model,
            reply: reply.to_string(),
            messages_in_memory,
            rag_sources: context
                .snippets
                .iter()
                .map(|s| RagSource {
                    source: s.source.clone(),
                    line: s.line,
                })
                .collect(),
            web_sources: context.web,
        })
    }

    /// Run retrieval only, without validating or calling the model.
    pub async fn retrieve(&self, query: &str, use_rag: bool, use_web: bool) -> RetrievedContext {
        let config = self.config.snapshot();
        self.gather(&config, query.trim(), use_rag, use_web).await
    }

    /// Drop a session's history. Returns whether one existed.
    pub async fn clear_session(&self, session_id: &str) -> bool {
        self.store.clear(&SessionId::normalize(session_id)).await
    }

    /// The store backing session history.
    pub fn store(&self) -> &Arc<dyn ConversationStore> {
        &self.store
    }

    async fn gather(
        &self,
        config: &AiConfig,
        query: &str,
        use_rag: bool,
        use_web: bool,
    ) -> RetrievedContext {
        let limits = RetrievalLimits {
            top_k: config.rag_top_k,
            max_file_bytes: config.rag_max_file_bytes,
        };

        let local = async {
            if use_rag {
                self.retriever.retrieve(query, limits).await
            } else {
                Vec::new()
            }
        };
        let web = async {
            if use_web {
                self.web.search(query, config.web_search_top_k).await
            } else {
                Vec::new()
            }
        };

        let (snippets, web) = tokio::join!(local, web);
        debug!(snippets = snippets.len(), results = web.len(), "Context retrieved");

        RetrievedContext { snippets, web }
    }
}
