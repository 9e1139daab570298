//! In-memory conversation store.
//!
//! Sessions live for the life of the process: there is no expiry or
//! eviction, so a long-running deployment with many distinct session keys
//! grows without bound.

use async_trait::async_trait;
use ragchat_core::memory::{ConversationStore, truncate_oldest};
use ragchat_core::message::{Message, SessionId};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Session histories keyed by session id.
#[derive(Clone)]
pub struct InMemoryConversationStore {
    sessions: Arc<RwLock<HashMap<SessionId, Vec<Message>>>>,
}

impl InMemoryConversationStore {
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryConversationStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConversationStore for InMemoryConversationStore {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn get(&self, session: &SessionId) -> Vec<Message> {
        self.sessions
            .read()
            .await
            .get(session)
            .cloned()
            .unwrap_or_default()
    }

    async fn set(&self, session: &SessionId, messages: Vec<Message>, max_messages: usize) {
        let kept = truncate_oldest(messages, max_messages);
        debug!(session = %session, messages = kept.len(), "Storing session history");
        self.sessions.write().await.insert(session.clone(), kept);
    }

    async fn clear(&self, session: &SessionId) -> bool {
        let removed = self.sessions.write().await.remove(session).is_some();
        debug!(session = %session, removed, "Clearing session");
        removed
    }

    async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}
