//! Conversation store trait: keyed, bounded per-session history.
//!
//! The store is the only state shared between concurrent chat calls.
//! Implementations must be safe to use from many tasks at once; two
//! simultaneous writers to the same session race, last write wins.

use async_trait::async_trait;
use crate::message::{Message, SessionId};

/// The core ConversationStore trait.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// The backend name (e.g., "in_memory").
    fn name(&self) -> &str;

    /// Current history for a session; empty when the session is unknown.
    async fn get(&self, session: &SessionId) -> Vec<Message>;

    /// Replace a session's history, keeping only the most recent
    /// `max_messages` entries (oldest dropped first).
    async fn set(&self, session: &SessionId, messages: Vec<Message>, max_messages: usize);

    /// Remove a session. Returns whether one existed.
    async fn clear(&self, session: &SessionId) -> bool;

    /// Number of live sessions.
    async fn len(&self) -> usize;
}

/// Keep the newest `max` entries of `messages`, in original order.
pub fn truncate_oldest(mut messages: Vec<Message>, max: usize) -> Vec<Message> {
    if messages.len() > max {
        let excess = messages.len() - max;
        messages.drain(..excess);
    }
    messages
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncation_keeps_most_recent_in_order() {
        let msgs: Vec<Message> = (0..6).map(|i| Message::user(i.to_string())).collect();
        let kept = truncate_oldest(msgs, 4);
        let contents: Vec<&str> = kept.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["2", "3", "4", "5"]);
    }

    #[test]
    fn truncation_is_noop_under_limit() {
        let msgs = vec![Message::user("a"), Message::assistant("b")];
        assert_eq!(truncate_oldest(msgs.clone(), 20), msgs);
    }

    #[test]
    fn truncation_to_zero_empties() {
        let msgs = vec![Message::user("a")];
        assert!(truncate_oldest(msgs, 0).is_empty());
    }
}
