//! Conversation memory implementations for ragchat.

pub mod in_memory;

pub use in_memory::InMemoryConversationStore;
