//! # ragchat core
//!
//! Domain types, traits, and error definitions for the ragchat engine.
//! This crate has **no framework dependencies**: it defines the domain model
//! that the provider, memory, search and agent crates implement against.
//!
//! ## Seams
//!
//! Every external collaborator is a trait here:
//! - [`Provider`]: the remote text-completion endpoint
//! - [`SearchProvider`]: one stage of the web-search fallback chain
//! - [`ConversationStore`]: keyed, bounded per-session history

pub mod error;
pub mod memory;
pub mod message;
pub mod provider;
pub mod search;

// Re-export key types at crate root for ergonomics
pub use error::{Error, ProviderError, Result, SearchError};
pub use memory::ConversationStore;
pub use message::{Message, Role, SessionId};
pub use provider::{Provider, ProviderRequest, ProviderResponse};
pub use search::{SearchProvider, WebResult};
