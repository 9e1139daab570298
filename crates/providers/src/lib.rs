//! Completion endpoint client for ragchat.
//!
//! The provider implements the `ragchat_core::Provider` trait against any
//! OpenAI-compatible `/chat/completions` endpoint.

pub mod openai_compat;

pub use openai_compat::OpenAiCompatProvider;
