//! Web search for ragchat.
//!
//! A primary instant-answer provider (DuckDuckGo) backed by an
//! encyclopedia search (Wikipedia). [`WebSearchClient`] runs them as an
//! ordered fallback chain and never returns an error: when every stage
//! fails or comes back empty the result is simply empty.

pub mod client;
pub mod duckduckgo;
pub mod text;
pub mod wikipedia;

pub use client::WebSearchClient;
pub use duckduckgo::DuckDuckGoSearch;
pub use wikipedia::WikipediaSearch;
