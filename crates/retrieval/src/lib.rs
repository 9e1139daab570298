//! Lexical (token-overlap) retrieval over a local directory of documents.
//!
//! - [`tokenizer`]: normalizes text into significant lowercase terms
//! - [`corpus`]: enumerates every regular file under a root
//! - [`local`]: scores three-line windows of each file against a query

pub mod corpus;
pub mod local;
pub mod tokenizer;

pub use corpus::list_files;
pub use local::{LocalRetriever, RetrievalLimits, ScoredSnippet};
pub use tokenizer::tokenize;
