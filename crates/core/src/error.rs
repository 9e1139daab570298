//! Error types for the ragchat domain.
//!
//! Uses `thiserror` for ergonomic error definitions. Only two classes ever
//! cross the chat boundary: [`Error::Config`] and [`Error::Upstream`].
//! Search and per-file retrieval faults are absorbed where they occur.

use thiserror::Error;

/// The top-level error type returned by a chat call.
#[derive(Debug, Error)]
pub enum Error {
    // --- Configuration errors ---
    #[error("{message}")]
    Config { message: String },

    // --- Upstream (completion endpoint) errors ---
    #[error("{0}")]
    Upstream(#[from] ProviderError),
}

impl Error {
    /// Build a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Whether this error was raised before any network access.
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config { .. })
    }

    /// HTTP status an outer layer should answer with.
    ///
    /// Configuration problems mean the service is unavailable (503);
    /// anything that went wrong talking to the model is a bad gateway (502).
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Config { .. } => 503,
            Self::Upstream(_) => 502,
        }
    }
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// Failures talking to the completion endpoint.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    /// Non-2xx response. `message` is the provider's own error text when it
    /// sent one, otherwise a status-derived description.
    #[error("{message}")]
    ApiError { status_code: u16, message: String },

    #[error("AI request timed out after {0}")]
    Timeout(String),

    #[error("AI request failed: {0}")]
    Network(String),

    #[error("AI returned a malformed response: {0}")]
    MalformedResponse(String),

    #[error("AI did not return text.")]
    EmptyReply,
}

/// Failures of a single web-search stage. Never surfaced to chat callers:
/// the search client falls back to the next stage or returns no results.
#[derive(Debug, Clone, Error)]
pub enum SearchError {
    #[error("{provider} transport failure: {reason}")]
    Transport { provider: String, reason: String },

    #[error("{provider} answered with status {status_code}")]
    Status { provider: String, status_code: u16 },

    #[error("{provider} response could not be parsed: {reason}")]
    Parse { provider: String, reason: String },

    #[error("{provider} timed out after {timeout_secs}s")]
    Timeout { provider: String, timeout_secs: u64 },
}
