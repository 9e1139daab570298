//! Configuration loading, validation, and snapshotting for ragchat.
//!
//! Loads configuration from `ragchat.toml` with environment variable
//! overrides. The chat engine never caches configuration: it asks a
//! [`ConfigSource`] for a fresh [`AiConfig`] snapshot on every call.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use std::time::Duration;

/// Default config file name, resolved against the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "ragchat.toml";

const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful and accurate assistant. \
If context is provided, prioritize it and clearly say when information is uncertain. \
If internet search context is present, answer from that context and never use \
knowledge-cutoff disclaimers like \"as of my last update\". If local context is present \
and the user asks about internal/project notes, use local context first and do not claim \
that internal notes are missing unless local context is empty. If context is insufficient, \
say so explicitly.";

/// The root configuration structure.
///
/// Maps directly to `ragchat.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Completion endpoint and retrieval toggles
    #[serde(default)]
    pub ai: AiConfig,

    /// Local document corpus
    #[serde(default)]
    pub corpus: CorpusConfig,

    /// Web search providers
    #[serde(default)]
    pub search: SearchConfig,
}

/// Per-call settings for the chat engine.
#[derive(Clone, Serialize, Deserialize)]
pub struct AiConfig {
    /// Master switch; a disabled engine refuses every chat call
    #[serde(default)]
    pub enabled: bool,

    /// Base URL of the OpenAI-compatible endpoint (with or without `/chat/completions`)
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Bearer credential
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_model")]
    pub model: String,

    /// Overall completion timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Base system instruction, always first in the assembled prompt
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Sliding-window length of stored history per session
    #[serde(default = "default_max_history_messages")]
    pub max_history_messages: usize,

    /// Default for local retrieval when a call does not say
    #[serde(default = "default_true")]
    pub enable_rag: bool,

    /// Default for web search when a call does not say
    #[serde(default = "default_true")]
    pub enable_web_search: bool,

    #[serde(default = "default_top_k")]
    pub rag_top_k: usize,

    #[serde(default = "default_top_k")]
    pub web_search_top_k: usize,

    /// Files larger than this are skipped by local retrieval
    #[serde(default = "default_rag_max_file_bytes")]
    pub rag_max_file_bytes: u64,
}

fn default_api_base_url() -> String {
    "https://router.huggingface.co/v1/chat/completions".into()
}
fn default_model() -> String {
    "Qwen/Qwen2.5-7B-Instruct".into()
}
fn default_timeout_ms() -> u64 {
    20_000
}
fn default_system_prompt() -> String {
    DEFAULT_SYSTEM_PROMPT.into()
}
fn default_max_tokens() -> u32 {
    512
}
fn default_temperature() -> f32 {
    0.7
}
fn default_max_history_messages() -> usize {
    20
}
fn default_true() -> bool {
    true
}
fn default_top_k() -> usize {
    3
}
fn default_rag_max_file_bytes() -> u64 {
    120_000
}

impl AiConfig {
    /// Overall completion timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// The credential, if one is configured and non-blank.
    pub fn credential(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }

    /// Full URL of the completions endpoint.
    pub fn completions_url(&self) -> String {
        if self.api_base_url.ends_with("/chat/completions") {
            self.api_base_url.clone()
        } else {
            format!("{}/chat/completions", self.api_base_url.trim_end_matches('/'))
        }
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_base_url: default_api_base_url(),
            api_key: None,
            model: default_model(),
            timeout_ms: default_timeout_ms(),
            system_prompt: default_system_prompt(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            max_history_messages: default_max_history_messages(),
            enable_rag: true,
            enable_web_search: true,
            rag_top_k: default_top_k(),
            web_search_top_k: default_top_k(),
            rag_max_file_bytes: default_rag_max_file_bytes(),
        }
    }
}

/// Redact a secret for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AiConfig")
            .field("enabled", &self.enabled)
            .field("api_base_url", &self.api_base_url)
            .field("api_key", &redact(&self.api_key))
            .field("model", &self.model)
            .field("timeout_ms", &self.timeout_ms)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("max_history_messages", &self.max_history_messages)
            .field("enable_rag", &self.enable_rag)
            .field("enable_web_search", &self.enable_web_search)
            .field("rag_top_k", &self.rag_top_k)
            .field("web_search_top_k", &self.web_search_top_k)
            .field("rag_max_file_bytes", &self.rag_max_file_bytes)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusConfig {
    /// Directory holding the local documents
    #[serde(default = "default_corpus_root")]
    pub root: PathBuf,

    /// Base that reported `source` paths are relative to.
    /// Defaults to the process working directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_base: Option<PathBuf>,
}

fn default_corpus_root() -> PathBuf {
    PathBuf::from("rag")
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            root: default_corpus_root(),
            source_base: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Instant-answer endpoint (primary)
    #[serde(default = "default_duckduckgo_url")]
    pub duckduckgo_url: String,

    /// Encyclopedia search endpoint (fallback)
    #[serde(default = "default_wikipedia_url")]
    pub wikipedia_url: String,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Per-stage timeout
    #[serde(default = "default_search_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_duckduckgo_url() -> String {
    "https://api.duckduckgo.com/".into()
}
fn default_wikipedia_url() -> String {
    "https://en.wikipedia.org/w/api.php".into()
}
fn default_user_agent() -> String {
    "tiny-chat-app/1.0".into()
}
fn default_search_timeout_secs() -> u64 {
    10
}

impl SearchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            duckduckgo_url: default_duckduckgo_url(),
            wikipedia_url: default_wikipedia_url(),
            user_agent: default_user_agent(),
            timeout_secs: default_search_timeout_secs(),
        }
    }
}

impl AppConfig {
    /// Load configuration from `path`, then apply environment overrides:
    /// - `AI_ENABLED` (`true`, case-insensitive, enables)
    /// - `AI_API_BASE_URL`
    /// - `AI_API_KEY`
    /// - `AI_MODEL`
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load_from(path)?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path, without env overrides.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from an environment lookup.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(enabled) = lookup("AI_ENABLED") {
            self.ai.enabled = enabled.trim().eq_ignore_ascii_case("true");
        }
        if let Some(url) = lookup("AI_API_BASE_URL").filter(|v| !v.is_empty()) {
            self.ai.api_base_url = url;
        }
        if let Some(key) = lookup("AI_API_KEY").filter(|v| !v.is_empty()) {
            self.ai.api_key = Some(key);
        }
        if let Some(model) = lookup("AI_MODEL").filter(|v| !v.is_empty()) {
            self.ai.model = model;
        }
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.ai.temperature) {
            return Err(ConfigError::ValidationError(
                "ai.temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.ai.max_history_messages == 0 {
            return Err(ConfigError::ValidationError(
                "ai.max_history_messages must be at least 1".into(),
            ));
        }

        if self.ai.timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "ai.timeout_ms must be > 0".into(),
            ));
        }

        if self.search.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "search.timeout_secs must be > 0".into(),
            ));
        }

        Ok(())
    }

    /// Generate a default config TOML string.
    pub fn default_toml() -> String {
        toml::to_string_pretty(&Self::default()).unwrap_or_default()
    }
}

/// Supplies a configuration snapshot at the start of every chat call.
pub trait ConfigSource: Send + Sync {
    fn snapshot(&self) -> AiConfig;
}

impl ConfigSource for AiConfig {
    fn snapshot(&self) -> AiConfig {
        self.clone()
    }
}

/// Configuration that can be replaced while the process runs.
/// In-flight calls keep the snapshot they started with.
#[derive(Debug, Default)]
pub struct SharedConfig {
    inner: RwLock<AiConfig>,
}

impl SharedConfig {
    pub fn new(config: AiConfig) -> Self {
        Self {
            inner: RwLock::new(config),
        }
    }

    pub fn replace(&self, config: AiConfig) {
        match self.inner.write() {
            Ok(mut guard) => *guard = config,
            Err(poisoned) => *poisoned.into_inner() = config,
        }
    }
}

impl ConfigSource for SharedConfig {
    fn snapshot(&self) -> AiConfig {
        match self.inner.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
