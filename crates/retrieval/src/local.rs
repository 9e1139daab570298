//! Local retriever: scores line windows of corpus files against a query.
//!
//! # Scoring
//!
//! For every non-blank line, a preview window of that line plus the next two
//! is tokenized. With `overlap` the number of query terms in the window and
//! `source_overlap` how many of those also appear in the file's path:
//!
//! ```text
//! score = overlap * 3 + source_overlap * 2   (-1 for *knowledge.txt)
//! ```
//!
//! Windows with no overlap are never scored. Results are ordered by score
//! (descending), then source path, then line number.

use crate::corpus::list_files;
use crate::tokenizer::tokenize;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Query terms too common to discriminate between documents.
const STOP_WORDS: &[&str] = &[
    "about", "after", "also", "because", "before", "between", "could", "compare", "from",
    "have", "here", "internal", "into", "just", "like", "many", "more", "most", "notes",
    "online", "only", "other", "our", "over", "same", "should", "some", "than", "that",
    "their", "there", "these", "they", "this", "tips", "very", "what", "when", "where",
    "which", "with", "would", "your",
];

/// Files whose path ends with this (case-insensitive) are the generic
/// catch-all notes and rank just below equally matching specific files.
const CATCH_ALL_SUFFIX: &str = "knowledge.txt";
const CATCH_ALL_PENALTY: i32 = 1;

/// Lines in a preview window, starting at the matched line.
const WINDOW_LINES: usize = 3;

/// A scored preview window from a corpus file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoredSnippet {
    pub score: i32,
    /// Path relative to the retriever's source base
    pub source: String,
    /// 1-based line number of the window's first line
    pub line: usize,
    /// The trimmed preview window
    pub text: String,
}

/// Per-call caps, taken from the configuration snapshot.
#[derive(Debug, Clone, Copy)]
pub struct RetrievalLimits {
    pub top_k: usize,
    pub max_file_bytes: u64,
}

/// Scores files under `root` against free-text queries.
#[derive(Debug, Clone)]
pub struct LocalRetriever {
    root: PathBuf,
    source_base: PathBuf,
}

impl LocalRetriever {
    /// A retriever over `root`, reporting sources relative to the process
    /// working directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let source_base = std::env::current_dir().unwrap_or_default();
        Self {
            root: root.into(),
            source_base,
        }
    }

    /// Report sources relative to `base` instead of the working directory.
    pub fn with_source_base(mut self, base: impl Into<PathBuf>) -> Self {
        self.source_base = base.into();
        self
    }

    /// Run retrieval on the blocking pool so file I/O never stalls the
    /// async workers. A panicked or cancelled task yields no results.
    pub async fn retrieve(&self, query: &str, limits: RetrievalLimits) -> Vec<ScoredSnippet> {
        let retriever = self.clone();
        let query = query.to_string();
        match tokio::task::spawn_blocking(move || retriever.retrieve_blocking(&query, limits)).await {
            Ok(snippets) => snippets,
            Err(e) => {
                warn!(error = %e, "Local retrieval task failed");
                Vec::new()
            }
        }
    }

    /// Synchronous retrieval. Per-file failures are skipped.
    pub fn retrieve_blocking(&self, query: &str, limits: RetrievalLimits) -> Vec<ScoredSnippet> {
        let query_tokens = query_terms(query);
        if query_tokens.is_empty() {
            return Vec::new();
        }

        let files = list_files(&self.root);
        let mut scored = self.score_paths(&files, &query_tokens, limits.max_file_bytes);

        scored.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then_with(|| a.source.cmp(&b.source))
                .then_with(|| a.line.cmp(&b.line))
        });
        scored.truncate(limits.top_k);

        debug!(
            files = files.len(),
            snippets = scored.len(),
            "Local retrieval finished"
        );
        scored
    }

    /// Score every readable file in `paths`. A file that cannot be
    /// stat'ed or read is skipped and the rest are still scored.
    fn score_paths(
        &self,
        paths: &[PathBuf],
        query_tokens: &HashSet<String>,
        max_file_bytes: u64,
    ) -> Vec<ScoredSnippet> {
        let mut scored = Vec::new();

        for path in paths {
            match std::fs::metadata(path) {
                Ok(meta) if meta.len() > max_file_bytes => continue,
                Ok(_) => {}
                Err(e) => {
                    debug!(file = %path.display(), error = %e, "Skipping unreadable file");
                    continue;
                }
            }

            let bytes = match std::fs::read(path) {
                Ok(b) => b,
                Err(e) => {
                    debug!(file = %path.display(), error = %e, "Skipping unreadable file");
                    continue;
                }
            };

            let content = String::from_utf8_lossy(&bytes);
            let source = self.source_label(path);
            scored.extend(score_file(&content, &source, query_tokens));
        }

        scored
    }

    fn source_label(&self, path: &Path) -> String {
        let relative = path
            .strip_prefix(&self.source_base)
            .or_else(|_| path.strip_prefix(&self.root))
            .unwrap_or(path);
        relative.to_string_lossy().into_owned()
    }
}

/// Distinct query terms with stop words removed, or all terms when every
/// one of them is a stop word.
fn query_terms(query: &str) -> HashSet<String> {
    let raw = tokenize(query);
    let filtered: HashSet<String> = raw
        .iter()
        .filter(|t| !STOP_WORDS.contains(&t.as_str()))
        .cloned()
        .collect();

    if filtered.is_empty() {
        raw.into_iter().collect()
    } else {
        filtered
    }
}

fn score_file(content: &str, source: &str, query_tokens: &HashSet<String>) -> Vec<ScoredSnippet> {
    let source_tokens: HashSet<String> = tokenize(source).into_iter().collect();
    let penalty = if source.to_lowercase().ends_with(CATCH_ALL_SUFFIX) {
        CATCH_ALL_PENALTY
    } else {
        0
    };

    let lines: Vec<&str> = content.split('\n').collect();
    let mut out = Vec::new();

    for (index, line) in lines.iter().enumerate() {
        if line.trim().is_empty() {
            continue;
        }

        let end = (index + WINDOW_LINES).min(lines.len());
        let preview = lines[index..end].join("\n").trim().to_string();
        let preview_tokens: HashSet<String> = tokenize(&preview).into_iter().collect();

        let overlap: Vec<&String> = query_tokens
            .iter()
            .filter(|t| preview_tokens.contains(*t))
            .collect();
        if overlap.is_empty() {
            continue;
        }

        let source_overlap = overlap.iter().filter(|t| source_tokens.contains(**t)).count();
        let score = overlap.len() as i32 * 3 + source_overlap as i32 * 2 - penalty;

        out.push(ScoredSnippet {
            score,
            source: source.to_string(),
            line: index + 1,
            text: preview,
        });
    }

    out
}
