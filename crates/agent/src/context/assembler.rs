//! Context assembly.
//!
//! Renders retrieval output into the text the model sees:
//!
//! | Section | Header | Entry |
//! |---------|--------|-------|
//! | Local | `Local project context:` | `[LOCAL n] source:line` + preview |
//! | Web | `Internet search context:` | `[WEB n] title` + `URL:` + `Summary:` |
//!
//! A section with no input is omitted entirely. Assembly is deterministic:
//! identical inputs always render identical text.

use ragchat_core::search::WebResult;
use ragchat_retrieval::ScoredSnippet;

/// Introduces the context block inside the system instruction.
pub const CONTEXT_PREAMBLE: &str = "Use the following context when relevant:";

const LOCAL_HEADER: &str = "Local project context:";
const WEB_HEADER: &str = "Internet search context:";
const SEPARATOR: &str = "\n\n";

/// Merge local snippets and web results into a single block.
///
/// Returns an empty string when both inputs are empty.
pub fn build_context_block(snippets: &[ScoredSnippet], web: &[WebResult]) -> String {
    let mut sections = Vec::with_capacity(2);

    if !snippets.is_empty() {
        sections.push(render_local(snippets));
    }
    if !web.is_empty() {
        sections.push(render_web(web));
    }

    sections.join(SEPARATOR)
}

/// Concatenate the base prompt, the per-call instruction and the context
/// block, skipping whichever are empty.
pub fn build_system_instruction(base: &str, instruction: &str, context: &str) -> String {
    let context = if context.is_empty() {
        String::new()
    } else {
        format!("{CONTEXT_PREAMBLE}{SEPARATOR}{context}")
    };

    [base, instruction, context.as_str()]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(SEPARATOR)
}

fn render_local(snippets: &[ScoredSnippet]) -> String {
    let entries: Vec<String> = snippets
        .iter()
        .enumerate()
        .map(|(i, s)| format!("[LOCAL {}] {}:{}\n{}", i + 1, s.source, s.line, s.text))
        .collect();
    format!("{LOCAL_HEADER}\n{}", entries.join(SEPARATOR))
}

fn render_web(results: &[WebResult]) -> String {
    let entries: Vec<String> = results
        .iter()
        .enumerate()
        .map(|(i, r)| {
            format!(
                "[WEB {}] {}\nURL: {}\nSummary: {}",
                i + 1,
                r.title,
                r.link,
                r.snippet
            )
        })
        .collect();
    format!("{WEB_HEADER}\n{}", entries.join(SEPARATOR))
}
