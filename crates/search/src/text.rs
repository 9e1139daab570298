//! Normalization of provider text into plain, single-line strings.

use std::sync::LazyLock;

use regex::Regex;

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").expect("tag pattern is valid"));

/// Collapse every whitespace run into one space and trim.
pub fn collapse_whitespace(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Strip markup tags, decode the common entities, collapse whitespace.
pub fn html_to_text(html: &str) -> String {
    let text = TAG_RE.replace_all(html, " ");
    let text = text
        .replace("&nbsp;", " ")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&");
    collapse_whitespace(&text)
}

/// Title part of a "Title - description" topic line.
pub fn title_before_dash(text: &str) -> &str {
    text.split(" - ").next().unwrap_or("").trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_tags_and_collapses() {
        let raw = r#"The <span class="searchmatch">Rust</span>   programming
            language &quot;book&quot;"#;
        assert_eq!(html_to_text(raw), r#"The Rust programming language "book""#);
    }

    #[test]
    fn entity_decoding_does_not_double_decode() {
        assert_eq!(html_to_text("a &amp;lt; b"), "a &lt; b");
    }

    #[test]
    fn title_is_text_before_dash() {
        assert_eq!(title_before_dash("Rust - A systems language"), "Rust");
        assert_eq!(title_before_dash("No dash here"), "No dash here");
        assert_eq!(title_before_dash(" - leading"), "");
    }
}
