//! Text normalization into scoring terms.

/// Tokens of this many characters or fewer are dropped.
const MIN_TOKEN_LEN: usize = 3;

/// Split text into lowercase `[a-z0-9]` terms of at least three characters.
///
/// Every other character (punctuation, path separators, non-ASCII letters)
/// acts as a separator. Empty input yields no tokens.
pub fn tokenize(input: &str) -> Vec<String> {
    let normalized: String = input
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect();

    normalized
        .split_whitespace()
        .filter(|t| t.len() >= MIN_TOKEN_LEN)
        .map(String::from)
        .collect()
}
