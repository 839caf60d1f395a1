//! Splitting a submitted line into whitespace-separated tokens.
//!
//! There is no quoting, escaping or operator syntax: a token is any maximal
//! run of characters that are not delimiters.

/// Characters that separate tokens.
pub const DELIMITERS: &[char] = &[' ', '\t', '\r', '\n', '\x07'];

/// Borrowed, non-empty tokens of `line` in order of appearance.
///
/// The tokens point into `line` and cannot outlive it.
pub fn split_into_tokens(line: &str) -> Vec<&str> {
    line.split(DELIMITERS).filter(|t| !t.is_empty()).collect()
}
