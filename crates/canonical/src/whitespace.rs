//! Whitespace helpers shared by the normalizer and corpus readers.
//!
//! ```rust
//! use canonical::collapse_whitespace;
//!
//! assert_eq!(collapse_whitespace("  blue \t bottle \n"), "blue bottle");
//! ```

/// Collapse every run of Unicode whitespace into one ASCII space and trim
/// both ends.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Tokens of already normalized text, in order.
pub fn tokens(normalized: &str) -> impl Iterator<Item = &str> {
    normalized.split(' ').filter(|token| !token.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_mixed_whitespace() {
        assert_eq!(collapse_whitespace("a\u{00A0}\u{00A0}b\r\nc"), "a b c");
        assert_eq!(collapse_whitespace("   "), "");
    }

    #[test]
    fn tokens_skip_empty_segments() {
        let got: Vec<&str> = tokens(" shell  oil ").collect();
        assert_eq!(got, vec!["shell", "oil"]);
        assert_eq!(tokens("").count(), 0);
    }
}
