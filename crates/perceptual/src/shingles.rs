//! Character shingling over normalized text.

/// Split `text` into every contiguous window of `width` characters.
///
/// Windows are counted in Unicode scalar values, not bytes. When the text is
/// shorter than `width` (including the empty string) the whole text is the
/// only shingle, so every input yields at least one feature. A `width` of
/// zero is treated as one.
pub fn char_shingles(text: &str, width: usize) -> Vec<&str> {
    let width = width.max(1);
    // Byte offset of every char boundary, plus the end of the string.
    let mut bounds: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
    let char_count = bounds.len();
    bounds.push(text.len());

    if char_count < width {
        return vec![text];
    }

    let mut out = Vec::with_capacity(char_count - width + 1);
    for start in 0..=char_count - width {
        out.push(&text[bounds[start]..bounds[start + width]]);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn produces_all_windows_in_order() {
        assert_eq!(char_shingles("starbucks", 3), vec![
            "sta", "tar", "arb", "rbu", "buc", "uck", "cks"
        ]);
    }

    #[test]
    fn count_is_len_minus_width_plus_one() {
        let text = "starbucks 4521";
        assert_eq!(char_shingles(text, 3).len(), text.len() - 3 + 1);
    }

    #[test]
    fn exact_width_yields_single_shingle() {
        assert_eq!(char_shingles("abc", 3), vec!["abc"]);
    }

    #[test]
    fn short_text_falls_back_to_whole_string() {
        assert_eq!(char_shingles("ab", 3), vec!["ab"]);
        assert_eq!(char_shingles("", 3), vec![""]);
    }

    #[test]
    fn windows_respect_char_boundaries() {
        let shingles = char_shingles("café au", 3);
        assert_eq!(shingles[0], "caf");
        assert_eq!(shingles[1], "afé");
        assert_eq!(shingles[2], "fé ");
        assert_eq!(shingles.len(), 5);
    }

    #[test]
    fn zero_width_behaves_like_one() {
        assert_eq!(char_shingles("abc", 0), vec!["a", "b", "c"]);
    }

    #[test]
    fn repeated_windows_are_kept() {
        let shingles = char_shingles("aaaa", 2);
        assert_eq!(shingles, vec!["aa", "aa", "aa"]);
    }
}
