use unicode_normalization::UnicodeNormalization;

use crate::whitespace::tokens;

/// Text substituted for an absent description before any rule runs.
pub const ABSENT_DESCRIPTION: &str = "none";

/// Normalize a possibly absent transaction description.
///
/// `None` is treated as the literal word [`ABSENT_DESCRIPTION`], so it
/// normalizes to `"none"` rather than to the empty string.
pub fn normalize_description(raw: Option<&str>) -> String {
    normalize_transaction_name(raw.unwrap_or(ABSENT_DESCRIPTION))
}

/// Normalize a raw transaction description into a canonical token string.
///
/// Rules, in effect:
/// 1. NFKC compatibility folding, then lowercasing.
/// 2. Every non-word character becomes a space. Underscores count as
///    separators too. A hyphen or apostrophe between two letters is elided
///    (`wal-mart` becomes `walmart`).
/// 3. Token filters, repeated until nothing changes:
///    - `MM DD` date fragments (month `01`-`12` followed by day `01`-`31`)
///      are removed;
///    - single ASCII-letter tokens are removed unless they close the string;
///    - tokens made only of `x` (masked digit runs) are removed.
/// 4. Remaining tokens are joined with single spaces.
///
/// The result is a fixed point: `normalize(normalize(s)) == normalize(s)`.
pub fn normalize_transaction_name(raw: &str) -> String {
    let lowered: String = raw.nfkc().collect::<String>().to_lowercase();
    let spaced = strip_non_word(&lowered);

    let mut kept: Vec<&str> = tokens(&spaced).collect();
    loop {
        let before = kept.len();
        kept = filter_tokens(&kept);
        if kept.len() == before {
            break;
        }
    }
    kept.join(" ")
}

fn strip_non_word(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    for (idx, &ch) in chars.iter().enumerate() {
        if ch.is_alphanumeric() {
            out.push(ch);
        } else if is_joiner(ch) && between_letters(&chars, idx) {
            continue;
        } else {
            out.push(' ');
        }
    }
    out
}

fn is_joiner(ch: char) -> bool {
    matches!(ch, '-' | '\'' | '\u{2019}')
}

fn between_letters(chars: &[char], idx: usize) -> bool {
    let before = idx
        .checked_sub(1)
        .and_then(|i| chars.get(i))
        .is_some_and(|c| c.is_alphabetic());
    let after = chars.get(idx + 1).is_some_and(|c| c.is_alphabetic());
    before && after
}

/// One pass of the token filters.
fn filter_tokens<'a>(tokens: &[&'a str]) -> Vec<&'a str> {
    let last = tokens.len().saturating_sub(1);
    let mut out = Vec::with_capacity(tokens.len());
    let mut idx = 0;
    while idx < tokens.len() {
        let token = tokens[idx];
        if let Some(&next) = tokens.get(idx + 1) {
            if is_month(token) && is_day(next) {
                idx += 2;
                continue;
            }
        }
        // A lone letter survives only in the closing position of a
        // multi-token string.
        let drop_letter = is_single_letter(token) && (idx == 0 || idx < last);
        if !drop_letter && !is_masked(token) {
            out.push(token);
        }
        idx += 1;
    }
    out
}

fn is_single_letter(token: &str) -> bool {
    let mut chars = token.chars();
    matches!((chars.next(), chars.next()), (Some(c), None) if c.is_ascii_alphabetic())
}

fn is_masked(token: &str) -> bool {
    !token.is_empty() && token.chars().all(|c| c == 'x')
}

fn two_digit_value(token: &str) -> Option<u8> {
    match token.as_bytes() {
        [a, b] if a.is_ascii_digit() && b.is_ascii_digit() => Some((a - b'0') * 10 + (b - b'0')),
        _ => None,
    }
}

fn is_month(token: &str) -> bool {
    two_digit_value(token).is_some_and(|v| (1..=12).contains(&v))
}

fn is_day(token: &str) -> bool {
    two_digit_value(token).is_some_and(|v| (1..=31).contains(&v))
}
