//! Small text helpers.

/// Cut `s` down to its first `max_chars` characters.
///
/// Counting is by `char`, not bytes, so multi-byte text is never split
/// mid-character. Returns a sub-slice of the input; no allocation.
pub fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
