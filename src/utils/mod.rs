//! Utility modules for common functionality

/// Truncate a string to at most `max_chars` characters, cutting on a valid
/// UTF-8 char boundary. Returns the longest prefix that fits.
pub fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
