/// Maximum length, in characters, of string fields stored in an event.
pub const MAX_FIELD_CHARS: usize = 1024;

/// Truncates `s` to at most [`MAX_FIELD_CHARS`] characters.
pub fn truncate(s: &str) -> String {
    match s.char_indices().nth(MAX_FIELD_CHARS) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}
