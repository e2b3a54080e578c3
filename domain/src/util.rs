//! Shared utility functions.

/// Marker appended to output that was cut by [`truncate_output`].
pub const TRUNCATION_MARKER: &str = "\n(truncated)";

/// Truncate a string to at most `max_bytes` without splitting a UTF-8
/// character boundary.
///
/// Returns a sub-slice of the original string. If the string is shorter than
/// `max_bytes`, the entire string is returned unchanged.
pub fn truncate_str(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Cap captured command output at `max_bytes`, appending [`TRUNCATION_MARKER`]
/// when anything was cut.
pub fn truncate_output(s: &str, max_bytes: usize) -> String {
    if s.len() <= max_bytes {
        return s.to_string();
    }
    let mut out = String::with_capacity(max_bytes + TRUNCATION_MARKER.len());
    out.push_str(truncate_str(s, max_bytes));
    out.push_str(TRUNCATION_MARKER);
    out
}
