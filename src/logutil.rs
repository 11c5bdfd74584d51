//! Logging helpers for quoting chat content in single-line log records.
//! Player-supplied text may contain newlines, control characters, or be
//! arbitrarily long; logs should stay one line per event.

/// Render chat content as a short, single-line preview:
/// - runs of whitespace (including newlines) collapse to a single space
/// - other control characters are dropped
/// - output is capped at `MAX_PREVIEW` characters with an ellipsis
pub fn content_preview(s: &str) -> String {
    const MAX_PREVIEW: usize = 120;
    let mut out = String::with_capacity(s.len().min(MAX_PREVIEW) + 1);
    let mut last_was_space = false;
    for ch in s.chars() {
        if out.chars().count() >= MAX_PREVIEW {
            out.push('…');
            break;
        }
        if ch.is_whitespace() {
            if !last_was_space && !out.is_empty() {
                out.push(' ');
            }
            last_was_space = true;
        } else if ch.is_control() {
            // drop
        } else {
            out.push(ch);
            last_was_space = false;
        }
    }
    while out.ends_with(' ') {
        out.pop();
    }
    out
}
