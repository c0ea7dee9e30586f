//! Byte-window helpers shared by the extractors. All offsets returned here
//! fall on char boundaries.

/// Largest char boundary `<= idx`.
pub(crate) fn floor_boundary(text: &str, idx: usize) -> usize {
    if idx >= text.len() {
        return text.len();
    }
    let mut idx = idx;
    while !text.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

/// Smallest char boundary `>= idx`.
pub(crate) fn ceil_boundary(text: &str, idx: usize) -> usize {
    if idx >= text.len() {
        return text.len();
    }
    let mut idx = idx;
    while !text.is_char_boundary(idx) {
        idx += 1;
    }
    idx
}

/// Whether the byte at `idx` ends a sentence.
///
/// `;` always does. `.` does when followed by end of text or by whitespace
/// and an uppercase letter, quote or opening parenthesis, so `42 U.S.C. 3030a`
/// and `Sec. 5` stay in one sentence. A blank line always does.
fn ends_sentence(text: &str, idx: usize) -> bool {
    let bytes = text.as_bytes();
    match bytes[idx] {
        b';' => true,
        b'.' => {
            let after = &text[idx + 1..];
            let trimmed = after.trim_start();
            if trimmed.is_empty() {
                return true;
            }
            if trimmed.len() == after.len() {
                return false;
            }
            trimmed
                .chars()
                .next()
                .is_some_and(|c| c.is_uppercase() || matches!(c, '"' | '\'' | '(' | '“' | '‘'))
        }
        b'\n' => text[idx + 1..].starts_with('\n'),
        _ => false,
    }
}

/// Offset just past the sentence containing `from`, at most `max` bytes on.
pub(crate) fn sentence_end(text: &str, from: usize, max: usize) -> usize {
    let limit = floor_boundary(text, from.saturating_add(max));
    (from..limit)
        .find(|&i| ends_sentence(text, i))
        .map_or(limit, |i| i + 1)
}

/// Offset where the sentence containing `to` starts, at most `max` bytes back.
pub(crate) fn sentence_start(text: &str, to: usize, max: usize) -> usize {
    let limit = ceil_boundary(text, to.saturating_sub(max));
    (limit..to)
        .rev()
        .find(|&i| ends_sentence(text, i))
        .map_or(limit, |i| i + 1)
}

/// Collapse all whitespace runs to single spaces and trim.
pub(crate) fn squash(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
