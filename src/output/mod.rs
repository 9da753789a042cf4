// Output formatting: terminal display for dry runs and status, and the
// length clamp shared with the Discord client.

pub mod terminal;

/// Cut `text` down to at most `max_chars` characters, the trailing "..."
/// included.
///
/// Discord rejects any message whose content is over 2000 characters instead
/// of clipping it, and crash reports carry arbitrary error chains. Counting
/// chars rather than bytes keeps multi-byte usernames and tag names whole.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    const ELLIPSIS: &str = "...";

    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let kept: String = text
        .chars()
        .take(max_chars.saturating_sub(ELLIPSIS.len()))
        .collect();
    format!("{kept}{ELLIPSIS}")
}
