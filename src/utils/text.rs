/// Cut `s` to at most `max_chars` characters, marking the cut with `...`.
#[must_use]
pub fn truncate_with_ellipsis(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => {
            let truncated = &s[..idx];
            format!("{}...", truncated.trim_end())
        }
        None => s.to_string(),
    }
}

/// Single-line preview of free text for prompt context.
///
/// Surrounding whitespace is dropped and interior line breaks are folded into
/// spaces before truncation, so one history or knowledge item always renders
/// on one prompt line.
#[must_use]
pub fn preview(s: &str, max_chars: usize) -> String {
    let folded = s.split_whitespace().collect::<Vec<_>>().join(" ");
    truncate_with_ellipsis(&folded, max_chars)
}
