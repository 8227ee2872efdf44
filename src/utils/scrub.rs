//! Redaction of credentials in text that crosses a trust boundary: backend
//! error bodies, script stderr and RPC failure messages.

use super::text::truncate_with_ellipsis;
use std::borrow::Cow;

const REDACTED: &str = "[REDACTED]";

/// Longest error excerpt carried into error messages and task observations.
pub const MAX_ERROR_CHARS: usize = 200;

/// Tokens recognized by their vendor prefix.
const PREFIX_PATTERNS: [&str; 8] = [
    "sk-", "ghp_", "github_pat_", "hf_", "glpat-", "ya29.", "AIza", "xoxb-",
];

/// Markers followed by a secret value.
const MARKER_PATTERNS: [&str; 11] = [
    "Authorization: Bearer ",
    "authorization: bearer ",
    "\"authorization\":\"Bearer ",
    "api_key=",
    "apikey=",
    "access_token=",
    "private_key=",
    "\"api_key\":\"",
    "\"access_token\":\"",
    "\"private_key\":\"",
    "\"token\":\"",
];

fn is_secret_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | ':' | '+' | '/' | '=')
}

fn token_end(input: &str, from: usize) -> usize {
    input[from..]
        .char_indices()
        .find(|(_, c)| !is_secret_char(*c))
        .map_or(input.len(), |(i, _)| from + i)
}

fn redact_after(scrubbed: &mut String, marker: &str) {
    let mut search_from = 0;
    while let Some(rel) = scrubbed[search_from..].find(marker) {
        let start = search_from + rel;
        let value_start = start + marker.len();
        let end = token_end(scrubbed, value_start);
        if end == value_start {
            search_from = value_start;
            continue;
        }
        // Prefix tokens are replaced whole; markers keep their label.
        let replace_from = if PREFIX_PATTERNS.contains(&marker) {
            start
        } else {
            value_start
        };
        scrubbed.replace_range(replace_from..end, REDACTED);
        search_from = replace_from + REDACTED.len();
    }
}

/// 32-byte hex strings (`0x` + 64 hex digits) are private-key shaped.
/// Transaction hashes share the shape and are redacted as well.
fn redact_hex_keys(scrubbed: &mut String) {
    let mut search_from = 0;
    while let Some(rel) = scrubbed[search_from..].find("0x") {
        let start = search_from + rel;
        let digits = scrubbed[start + 2..]
            .chars()
            .take_while(char::is_ascii_hexdigit)
            .count();
        if digits == 64 {
            scrubbed.replace_range(start..start + 66, REDACTED);
            search_from = start + REDACTED.len();
        } else {
            search_from = start + 2 + digits;
        }
    }
}

/// Scrub secret-like tokens from free text.
pub fn scrub_secret_patterns(input: &str) -> Cow<'_, str> {
    let suspicious = PREFIX_PATTERNS
        .iter()
        .chain(MARKER_PATTERNS.iter())
        .any(|p| input.contains(p))
        || input.contains("0x");
    if !suspicious {
        return Cow::Borrowed(input);
    }

    let mut scrubbed = input.to_string();
    for pattern in PREFIX_PATTERNS.iter().chain(MARKER_PATTERNS.iter()) {
        redact_after(&mut scrubbed, pattern);
    }
    redact_hex_keys(&mut scrubbed);

    if scrubbed == input {
        Cow::Borrowed(input)
    } else {
        Cow::Owned(scrubbed)
    }
}

/// Scrub and cut error text to [`MAX_ERROR_CHARS`].
pub fn sanitize_api_error(input: &str) -> String {
    truncate_with_ellipsis(scrub_secret_patterns(input.trim()).as_ref(), MAX_ERROR_CHARS)
}
