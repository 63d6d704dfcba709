//! Markdown code-fence stripping.
//!
//! Producers sometimes wrap the serialized object in a fenced block:
//!
//! ````text
//! ```json
//! { ... }
//! ```
//! ````
//!
//! The helpers here return a borrowed slice of the input with the fence
//! markers removed. They are applied to the whole accumulated buffer on every
//! fragment, so they must also cope with a fence that is itself still arriving.

use crate::classify::{is_fence_tag_char, trim_json_ws_end};

const FENCE: &str = "```";

/// Strip a leading fence (with or without a language tag) and a trailing fence.
pub fn strip_fences(text: &str) -> &str {
    strip_trailing_fence(strip_leading_fence(text))
}

/// Remove a leading fence marker, its optional language tag and the whitespace after it.
///
/// A lone run of one or two backticks is a fence that has not finished
/// arriving; it yields an empty slice.
pub fn strip_leading_fence(text: &str) -> &str {
    let s = text.trim_start();
    if !s.starts_with('`') {
        return s;
    }
    let ticks = s.bytes().take_while(|&b| b == b'`').count();
    if ticks < FENCE.len() {
        return if ticks == s.len() { "" } else { s };
    }
    let rest = &s[ticks..];
    let tag_len: usize = rest
        .chars()
        .take_while(|&c| is_fence_tag_char(c))
        .map(char::len_utf8)
        .sum();
    rest[tag_len..].trim_start()
}

/// Remove a trailing fence marker and the whitespace before it.
///
/// A partial trailing marker (one or two backticks) is also removed once the
/// object before it has closed.
pub fn strip_trailing_fence(text: &str) -> &str {
    let s = trim_json_ws_end(text);
    if let Some(body) = s.strip_suffix(FENCE) {
        return trim_json_ws_end(body);
    }
    let ticks = s.bytes().rev().take_while(|&b| b == b'`').count();
    if ticks > 0 {
        let body = trim_json_ws_end(&s[..s.len() - ticks]);
        if body.ends_with('}') {
            return body;
        }
    }
    s
}
