#[inline]
pub fn is_whitespace(b: u8) -> bool {
    matches!(b, b'\t' | b'\n' | b'\r' | b' ')
}

#[inline]
pub fn is_opener(b: u8) -> bool {
    matches!(b, b'{' | b'[')
}

#[inline]
pub fn closer_for(opener: u8) -> u8 {
    if opener == b'{' { b'}' } else { b']' }
}

/// Bytes that may appear inside a bare literal: numbers, `true`, `false`, `null`.
#[inline]
pub fn is_literal_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'-' | b'+' | b'.')
}

/// Characters allowed in a fence language tag such as `json` or `json5`.
#[inline]
pub fn is_fence_tag_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '+')
}

/// Trim JSON whitespace (not Unicode whitespace) from the end of `s`.
#[inline]
pub fn trim_json_ws_end(s: &str) -> &str {
    let bytes = s.as_bytes();
    let mut end = bytes.len();
    while end > 0 && is_whitespace(bytes[end - 1]) {
        end -= 1;
    }
    &s[..end]
}
