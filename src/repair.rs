use crate::classify::{closer_for, is_literal_byte, is_opener, is_whitespace};
use memchr::memchr2;
use serde_json::Value;

/// One repair action taken while closing a truncated prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepairLogEntry {
    pub position: usize,
    pub message: &'static str,
    pub context: String,
}

struct Logger {
    enable: bool,
    window: usize,
    entries: Vec<RepairLogEntry>,
}

impl Logger {
    fn new(enable: bool, window: usize) -> Self {
        Self {
            enable: enable && cfg!(feature = "logging"),
            window,
            entries: Vec::new(),
        }
    }

    #[inline]
    fn log(&mut self, text: &str, position: usize, message: &'static str) {
        if self.enable {
            self.entries.push(RepairLogEntry {
                position,
                message,
                context: context_snippet(text, position, self.window),
            });
        }
    }
}

fn context_snippet(text: &str, position: usize, window: usize) -> String {
    let mut start = position.saturating_sub(window);
    while start > 0 && !text.is_char_boundary(start) {
        start -= 1;
    }
    let mut end = (position + window).min(text.len());
    while end < text.len() && !text.is_char_boundary(end) {
        end += 1;
    }
    text[start..end].to_string()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Expect {
    KeyOrEnd,
    Key,
    Colon,
    ValueOrEnd,
    Value,
    CommaOrEnd,
}

#[derive(Clone, Copy, Debug)]
struct Frame {
    opener: u8,
    expect: Expect,
}

impl Frame {
    fn is_object(&self) -> bool {
        self.opener == b'{'
    }

    fn wants_value(&self) -> bool {
        matches!(self.expect, Expect::Value | Expect::ValueOrEnd)
    }

    fn wants_key(&self) -> bool {
        matches!(self.expect, Expect::Key | Expect::KeyOrEnd)
    }
}

#[derive(Clone, Copy, Debug)]
enum Pending {
    Nothing,
    Str { start: usize, is_key: bool },
    Literal { start: usize },
}

/// Close a truncated prefix of a well-formed object serialization.
///
/// Returns `None` when `text` is empty, does not start an object, or is not a
/// prefix this scanner understands. The input is never modified; the repaired
/// text is a fresh copy.
pub fn repair_prefix(text: &str) -> Option<String> {
    let mut logger = Logger::new(false, 0);
    repair_impl(text, &mut logger)
}

/// Like [`repair_prefix`], also returning the repair actions taken.
pub fn repair_prefix_with_log(
    text: &str,
    context_window: usize,
) -> Option<(String, Vec<RepairLogEntry>)> {
    let mut logger = Logger::new(true, context_window);
    let out = repair_impl(text, &mut logger)?;
    Some((out, logger.entries))
}

/// Repair `text` and parse the result, keeping it only if it is an object.
pub fn parse_partial(text: &str) -> Option<Value> {
    let repaired = repair_prefix(text)?;
    into_object(&repaired)
}

pub(crate) fn into_object(text: &str) -> Option<Value> {
    match serde_json::from_str::<Value>(text) {
        Ok(v @ Value::Object(_)) => Some(v),
        _ => None,
    }
}

fn repair_impl(text: &str, logger: &mut Logger) -> Option<String> {
    let bytes = text.as_bytes();
    let len = bytes.len();
    let mut i = 0;
    while i < len && is_whitespace(bytes[i]) {
        i += 1;
    }
    if i == len || bytes[i] != b'{' {
        return None;
    }

    let mut stack: Vec<Frame> = Vec::new();
    // End of the longest prefix that is well-formed once the open stack is closed.
    let mut safe = i;
    let mut pending = Pending::Nothing;
    let mut closed_root = false;

    while i < len {
        match pending {
            Pending::Str { is_key, .. } => {
                let Some(p) = memchr2(b'"', b'\\', &bytes[i..]) else {
                    i = len;
                    break;
                };
                let j = i + p;
                if bytes[j] == b'\\' {
                    // escape covers exactly the next byte
                    i = j + 2;
                    continue;
                }
                i = j + 1;
                pending = Pending::Nothing;
                let frame = stack.last_mut()?;
                if is_key {
                    frame.expect = Expect::Colon;
                } else {
                    frame.expect = Expect::CommaOrEnd;
                    safe = i;
                }
                continue;
            }
            Pending::Literal { .. } => {
                if is_literal_byte(bytes[i]) {
                    i += 1;
                    continue;
                }
                pending = Pending::Nothing;
                stack.last_mut()?.expect = Expect::CommaOrEnd;
                safe = i;
                // fall through and handle the delimiter at `i`
            }
            Pending::Nothing => {}
        }

        let b = bytes[i];
        if closed_root {
            if !is_whitespace(b) {
                return None;
            }
            i += 1;
            continue;
        }
        match b {
            _ if is_whitespace(b) => {}
            _ if is_opener(b) => {
                if let Some(frame) = stack.last() {
                    if !frame.wants_value() {
                        return None;
                    }
                } else if b != b'{' {
                    return None;
                }
                let expect = if b == b'{' {
                    Expect::KeyOrEnd
                } else {
                    Expect::ValueOrEnd
                };
                stack.push(Frame { opener: b, expect });
                safe = i + 1;
            }
            b'}' | b']' => {
                let frame = stack.pop()?;
                let may_close = match frame.expect {
                    Expect::CommaOrEnd => true,
                    Expect::KeyOrEnd => frame.is_object(),
                    Expect::ValueOrEnd => !frame.is_object(),
                    _ => false,
                };
                if closer_for(frame.opener) != b || !may_close {
                    return None;
                }
                match stack.last_mut() {
                    Some(parent) => parent.expect = Expect::CommaOrEnd,
                    None => closed_root = true,
                }
                safe = i + 1;
            }
            b',' => {
                let frame = stack.last_mut()?;
                if frame.expect != Expect::CommaOrEnd {
                    return None;
                }
                frame.expect = if frame.is_object() {
                    Expect::Key
                } else {
                    Expect::Value
                };
            }
            b':' => {
                let frame = stack.last_mut()?;
                if frame.expect != Expect::Colon {
                    return None;
                }
                frame.expect = Expect::Value;
            }
            b'"' => {
                let frame = stack.last()?;
                let is_key = if frame.is_object() && frame.wants_key() {
                    true
                } else if frame.wants_value() {
                    false
                } else {
                    return None;
                };
                pending = Pending::Str { start: i, is_key };
            }
            _ if is_literal_byte(b) => {
                if !stack.last()?.wants_value() {
                    return None;
                }
                pending = Pending::Literal { start: i };
            }
            _ => return None,
        }
        i += 1;
    }

    if closed_root {
        return Some(text[..safe].to_string());
    }

    match pending {
        Pending::Str { start, is_key: true } => logger.log(text, start, "dropped dangling key"),
        Pending::Str { start, is_key: false } => {
            logger.log(text, start, "dropped unterminated string value")
        }
        Pending::Literal { start } => logger.log(text, start, "dropped incomplete literal"),
        Pending::Nothing => {}
    }
    if let Some(frame) = stack.last() {
        match frame.expect {
            Expect::Colon => logger.log(text, safe, "dropped dangling key"),
            Expect::Value if frame.is_object() => logger.log(text, safe, "dropped dangling key"),
            Expect::Key | Expect::Value => logger.log(text, safe, "dropped trailing comma"),
            _ => {}
        }
    }

    let mut out = String::with_capacity(safe + stack.len());
    out.push_str(&text[..safe]);
    for frame in stack.iter().rev() {
        out.push(closer_for(frame.opener) as char);
    }
    if !stack.is_empty() {
        logger.log(text, len, "closed open delimiters");
    }
    Some(out)
}
