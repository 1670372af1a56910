//! Inline JSON validation for the CMS editor.

use serde_json::Value;
use std::fmt;
use std::ops::Range;

/// Where and why a document failed to parse. `line` and `column` are 1-based;
/// `offset` is the byte offset of the reported position.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JsonDiagnostic {
    pub line: usize,
    pub column: usize,
    pub offset: usize,
    pub message: String,
}

impl fmt::Display for JsonDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Line {}: {}", self.line, self.message)
    }
}

impl std::error::Error for JsonDiagnostic {}

pub fn check_json(text: &str) -> Result<Value, JsonDiagnostic> {
    serde_json::from_str(text).map_err(|e| diagnose(text, &e))
}

fn diagnose(text: &str, err: &serde_json::Error) -> JsonDiagnostic {
    let full = err.to_string();
    let message = match full.rsplit_once(" at line ") {
        Some((msg, _)) => msg.to_owned(),
        None => full,
    };
    let offset = offset_of(text, err.line(), err.column());
    JsonDiagnostic {
        line: line_at_offset(text, offset),
        column: err.column(),
        offset,
        message,
    }
}

/// Byte offset of a 1-based line/column pair, clamped to the text.
pub fn offset_of(text: &str, line: usize, column: usize) -> usize {
    let line_start: usize = text
        .split_inclusive('\n')
        .take(line.saturating_sub(1))
        .map(str::len)
        .sum();
    let rest = &text[line_start.min(text.len())..];
    let line_len = rest.find('\n').unwrap_or(rest.len());
    // serde_json columns point at the offending character
    let col = column.saturating_sub(1).min(line_len);
    let mut offset = (line_start + col).min(text.len());
    while !text.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}

/// 1-based line containing byte `offset`.
pub fn line_at_offset(text: &str, offset: usize) -> usize {
    let end = offset.min(text.len());
    text.as_bytes()[..end].iter().filter(|&&b| b == b'\n').count() + 1
}

/// Byte range of the 1-based `line`, without its newline.
pub fn line_span(text: &str, line: usize) -> Range<usize> {
    let mut start = 0;
    for (i, l) in text.split_inclusive('\n').enumerate() {
        if i + 1 == line {
            let body = l.strip_suffix('\n').unwrap_or(l);
            let body = body.strip_suffix('\r').unwrap_or(body);
            return start..start + body.len();
        }
        start += l.len();
    }
    text.len()..text.len()
}

/// Convert a byte offset into the UTF-16 index the DOM selection APIs use.
pub fn utf16_index(text: &str, byte_offset: usize) -> u32 {
    let mut end = byte_offset.min(text.len());
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    text[..end].encode_utf16().count() as u32
}
