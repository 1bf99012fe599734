//! Lossy decoding of byte buffers into line sequences.
//!
//! Decoding never fails: malformed input is replaced with U+FFFD. Lines are
//! split on the same boundaries as universal-newline text mode, so `\r\n`
//! counts once and a trailing terminator does not add an empty line.

use encoding_rs::Encoding;
use serde::{Serialize, Serializer};

use crate::error::{EngineError, Result};

/// Text encoding used to decode artifact bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TextEncoding(&'static Encoding);

impl TextEncoding {
    pub const UTF_8: TextEncoding = TextEncoding(encoding_rs::UTF_8);

    /// Resolve a WHATWG encoding label such as `utf-8`, `latin1` or `windows-1251`.
    pub fn from_label(label: &str) -> Result<Self> {
        Encoding::for_label(label.trim().as_bytes())
            .map(TextEncoding)
            .ok_or_else(|| EngineError::UnknownEncoding {
                label: label.to_string(),
            })
    }

    pub fn name(&self) -> &'static str {
        self.0.name()
    }

    /// Decode `bytes`, replacing malformed sequences. A leading BOM is stripped.
    pub fn decode(&self, bytes: &[u8]) -> String {
        let (text, _, had_errors) = self.0.decode(bytes);
        if had_errors {
            tracing::debug!(encoding = self.name(), "replaced malformed input while decoding");
        }
        text.into_owned()
    }

    /// Decode `bytes` and split them into lines.
    pub fn decode_lines(&self, bytes: &[u8]) -> Vec<String> {
        if bytes.is_empty() {
            return Vec::new();
        }
        let capacity = bytecount::count(bytes, b'\n') + 1;
        let text = self.decode(bytes);
        let mut lines = Vec::with_capacity(capacity);
        lines.extend(split_lines(&text).map(str::to_string));
        lines
    }
}

impl Default for TextEncoding {
    fn default() -> Self {
        Self::UTF_8
    }
}

impl Serialize for TextEncoding {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

fn is_line_boundary(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r'
            | '\u{0b}'
            | '\u{0c}'
            | '\u{1c}'
            | '\u{1d}'
            | '\u{1e}'
            | '\u{85}'
            | '\u{2028}'
            | '\u{2029}'
    )
}

/// Split `text` into lines without their terminators.
pub fn split_lines(text: &str) -> impl Iterator<Item = &str> {
    let mut rest = text;
    std::iter::from_fn(move || {
        if rest.is_empty() {
            return None;
        }
        match rest.char_indices().find(|&(_, c)| is_line_boundary(c)) {
            Some((idx, c)) => {
                let line = &rest[..idx];
                let mut next = idx + c.len_utf8();
                if c == '\r' && rest[next..].starts_with('\n') {
                    next += 1;
                }
                rest = &rest[next..];
                Some(line)
            }
            None => {
                let line = rest;
                rest = "";
                Some(line)
            }
        }
    })
}
