//! Data model shared by every stage of the diff pipeline.
//!
//! Stages hand these values forward: the classifier yields a [`ContentKind`],
//! alignment yields [`EditOp`]s, projection yields [`DiffRow`]s and styling
//! yields [`StyledSpan`]s. [`ArtifactDiff`] is what a renderer receives.

use serde::{Serialize, Serializer};
use std::ops::Range;

/// Placeholder text for a span that would otherwise be empty.
pub const EMPTY_PLACEHOLDER: &str = "\u{a0}";

/// Two versions of one artifact, as supplied by a version source.
///
/// An empty buffer means the artifact did not exist at that revision.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ArtifactPair {
    pub path: String,
    pub old_bytes: Vec<u8>,
    pub new_bytes: Vec<u8>,
}

impl ArtifactPair {
    pub fn new(path: impl Into<String>, old_bytes: Vec<u8>, new_bytes: Vec<u8>) -> Self {
        Self {
            path: path.into(),
            old_bytes,
            new_bytes,
        }
    }

    /// Whether the two versions differ at the byte level.
    pub fn is_changed(&self) -> bool {
        self.old_bytes != self.new_bytes
    }
}

/// Content classification of an artifact pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Text,
    Binary,
    Image,
}

impl ContentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Text => "text",
            ContentKind::Binary => "binary",
            ContentKind::Image => "image",
        }
    }
}

/// Kind of an aligned segment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OpKind {
    Equal,
    Replace,
    Delete,
    Insert,
}

impl OpKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OpKind::Equal => "equal",
            OpKind::Replace => "replace",
            OpKind::Delete => "delete",
            OpKind::Insert => "insert",
        }
    }
}

/// One aligned segment of an edit script.
///
/// Ranges are half-open indices into the old and new line sequences.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct EditOp {
    pub kind: OpKind,
    pub old_range: Range<usize>,
    pub new_range: Range<usize>,
}

impl EditOp {
    pub fn new(kind: OpKind, old_range: Range<usize>, new_range: Range<usize>) -> Self {
        Self {
            kind,
            old_range,
            new_range,
        }
    }

    pub fn equal(old_range: Range<usize>, new_range: Range<usize>) -> Self {
        Self::new(OpKind::Equal, old_range, new_range)
    }

    pub fn replace(old_range: Range<usize>, new_range: Range<usize>) -> Self {
        Self::new(OpKind::Replace, old_range, new_range)
    }

    pub fn delete(old_range: Range<usize>, at_new: usize) -> Self {
        Self::new(OpKind::Delete, old_range, at_new..at_new)
    }

    pub fn insert(at_old: usize, new_range: Range<usize>) -> Self {
        Self::new(OpKind::Insert, at_old..at_old, new_range)
    }

    pub fn is_change(&self) -> bool {
        self.kind != OpKind::Equal
    }
}

/// Change kind of a rendered row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Context,
    Added,
    Removed,
}

impl ChangeKind {
    /// Symbol shown in front of the row text.
    pub fn symbol(&self) -> char {
        match self {
            ChangeKind::Context => ' ',
            ChangeKind::Added => '+',
            ChangeKind::Removed => '-',
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeKind::Context => "context",
            ChangeKind::Added => "added",
            ChangeKind::Removed => "removed",
        }
    }
}

/// One render-ready line.
///
/// `line_number` is 1-based and counts in the new version for context and
/// added rows, in the old version for removed rows.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DiffRow {
    pub change_kind: ChangeKind,
    pub text: String,
    pub line_number: usize,
}

impl DiffRow {
    pub fn new(change_kind: ChangeKind, text: impl Into<String>, line_number: usize) -> Self {
        Self {
            change_kind,
            text: text.into(),
            line_number,
        }
    }
}

/// 24-bit colour.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `RRGGBB` or `#RRGGBB`.
    pub fn from_hex(s: &str) -> Option<Self> {
        let hex = s.strip_prefix('#').unwrap_or(s);
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

/// A token of row text with its resolved visual attributes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StyledSpan {
    pub text: String,
    pub token_category: String,
    pub bold: bool,
    pub italic: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Rgb>,
}

/// A row together with its styled token breakdown.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StyledRow {
    #[serde(flatten)]
    pub row: DiffRow,
    pub spans: Vec<StyledSpan>,
}

/// A contiguous group of rows, with the line ranges it covers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Hunk {
    pub old_range: Range<usize>,
    pub new_range: Range<usize>,
    pub rows: Vec<StyledRow>,
}

impl Hunk {
    /// Unified-diff style header, e.g. `@@ -3,7 +3,8 @@`.
    pub fn header(&self) -> String {
        format!(
            "@@ -{} +{} @@",
            format_range(&self.old_range),
            format_range(&self.new_range)
        )
    }
}

/// Mirrors the range notation of unified diffs: a one-line range omits the
/// length and an empty range points at the line before it.
fn format_range(range: &Range<usize>) -> String {
    let len = range.end - range.start;
    let start = if len == 0 { range.start } else { range.start + 1 };
    if len == 1 {
        format!("{}", start)
    } else {
        format!("{},{}", start, len)
    }
}

/// Per-artifact result of the pipeline.
#[derive(Clone, Debug, Serialize)]
pub struct ArtifactDiff {
    pub path: String,
    pub kind: ContentKind,
    #[serde(flatten)]
    pub body: DiffBody,
}

impl ArtifactDiff {
    /// Whether a renderer has anything to show besides "no significant changes".
    pub fn has_changes(&self) -> bool {
        match &self.body {
            DiffBody::Text(text) => text.ops.iter().any(EditOp::is_change),
            DiffBody::Binary { changed } => *changed,
            DiffBody::Image(image) => image.changed,
        }
    }
}

/// Kind-specific payload of an [`ArtifactDiff`].
#[derive(Clone, Debug, Serialize)]
#[serde(untagged)]
pub enum DiffBody {
    Text(TextDiff),
    Binary { changed: bool },
    Image(ImageChange),
}

/// Aligned and styled text content.
#[derive(Clone, Debug, Default, Serialize)]
pub struct TextDiff {
    /// Name of the lexer used for styling.
    pub lexer: String,
    pub ops: Vec<EditOp>,
    pub hunks: Vec<Hunk>,
}

impl TextDiff {
    /// All rows across hunks, in order.
    pub fn rows(&self) -> impl Iterator<Item = &StyledRow> {
        self.hunks.iter().flat_map(|h| h.rows.iter())
    }
}

/// What a renderer needs to lay out a changed image.
#[derive(Clone, Debug, Serialize)]
pub struct ImageChange {
    pub changed: bool,
    #[serde(skip)]
    pub new_bytes: Vec<u8>,
    pub size_bytes: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb_from_hex() {
        assert_eq!(Rgb::from_hex("#FF8000"), Some(Rgb::new(255, 128, 0)));
        assert_eq!(Rgb::from_hex("d0ffd0"), Some(Rgb::new(0xD0, 0xFF, 0xD0)));
        assert_eq!(Rgb::from_hex("#FFF"), None);
        assert_eq!(Rgb::from_hex("#GG0000"), None);
        assert_eq!(Rgb::from_hex("#ééé"), None);
    }

    #[test]
    fn test_rgb_serializes_as_hex() {
        let json = serde_json::to_string(&Rgb::new(1, 2, 255)).unwrap();
        assert_eq!(json, "\"#0102FF\"");
    }

    #[test]
    fn test_hunk_header() {
        let hunk = Hunk {
            old_range: 2..9,
            new_range: 2..10,
            rows: vec![],
        };
        assert_eq!(hunk.header(), "@@ -3,7 +3,8 @@");

        let hunk = Hunk {
            old_range: 0..0,
            new_range: 0..1,
            rows: vec![],
        };
        assert_eq!(hunk.header(), "@@ -0,0 +1 @@");
    }

    #[test]
    fn test_change_kind_symbols() {
        assert_eq!(ChangeKind::Added.symbol(), '+');
        assert_eq!(ChangeKind::Removed.symbol(), '-');
        assert_eq!(ChangeKind::Context.symbol(), ' ');
    }

    #[test]
    fn test_pair_is_changed() {
        assert!(!ArtifactPair::new("a", b"x".to_vec(), b"x".to_vec()).is_changed());
        assert!(ArtifactPair::new("a", vec![], b"x".to_vec()).is_changed());
    }
}
