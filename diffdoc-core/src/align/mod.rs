//! Line alignment engine.
//!
//! Computes an edit script between two line sequences as a list of
//! [`EditOp`]s that partitions both sequences in document order.
//!
//! # Algorithms
//!
//! - **Heuristic** (default): longest-matching-block recursion with optional
//!   autojunk, see [`matcher`]. Not guaranteed minimal, but stable on large
//!   inputs with many repeated lines.
//! - **Myers** / **Patience**: provided by the `similar` crate.
//!
//! Lines compare by exact string equality; whitespace is significant.

pub mod hunks;
pub mod matcher;

use std::str::FromStr;

use serde::Serialize;
use similar::{capture_diff_slices, DiffTag};

use crate::error::EngineError;
use crate::types::{EditOp, OpKind};

pub use hunks::group_hunks;
pub use matcher::{MatchBlock, SequenceMatcher};

/// Alignment algorithm selection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    #[default]
    Heuristic,
    Myers,
    Patience,
}

impl Algorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            Algorithm::Heuristic => "heuristic",
            Algorithm::Myers => "myers",
            Algorithm::Patience => "patience",
        }
    }
}

impl FromStr for Algorithm {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "heuristic" | "difflib" | "sequence-matcher" => Ok(Algorithm::Heuristic),
            "myers" => Ok(Algorithm::Myers),
            "patience" => Ok(Algorithm::Patience),
            _ => Err(EngineError::UnknownAlgorithm {
                name: s.to_string(),
            }),
        }
    }
}

/// Alignment settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct AlignOptions {
    pub algorithm: Algorithm,
    /// Junk popular lines in long inputs (heuristic algorithm only).
    pub autojunk: bool,
}

impl Default for AlignOptions {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::Heuristic,
            autojunk: true,
        }
    }
}

/// Align `old` against `new` with default options.
pub fn align<T: AsRef<str>>(old: &[T], new: &[T]) -> Vec<EditOp> {
    align_with(old, new, AlignOptions::default())
}

/// Align `old` against `new`.
pub fn align_with<T: AsRef<str>>(old: &[T], new: &[T], options: AlignOptions) -> Vec<EditOp> {
    match (old.is_empty(), new.is_empty()) {
        (true, true) => return Vec::new(),
        (true, false) => return vec![EditOp::insert(0, 0..new.len())],
        (false, true) => return vec![EditOp::delete(0..old.len(), 0)],
        (false, false) => {}
    }

    let ops = match options.algorithm {
        Algorithm::Heuristic => SequenceMatcher::new(old, new, options.autojunk).opcodes(),
        Algorithm::Myers => similar_ops(similar::Algorithm::Myers, old, new),
        Algorithm::Patience => similar_ops(similar::Algorithm::Patience, old, new),
    };
    debug_assert!(is_partition(&ops, old.len(), new.len()));
    ops
}

fn similar_ops<T: AsRef<str>>(algorithm: similar::Algorithm, old: &[T], new: &[T]) -> Vec<EditOp> {
    let old: Vec<&str> = old.iter().map(AsRef::as_ref).collect();
    let new: Vec<&str> = new.iter().map(AsRef::as_ref).collect();

    // `similar` reports the empty side of a delete or insert at an index
    // that may lie past the following equal run, so ranges are rebuilt from
    // running cursors and only the lengths are taken from its ops.
    let (mut i, mut j) = (0, 0);
    let ops = capture_diff_slices(algorithm, &old, &new)
        .into_iter()
        .map(|op| {
            let (tag, old_range, new_range) = op.as_tag_tuple();
            let (kind, old_n, new_n) = match tag {
                DiffTag::Equal => (OpKind::Equal, old_range.len(), old_range.len()),
                DiffTag::Delete => (OpKind::Delete, old_range.len(), 0),
                DiffTag::Insert => (OpKind::Insert, 0, new_range.len()),
                DiffTag::Replace => (OpKind::Replace, old_range.len(), new_range.len()),
            };
            let op = EditOp::new(kind, i..i + old_n, j..j + new_n);
            i += old_n;
            j += new_n;
            op
        })
        .collect::<Vec<_>>();
    coalesce(ops)
}

/// Merge adjacent ops of the same kind, and neighbouring deletes and inserts
/// into a replace.
fn coalesce(ops: impl IntoIterator<Item = EditOp>) -> Vec<EditOp> {
    let mut out: Vec<EditOp> = Vec::new();
    for op in ops {
        if op.old_range.is_empty() && op.new_range.is_empty() {
            continue;
        }
        if let Some(last) = out.last_mut() {
            let contiguous =
                last.old_range.end == op.old_range.start && last.new_range.end == op.new_range.start;
            let merged_kind = match (last.kind, op.kind) {
                (a, b) if a == b => Some(a),
                (OpKind::Delete, OpKind::Insert)
                | (OpKind::Insert, OpKind::Delete)
                | (OpKind::Replace, OpKind::Insert)
                | (OpKind::Replace, OpKind::Delete) => Some(OpKind::Replace),
                _ => None,
            };
            if let (true, Some(kind)) = (contiguous, merged_kind) {
                last.kind = kind;
                last.old_range.end = op.old_range.end;
                last.new_range.end = op.new_range.end;
                continue;
            }
        }
        out.push(op);
    }
    out
}

/// Whether `ops` partitions `[0, old_len)` and `[0, new_len)` in order.
pub fn is_partition(ops: &[EditOp], old_len: usize, new_len: usize) -> bool {
    let (mut i, mut j) = (0, 0);
    for op in ops {
        if op.old_range.start != i || op.new_range.start != j {
            return false;
        }
        let (old_n, new_n) = (op.old_range.len(), op.new_range.len());
        let shape_ok = match op.kind {
            OpKind::Equal => old_n == new_n && old_n > 0,
            OpKind::Replace => old_n > 0 && new_n > 0,
            OpKind::Delete => old_n > 0 && new_n == 0,
            OpKind::Insert => old_n == 0 && new_n > 0,
        };
        if !shape_ok {
            return false;
        }
        i = op.old_range.end;
        j = op.new_range.end;
    }
    i == old_len && j == new_len
}
