//! Longest-matching-block sequence alignment.
//!
//! The new sequence is indexed by line. Within a window the longest block of
//! identical lines is found, then the windows on either side of it are
//! searched the same way. Adjacent blocks are merged and the gaps between
//! them become replace/delete/insert opcodes.
//!
//! With autojunk enabled and at least [`AUTOJUNK_MIN_LEN`] new lines, lines
//! occurring in more than 1% of the new sequence (plus one) are left out of
//! the index. They can still join a match by extending an existing block, but
//! never seed one. This keeps blank lines and braces from dominating the
//! alignment of large files.

use std::collections::HashMap;

use crate::types::EditOp;

/// Minimum new-sequence length at which popular lines are junked.
pub const AUTOJUNK_MIN_LEN: usize = 200;

/// A run of `len` identical lines at `old_start` / `new_start`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct MatchBlock {
    pub old_start: usize,
    pub new_start: usize,
    pub len: usize,
}

/// Aligns two line sequences.
pub struct SequenceMatcher<'a, T: AsRef<str>> {
    old: &'a [T],
    new: &'a [T],
    /// Positions in `new` of every non-popular line, ascending.
    new_index: HashMap<&'a str, Vec<usize>>,
}

impl<'a, T: AsRef<str>> SequenceMatcher<'a, T> {
    pub fn new(old: &'a [T], new: &'a [T], autojunk: bool) -> Self {
        let mut new_index: HashMap<&'a str, Vec<usize>> = HashMap::new();
        for (j, line) in new.iter().enumerate() {
            new_index.entry(line.as_ref()).or_default().push(j);
        }

        if autojunk && new.len() >= AUTOJUNK_MIN_LEN {
            let threshold = new.len() / 100 + 1;
            let before = new_index.len();
            new_index.retain(|_, positions| positions.len() <= threshold);
            let junked = before - new_index.len();
            if junked > 0 {
                tracing::trace!(junked, threshold, "dropped popular lines from index");
            }
        }

        Self {
            old,
            new,
            new_index,
        }
    }

    fn old_line(&self, i: usize) -> &str {
        self.old[i].as_ref()
    }

    fn new_line(&self, j: usize) -> &str {
        self.new[j].as_ref()
    }

    /// Longest block of identical lines in `old[alo..ahi]` and `new[blo..bhi]`.
    ///
    /// Ties go to the block starting earliest in `old`, then earliest in `new`.
    pub fn find_longest_match(&self, alo: usize, ahi: usize, blo: usize, bhi: usize) -> MatchBlock {
        let mut best = MatchBlock {
            old_start: alo,
            new_start: blo,
            len: 0,
        };

        // Length of the match ending at new index j, for the previous old line.
        let mut run_lengths: HashMap<usize, usize> = HashMap::new();
        for i in alo..ahi {
            let mut next_runs: HashMap<usize, usize> = HashMap::new();
            if let Some(positions) = self.new_index.get(self.old_line(i)) {
                for &j in positions {
                    if j < blo {
                        continue;
                    }
                    if j >= bhi {
                        break;
                    }
                    let k = j
                        .checked_sub(1)
                        .and_then(|prev| run_lengths.get(&prev))
                        .copied()
                        .unwrap_or(0)
                        + 1;
                    next_runs.insert(j, k);
                    if k > best.len {
                        best = MatchBlock {
                            old_start: i + 1 - k,
                            new_start: j + 1 - k,
                            len: k,
                        };
                    }
                }
            }
            run_lengths = next_runs;
        }

        // Popular lines never seed a match; let them extend one on either side.
        while best.old_start > alo
            && best.new_start > blo
            && self.old_line(best.old_start - 1) == self.new_line(best.new_start - 1)
        {
            best.old_start -= 1;
            best.new_start -= 1;
            best.len += 1;
        }
        while best.old_start + best.len < ahi
            && best.new_start + best.len < bhi
            && self.old_line(best.old_start + best.len) == self.new_line(best.new_start + best.len)
        {
            best.len += 1;
        }

        best
    }

    /// All matching blocks in document order, adjacent blocks merged, ending
    /// with a zero-length sentinel at `(len(old), len(new))`.
    pub fn matching_blocks(&self) -> Vec<MatchBlock> {
        let mut queue = vec![(0, self.old.len(), 0, self.new.len())];
        let mut blocks = Vec::new();

        while let Some((alo, ahi, blo, bhi)) = queue.pop() {
            let m = self.find_longest_match(alo, ahi, blo, bhi);
            if m.len == 0 {
                continue;
            }
            if alo < m.old_start && blo < m.new_start {
                queue.push((alo, m.old_start, blo, m.new_start));
            }
            if m.old_start + m.len < ahi && m.new_start + m.len < bhi {
                queue.push((m.old_start + m.len, ahi, m.new_start + m.len, bhi));
            }
            blocks.push(m);
        }
        blocks.sort_unstable();

        let mut merged: Vec<MatchBlock> = Vec::with_capacity(blocks.len() + 1);
        for block in blocks {
            match merged.last_mut() {
                Some(last)
                    if last.old_start + last.len == block.old_start
                        && last.new_start + last.len == block.new_start =>
                {
                    last.len += block.len;
                }
                _ => merged.push(block),
            }
        }
        merged.push(MatchBlock {
            old_start: self.old.len(),
            new_start: self.new.len(),
            len: 0,
        });
        merged
    }

    /// Opcodes turning `old` into `new`, in document order.
    pub fn opcodes(&self) -> Vec<EditOp> {
        let mut ops = Vec::new();
        let (mut i, mut j) = (0, 0);

        for block in self.matching_blocks() {
            let (ai, bj) = (block.old_start, block.new_start);
            if i < ai && j < bj {
                ops.push(EditOp::replace(i..ai, j..bj));
            } else if i < ai {
                ops.push(EditOp::delete(i..ai, j));
            } else if j < bj {
                ops.push(EditOp::insert(i, j..bj));
            }
            i = ai + block.len;
            j = bj + block.len;
            if block.len > 0 {
                ops.push(EditOp::equal(ai..i, bj..j));
            }
        }

        ops
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::OpKind;

    fn lines(s: &[&str]) -> Vec<String> {
        s.iter().map(|l| l.to_string()).collect()
    }

    #[test]
    fn test_find_longest_match_prefers_earliest() {
        let old = lines(&["x", "a", "b", "y", "a", "b"]);
        let new = lines(&["a", "b", "z"]);
        let matcher = SequenceMatcher::new(&old, &new, true);
        let m = matcher.find_longest_match(0, old.len(), 0, new.len());
        assert_eq!(
            m,
            MatchBlock {
                old_start: 1,
                new_start: 0,
                len: 2
            }
        );
    }

    #[test]
    fn test_matching_blocks_sentinel() {
        let old = lines(&["a", "b", "c"]);
        let new = lines(&["a", "x", "c"]);
        let blocks = SequenceMatcher::new(&old, &new, true).matching_blocks();
        assert_eq!(
            blocks,
            vec![
                MatchBlock {
                    old_start: 0,
                    new_start: 0,
                    len: 1
                },
                MatchBlock {
                    old_start: 2,
                    new_start: 2,
                    len: 1
                },
                MatchBlock {
                    old_start: 3,
                    new_start: 3,
                    len: 0
                },
            ]
        );
    }

    #[test]
    fn test_opcodes_classic_example() {
        // qabxcd -> abycdf
        let old = lines(&["q", "a", "b", "x", "c", "d"]);
        let new = lines(&["a", "b", "y", "c", "d", "f"]);
        let ops = SequenceMatcher::new(&old, &new, true).opcodes();
        let kinds: Vec<_> = ops
            .iter()
            .map(|op| (op.kind, op.old_range.clone(), op.new_range.clone()))
            .collect();
        assert_eq!(
            kinds,
            vec![
                (OpKind::Delete, 0..1, 0..0),
                (OpKind::Equal, 1..3, 0..2),
                (OpKind::Replace, 3..4, 2..3),
                (OpKind::Equal, 4..6, 3..5),
                (OpKind::Insert, 6..6, 5..6),
            ]
        );
    }

    #[test]
    fn test_autojunk_popular_lines() {
        // 300 blank lines make "" popular; the distinct lines still align.
        let mut old = vec![String::new(); 300];
        old[150] = "marker".to_string();
        let mut new = old.clone();
        new[10] = "inserted".to_string();

        let ops = SequenceMatcher::new(&old, &new, true).opcodes();
        let changes: Vec<_> = ops.iter().filter(|op| op.is_change()).collect();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].kind, OpKind::Replace);
        assert_eq!(changes[0].old_range, 10..11);
        assert_eq!(changes[0].new_range, 10..11);
    }

    #[test]
    fn test_autojunk_disabled_indexes_everything() {
        let new = vec!["same".to_string(); 250];
        let with_junk = SequenceMatcher::new(&new, &new, true);
        let without_junk = SequenceMatcher::new(&new, &new, false);
        assert!(with_junk.new_index.is_empty());
        assert_eq!(without_junk.new_index.len(), 1);
    }
}
