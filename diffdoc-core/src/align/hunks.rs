//! Grouping of an edit script into unified-diff style hunks.

use crate::types::{EditOp, OpKind};

/// Split `ops` into hunks keeping `context` unchanged lines around each change.
///
/// Unchanged runs longer than `2 * context` end the current hunk. Input with
/// no changes yields no hunks.
pub fn group_hunks(ops: &[EditOp], context: usize) -> Vec<Vec<EditOp>> {
    if !ops.iter().any(EditOp::is_change) {
        return Vec::new();
    }

    let mut ops = ops.to_vec();
    if let Some(first) = ops.first_mut().filter(|op| op.kind == OpKind::Equal) {
        first.old_range.start = first.old_range.start.max(first.old_range.end.saturating_sub(context));
        first.new_range.start = first.new_range.start.max(first.new_range.end.saturating_sub(context));
    }
    if let Some(last) = ops.last_mut().filter(|op| op.kind == OpKind::Equal) {
        last.old_range.end = last.old_range.end.min(last.old_range.start + context);
        last.new_range.end = last.new_range.end.min(last.new_range.start + context);
    }

    let mut hunks = Vec::new();
    let mut current: Vec<EditOp> = Vec::new();
    for mut op in ops {
        if op.kind == OpKind::Equal && op.old_range.len() > 2 * context {
            let head = EditOp::equal(
                op.old_range.start..op.old_range.end.min(op.old_range.start + context),
                op.new_range.start..op.new_range.end.min(op.new_range.start + context),
            );
            current.push(head);
            hunks.push(std::mem::take(&mut current));
            op.old_range.start = op.old_range.start.max(op.old_range.end - context);
            op.new_range.start = op.new_range.start.max(op.new_range.end - context);
        }
        current.push(op);
    }
    if !(current.len() == 1 && current[0].kind == OpKind::Equal) && !current.is_empty() {
        hunks.push(current);
    }

    // A zero-context split can leave hunks made only of empty equal ranges.
    hunks.retain(|hunk| hunk.iter().any(EditOp::is_change));
    hunks
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ranges(hunk: &[EditOp]) -> Vec<(OpKind, std::ops::Range<usize>, std::ops::Range<usize>)> {
        hunk.iter()
            .map(|op| (op.kind, op.old_range.clone(), op.new_range.clone()))
            .collect()
    }

    #[test]
    fn test_no_changes_no_hunks() {
        assert!(group_hunks(&[EditOp::equal(0..10, 0..10)], 3).is_empty());
        assert!(group_hunks(&[], 3).is_empty());
    }

    #[test]
    fn test_single_change_trims_context() {
        let ops = vec![
            EditOp::equal(0..10, 0..10),
            EditOp::replace(10..11, 10..11),
            EditOp::equal(11..20, 11..20),
        ];
        let hunks = group_hunks(&ops, 3);
        assert_eq!(hunks.len(), 1);
        assert_eq!(
            ranges(&hunks[0]),
            vec![
                (OpKind::Equal, 7..10, 7..10),
                (OpKind::Replace, 10..11, 10..11),
                (OpKind::Equal, 11..14, 11..14),
            ]
        );
    }

    #[test]
    fn test_distant_changes_split() {
        let ops = vec![
            EditOp::delete(0..1, 0),
            EditOp::equal(1..20, 0..19),
            EditOp::insert(20, 19..20),
        ];
        let hunks = group_hunks(&ops, 2);
        assert_eq!(hunks.len(), 2);
        assert_eq!(
            ranges(&hunks[0]),
            vec![(OpKind::Delete, 0..1, 0..0), (OpKind::Equal, 1..3, 0..2)]
        );
        assert_eq!(
            ranges(&hunks[1]),
            vec![(OpKind::Equal, 18..20, 17..19), (OpKind::Insert, 20..20, 19..20)]
        );
    }

    #[test]
    fn test_close_changes_share_hunk() {
        let ops = vec![
            EditOp::replace(0..1, 0..1),
            EditOp::equal(1..5, 1..5),
            EditOp::replace(5..6, 5..6),
        ];
        let hunks = group_hunks(&ops, 3);
        assert_eq!(hunks.len(), 1);
        assert_eq!(hunks[0].len(), 3);
    }

    #[test]
    fn test_zero_context() {
        let ops = vec![
            EditOp::equal(0..2, 0..2),
            EditOp::replace(2..3, 2..3),
            EditOp::equal(3..5, 3..5),
        ];
        let hunks = group_hunks(&ops, 0);
        assert_eq!(hunks.len(), 1);
        assert!(hunks[0].iter().any(|op| op.kind == OpKind::Replace));
    }
}
