//! Row projection: flattens an edit script into render-ready rows.

use crate::types::{ChangeKind, DiffRow, EditOp, OpKind};

/// Project `ops` over `old` / `new` into rows, in op order.
///
/// Equal ops yield context rows taken from `new`; replace ops yield all of
/// their removed rows before their added rows. Line numbers come from two
/// counters, one per version, seeded from the first op's range starts and
/// advanced once per line consumed from that version. A full edit script
/// therefore numbers from 1, and a single hunk numbers from its own start.
pub fn project<T: AsRef<str>>(old: &[T], new: &[T], ops: &[EditOp]) -> Vec<DiffRow> {
    let Some(first) = ops.first() else {
        return Vec::new();
    };
    let capacity = ops
        .iter()
        .map(|op| match op.kind {
            OpKind::Equal => op.new_range.len(),
            _ => op.old_range.len() + op.new_range.len(),
        })
        .sum();

    let mut rows = Vec::with_capacity(capacity);
    let mut counters = Counters {
        old: first.old_range.start,
        new: first.new_range.start,
    };

    for op in ops {
        match op.kind {
            OpKind::Equal => {
                for line in &new[op.new_range.clone()] {
                    let number = counters.next_new();
                    counters.old += 1;
                    rows.push(DiffRow::new(ChangeKind::Context, line.as_ref(), number));
                }
            }
            OpKind::Replace | OpKind::Delete | OpKind::Insert => {
                for line in &old[op.old_range.clone()] {
                    rows.push(DiffRow::new(ChangeKind::Removed, line.as_ref(), counters.next_old()));
                }
                for line in &new[op.new_range.clone()] {
                    rows.push(DiffRow::new(ChangeKind::Added, line.as_ref(), counters.next_new()));
                }
            }
        }
    }

    rows
}

/// 0-based positions of the next unconsumed line in each version.
struct Counters {
    old: usize,
    new: usize,
}

impl Counters {
    fn next_old(&mut self) -> usize {
        self.old += 1;
        self.old
    }

    fn next_new(&mut self) -> usize {
        self.new += 1;
        self.new
    }
}
