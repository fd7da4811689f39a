//! Folding a newly-observed transmission record into a parent's existing,
//! canonical list of `(left, right, children)` records.
//!
//! This is the Rust shape of what the legacy Python draft called `Current`
//! (a per-parent accumulator walked by `merge_records`): a list kept in
//! canonical form (sorted by `left`, non-overlapping, adjacent intervals with
//! identical children merged) that a new record is folded into one call at a
//! time, rather than rebuilt from scratch from a big batch. The sweep below
//! reaches the same canonical form by rebuilding against the sorted set of
//! breakpoints contributed by the existing list and the new record, which
//! sidesteps enumerating the five overlap cases by hand.

use crate::error::{RecorderError, Result};
use crate::tsdef::{IdType, Position};

/// One `(left, right, children)` entry in a parent's canonical record list.
/// `children` is always kept sorted ascending and deduplicated.
#[derive(Clone, Debug, PartialEq)]
pub struct MergeRecord {
    pub left: Position,
    pub right: Position,
    pub parent: IdType,
    pub children: Vec<IdType>,
}

impl MergeRecord {
    pub fn new(left: Position, right: Position, parent: IdType, mut children: Vec<IdType>) -> Self {
        children.sort_unstable();
        children.dedup();
        MergeRecord {
            left,
            right,
            parent,
            children,
        }
    }
}

fn union_sorted(a: &[IdType], b: &[IdType]) -> Vec<IdType> {
    let mut out = Vec::with_capacity(a.len() + b.len());
    out.extend_from_slice(a);
    out.extend_from_slice(b);
    out.sort_unstable();
    out.dedup();
    out
}

/// Fold `new_record` into `list`, which must already be in canonical form
/// (see [`MergeRecord`]) and must share `new_record.parent` with every
/// existing entry. On success, `list` is replaced by the new canonical
/// sequence covering the union of the old coverage and
/// `[new_record.left, new_record.right)`.
pub fn merge_record(list: &mut Vec<MergeRecord>, new_record: MergeRecord) -> Result<()> {
    if let Some(existing) = list.first() {
        if existing.parent != new_record.parent {
            return Err(RecorderError::ParentMismatch {
                expected: existing.parent,
                found: new_record.parent,
            });
        }
    }

    let parent = new_record.parent;

    let mut breakpoints: Vec<Position> = Vec::with_capacity(list.len() * 2 + 2);
    for r in list.iter() {
        breakpoints.push(r.left);
        breakpoints.push(r.right);
    }
    breakpoints.push(new_record.left);
    breakpoints.push(new_record.right);
    breakpoints.sort_by(|a, b| a.partial_cmp(b).unwrap());
    breakpoints.dedup();

    let mut merged: Vec<MergeRecord> = Vec::with_capacity(breakpoints.len());
    for w in breakpoints.windows(2) {
        let (a, b) = (w[0], w[1]);

        let existing_children: Option<&[IdType]> = list
            .iter()
            .find(|r| r.left <= a && b <= r.right)
            .map(|r| r.children.as_slice());
        let covered_by_new = new_record.left <= a && b <= new_record.right;

        let children = match (existing_children, covered_by_new) {
            (Some(existing), true) => union_sorted(existing, &new_record.children),
            (Some(existing), false) => existing.to_vec(),
            (None, true) => new_record.children.clone(),
            (None, false) => continue,
        };

        if let Some(last) = merged.last_mut() {
            if last.right == a && last.children == children {
                last.right = b;
                continue;
            }
        }
        merged.push(MergeRecord::new(a, b, parent, children));
    }

    *list = merged;
    Ok(())
}
