//! Association reconciliation between two multisets of part references
//!
//! A product's parts are stored as individual `(product_id, part_id)` link
//! rows, and the same part may be linked more than once. Reconciling the
//! persisted links against a desired list therefore has to work on counts:
//! if `A` is linked twice and desired once, exactly one `A` link goes.

use serde::Serialize;
use std::collections::HashMap;

use crate::entities::PartRef;

/// Link edits that turn one multiset into another
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AssociationDiff {
    /// One entry per link occurrence to delete
    pub to_remove: Vec<PartRef>,
    /// One entry per link occurrence to insert
    pub to_add: Vec<PartRef>,
}

impl AssociationDiff {
    /// True when no link rows need to change
    pub fn is_empty(&self) -> bool {
        self.to_remove.is_empty() && self.to_add.is_empty()
    }

    /// Total number of row operations
    pub fn len(&self) -> usize {
        self.to_remove.len() + self.to_add.len()
    }
}

/// Count occurrences of each part id
pub fn frequencies(refs: &[PartRef]) -> HashMap<PartRef, usize> {
    let mut counts = HashMap::new();
    for part in refs {
        *counts.entry(*part).or_insert(0) += 1;
    }
    counts
}

/// Compute the minimal removals and additions taking `current` to `desired`
///
/// Multiplicity is preserved: only the excess occurrences of a repeated id
/// are removed or added. Occurrences are emitted in the order they appear in
/// the input, and an unchanged multiset (regardless of order) yields an empty
/// diff.
pub fn diff(current: &[PartRef], desired: &[PartRef]) -> AssociationDiff {
    let current_counts = frequencies(current);
    let desired_counts = frequencies(desired);

    if current_counts == desired_counts {
        return AssociationDiff::default();
    }

    AssociationDiff {
        to_remove: excess(current, desired_counts),
        to_add: excess(desired, current_counts),
    }
}

/// Walk `refs`, retaining occurrences still covered by `remaining` and
/// returning the rest
fn excess(refs: &[PartRef], mut remaining: HashMap<PartRef, usize>) -> Vec<PartRef> {
    refs.iter()
        .copied()
        .filter(|part| match remaining.get_mut(part) {
            Some(count) if *count > 0 => {
                *count -= 1;
                false
            }
            _ => true,
        })
        .collect()
}
