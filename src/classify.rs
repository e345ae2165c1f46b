//! Change classification: diff current fingerprints against the snapshot.
//!
//! [`classify`] is the decision core of the incremental engine. It is a pure
//! function — no I/O, no shared state — from two `filename → digest` mappings
//! to four disjoint filename sets. Everything downstream (skip, generate,
//! regenerate, delete) keys off which set a file lands in:
//!
//! | Set | Meaning |
//! |-----|---------|
//! | `unchanged` | present in both mappings, equal digest |
//! | `modified`  | present in both mappings, digest differs |
//! | `new`       | present only in the current mapping |
//! | `deleted`   | present only in the previous mapping |
//!
//! The four sets partition the union of both key sets: every filename lands
//! in exactly one. Results are `BTreeSet`s, so reporting order is stable and
//! independent of mapping iteration order.

use std::collections::{BTreeMap, BTreeSet};

/// The four disjoint outcome sets of a classification pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    pub unchanged: BTreeSet<String>,
    pub modified: BTreeSet<String>,
    pub new: BTreeSet<String>,
    pub deleted: BTreeSet<String>,
}

impl Classification {
    /// Total number of classified filenames across all four sets.
    pub fn total(&self) -> usize {
        self.unchanged.len() + self.modified.len() + self.new.len() + self.deleted.len()
    }

    /// True when nothing needs generating or deleting.
    pub fn is_quiescent(&self) -> bool {
        self.modified.is_empty() && self.new.is_empty() && self.deleted.is_empty()
    }
}

/// Classify every filename in `current` and `previous` into exactly one set.
///
/// Single pass over `current` with a working copy of `previous`: a lookup
/// decides unchanged/modified/new, and whatever remains unclaimed in the
/// working copy afterwards is deleted. O(|current| + |previous|) lookups.
pub fn classify(
    current: &BTreeMap<String, String>,
    previous: &BTreeMap<String, String>,
) -> Classification {
    let mut remaining = previous.clone();
    let mut result = Classification::default();

    for (name, digest) in current {
        match remaining.remove(name) {
            Some(prior) if prior == *digest => {
                result.unchanged.insert(name.clone());
            }
            Some(_) => {
                result.modified.insert(name.clone());
            }
            None => {
                result.new.insert(name.clone());
            }
        }
    }

    result.deleted = remaining.into_keys().collect();
    result
}
