//! Remote-wins reconciliation of two quote lists.
//!
//! `text` is the match key (exact, case-sensitive, untrimmed). Local order and
//! local-only quotes are kept; unmatched remote quotes are appended; a matched
//! slot is overwritten by the remote quote in place. A conflict is a match
//! whose categories differed at the moment of comparison.
//!
//! Remote quotes are applied one at a time against the list built so far, so a
//! `text` repeated in the remote batch is compared (and may be counted) once
//! per occurrence.

use quotesync_core::{QuoteList, QuoteRecord};

/// A matched quote whose category the remote side replaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryChange {
    pub text: String,
    pub local: String,
    pub remote: String,
}

/// Result of [`merge`]. `changes` holds one entry per counted conflict, in
/// the order they were found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
    pub merged: QuoteList,
    pub conflicts: usize,
    pub changes: Vec<CategoryChange>,
}

impl MergeOutcome {
    pub fn has_conflicts(&self) -> bool {
        self.conflicts > 0
    }
}

pub fn merge(local: &[QuoteRecord], remote: &[QuoteRecord]) -> MergeOutcome {
    let mut merged: QuoteList = local.to_vec();
    let mut changes = Vec::new();

    for incoming in remote {
        match merged.iter().position(|q| q.text == incoming.text) {
            Some(index) => {
                if merged[index].category != incoming.category {
                    changes.push(CategoryChange {
                        text: incoming.text.clone(),
                        local: merged[index].category.clone(),
                        remote: incoming.category.clone(),
                    });
                }
                merged[index] = incoming.clone();
            }
            None => merged.push(incoming.clone()),
        }
    }

    MergeOutcome {
        merged,
        conflicts: changes.len(),
        changes,
    }
}
