//! Duplicate removal for header sets gathered across overlapping cursor passes.
//!
//! Consecutive passes share their boundary timestamp, so the records at that
//! instant are returned twice. Deduplication keys on the (public ID, object ID)
//! pair: the first occurrence is kept and input order is preserved.

use std::collections::HashSet;
use std::hash::Hash;

use crate::records::HeaderRecord;

/// Records left after deduplication, plus how many were dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct Deduped<T> {
    pub records: Vec<T>,
    pub removed: usize,
}

/// Keep the first record for each key, preserving order.
pub fn dedup_by_key<T, K, F>(records: Vec<T>, key: F) -> Deduped<T>
where
    K: Eq + Hash,
    F: Fn(&T) -> K,
{
    let total = records.len();
    let mut seen = HashSet::with_capacity(total);
    let kept: Vec<T> = records
        .into_iter()
        .filter(|r| seen.insert(key(r)))
        .collect();
    Deduped {
        removed: total - kept.len(),
        records: kept,
    }
}

/// Deduplicate header records on (public ID, object ID).
pub fn dedup_headers<H: HeaderRecord>(records: Vec<H>) -> Deduped<H> {
    let deduped = dedup_by_key(records, |h| {
        (h.public_id().to_string(), h.object_id().to_string())
    });
    if deduped.removed > 0 {
        tracing::debug!(
            "Removed {} duplicate {} headers",
            deduped.removed,
            H::KIND
        );
    }
    deduped
}
