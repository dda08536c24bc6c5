//! Merge per-chunk results into one deduplicated transaction list.
//!
//! Chunk headers are duplicated context, so a transaction row near a chunk
//! boundary — or repeated inside the header itself — can surface in more
//! than one chunk's extraction. Identity across chunks is the
//! `(date, transaction, amount)` triple; the first occurrence wins and the
//! output keeps first-seen order, with chunks processed in submission order.
//!
//! Records missing one of the key fields still participate: the absent
//! component is `null` in the key. Field presence is the validator's
//! concern, not the aggregator's.

use serde_json::Value;
use std::collections::HashSet;

/// Fields forming the dedup key, in key order.
const KEY_FIELDS: [&str; 3] = ["date", "transaction", "amount"];

/// Merge chunk record lists, dropping records whose
/// `(date, transaction, amount)` key was already seen.
///
/// Guarantees: output preserves first-seen order, contains no two records
/// with an equal key, and is idempotent (merging the output again is a
/// no-op).
pub fn merge_chunk_records(chunk_results: Vec<Vec<Value>>) -> Vec<Value> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut merged = Vec::new();

    for records in chunk_results {
        for record in records {
            if seen.insert(dedup_key(&record)) {
                merged.push(record);
            }
        }
    }

    merged
}

/// Canonical string form of the `(date, transaction, amount)` triple.
///
/// Serialising the three values as a JSON array gives a stable, hashable
/// key that distinguishes `null` from `"null"` and `450` from `"450"`.
fn dedup_key(record: &Value) -> String {
    let triple: Vec<&Value> = KEY_FIELDS
        .iter()
        .map(|field| record.get(*field).unwrap_or(&Value::Null))
        .collect();
    serde_json::to_string(&triple).unwrap_or_default()
}
