use std::collections::HashSet;

use crate::record::CaseRecord;

/// Drops records whose identity key was already seen, keeping the first
/// occurrence and the original order.
///
/// Records with an entirely empty identity key are always kept.
pub fn dedupe(records: Vec<CaseRecord>) -> Vec<CaseRecord> {
    let mut seen = HashSet::new();
    records
        .into_iter()
        .filter(|record| {
            let key = record.identity();
            key.is_empty() || seen.insert(key)
        })
        .collect()
}
