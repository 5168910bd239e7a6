//! Deduplicated merge of a freshly parsed batch into an existing dataset.
//!
//! A row is a duplicate when its dedup key (concept + ISO day) already exists
//! in the *existing* rows. Repeated keys inside the incoming batch itself are
//! kept: the first import of a statement accepts every row it contains.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::transaction::Transaction;

/// Counts reported after a merge
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeReport {
    pub accepted: usize,
    pub duplicates: usize,
}

/// Append the rows of `batch` whose key is unknown to `existing`.
///
/// Relative order is preserved: old rows first, then surviving new rows.
pub fn merge(existing: Vec<Transaction>, batch: Vec<Transaction>) -> (Vec<Transaction>, MergeReport) {
    if existing.is_empty() {
        let report = MergeReport {
            accepted: batch.len(),
            duplicates: 0,
        };
        return (batch, report);
    }

    let known: HashSet<String> = existing.iter().map(Transaction::dedup_key).collect();

    let incoming = batch.len();
    let mut merged = existing;
    merged.reserve(incoming);

    let mut accepted = 0;
    for txn in batch {
        if known.contains(&txn.dedup_key()) {
            debug!(concept = %txn.concept, date = %txn.date, "skipping duplicate transaction");
            continue;
        }
        merged.push(txn);
        accepted += 1;
    }

    let report = MergeReport {
        accepted,
        duplicates: incoming - accepted,
    };
    (merged, report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn txn(d: u32, concept: &str, amount: f64) -> Transaction {
        Transaction::new(NaiveDate::from_ymd_opt(2024, 3, d).unwrap(), concept, amount, 100.0)
    }

    #[test]
    fn test_merge_into_empty_accepts_everything() {
        let batch = vec![txn(1, "Cafe", -2.0), txn(1, "Cafe", -2.0)];
        let (merged, report) = merge(Vec::new(), batch.clone());
        assert_eq!(merged, batch);
        assert_eq!(report, MergeReport { accepted: 2, duplicates: 0 });
    }

    #[test]
    fn test_merge_drops_rows_already_present() {
        let existing = vec![txn(1, "Cafe", -2.0), txn(2, "Salary", 1500.0)];
        let batch = vec![txn(2, "Salary", 1500.0), txn(3, "Metro", -1.5)];
        let (merged, report) = merge(existing, batch);

        assert_eq!(report.accepted, 1);
        assert_eq!(report.duplicates, 1);
        let concepts: Vec<_> = merged.iter().map(|t| t.concept.as_str()).collect();
        assert_eq!(concepts, vec!["Cafe", "Salary", "Metro"]);
    }

    #[test]
    fn test_key_ignores_amount() {
        // Same concept on the same day is a duplicate even if the amount differs
        let existing = vec![txn(1, "Cafe", -2.0)];
        let (merged, report) = merge(existing, vec![txn(1, "Cafe", -3.5)]);
        assert_eq!(merged.len(), 1);
        assert_eq!(report.duplicates, 1);
    }

    #[test]
    fn test_internal_batch_duplicates_survive() {
        let existing = vec![txn(1, "Rent", -700.0)];
        let batch = vec![txn(5, "Bus", -1.0), txn(5, "Bus", -1.0), txn(1, "Rent", -700.0)];
        let (merged, report) = merge(existing, batch);
        assert_eq!(merged.len(), 3);
        assert_eq!(report, MergeReport { accepted: 2, duplicates: 1 });
    }

    #[test]
    fn test_merge_is_idempotent() {
        let batch = vec![txn(1, "Cafe", -2.0), txn(2, "Bus", -1.0), txn(2, "Bus", -1.0)];
        let (once, _) = merge(Vec::new(), batch.clone());
        let (twice, report) = merge(once.clone(), batch);
        assert_eq!(once, twice);
        assert_eq!(report.accepted, 0);
        assert_eq!(report.duplicates, 3);
    }
}
