//! Curation merger
//!
//! Merges a normalized batch into its curated table: deduplicates within
//! the batch on the natural key (last write wins), rejects rows with
//! malformed keys, then upserts each surviving key with whole-row
//! replace-on-key semantics.
//!
//! The batch is staged into a buffer before any store write, so a merge is
//! all-or-nothing per batch and independently retryable: re-running the
//! same batch for the same drop reports `updated == N, inserted == 0` and
//! leaves the store equivalent. Across drops the last applied row wins; the
//! merger never reorders drops on the caller's behalf.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::models::CuratedRecord;
use crate::store::{CuratedTable, Upsert};

/// Cap on retained per-row error messages.
const MAX_REPORTED_ERRORS: usize = 100;

/// Structured outcome of one merge.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[must_use = "merge reports carry rejection counts that should be checked"]
pub struct MergeReport {
    /// Rows written under a previously unseen key
    pub inserted: usize,
    /// Rows that replaced an existing key, whole-row
    pub updated: usize,
    /// Rows left in place by a store that elides identical writes; always
    /// zero for the whole-row replace table
    pub unchanged: usize,
    /// Rows excluded for a malformed natural key
    pub rejected: usize,
    /// Rows superseded by a later occurrence of the same key in the batch
    pub deduplicated: usize,
    /// Row-level error messages (first 100)
    pub errors: Vec<String>,
}

impl MergeReport {
    /// Create an empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a row-level error, keeping at most the first 100 messages.
    pub fn add_error(&mut self, error: String) {
        if self.errors.len() < MAX_REPORTED_ERRORS {
            self.errors.push(error);
        }
    }

    /// Rows that made it into the store.
    pub fn applied(&self) -> usize {
        self.inserted + self.updated
    }

    /// Fold another report for the same table into this one, summing the
    /// counters and appending its error messages (still capped). Used when
    /// a drop delivers more than one batch for the same entity kind, so no
    /// batch's rejection counters are lost.
    pub fn absorb(&mut self, other: MergeReport) {
        self.inserted += other.inserted;
        self.updated += other.updated;
        self.unchanged += other.unchanged;
        self.rejected += other.rejected;
        self.deduplicated += other.deduplicated;
        for error in other.errors {
            self.add_error(error);
        }
    }
}

/// The curation merger.
///
/// # Example
///
/// ```rust
/// use motorsport_curation_sdk::merge::Merger;
/// use motorsport_curation_sdk::models::{Circuit, Provenance};
/// use motorsport_curation_sdk::store::CuratedTable;
///
/// let mut table = CuratedTable::new();
/// let circuit = Circuit {
///     circuit_id: 1,
///     circuit_ref: "albert_park".to_string(),
///     name: "Albert Park".to_string(),
///     location: None,
///     country: None,
///     latitude: None,
///     longitude: None,
///     altitude: None,
///     provenance: Provenance::stamp("ergast", "2021-03-28"),
/// };
///
/// let report = Merger::new().merge(&mut table, vec![circuit], "2021-03-28");
/// assert_eq!(report.inserted, 1);
/// ```
#[derive(Debug, Default)]
pub struct Merger;

impl Merger {
    /// Create a new merger.
    pub fn new() -> Self {
        Self
    }

    /// Merge one normalized batch into its curated table.
    pub fn merge<T: CuratedRecord>(
        &self,
        table: &mut CuratedTable<T>,
        entities: Vec<T>,
        drop_id: &str,
    ) -> MergeReport {
        let mut report = MergeReport::new();

        // Stage the batch before touching the store: dedup on natural key
        // (later occurrence wins) and reject malformed keys row-by-row.
        let mut staged: BTreeMap<T::Key, T> = BTreeMap::new();
        for entity in entities {
            match entity.natural_key() {
                Ok(key) => {
                    if staged.insert(key, entity).is_some() {
                        report.deduplicated += 1;
                    }
                }
                Err(key_error) => {
                    report.rejected += 1;
                    warn!(entity = %T::KIND, drop_id, %key_error, "rejecting row");
                    report.add_error(key_error.to_string());
                }
            }
        }

        // Commit the staged buffer. The staging pass above already resolved
        // every key decision, so this loop cannot fail partway.
        for (key, entity) in staged {
            match table.upsert(key, entity) {
                Upsert::Inserted => report.inserted += 1,
                Upsert::Replaced => report.updated += 1,
            }
        }

        info!(
            entity = %T::KIND,
            drop_id,
            inserted = report.inserted,
            updated = report.updated,
            rejected = report.rejected,
            deduplicated = report.deduplicated,
            "merge committed"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Constructor, Provenance};
    use chrono::{TimeZone, Utc};

    fn constructor(id: i64, name: &str, drop_id: &str) -> Constructor {
        Constructor {
            constructor_id: id,
            constructor_ref: format!("ref_{id}"),
            name: name.to_string(),
            nationality: None,
            provenance: Provenance::new(
                "test",
                drop_id,
                Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap(),
            ),
        }
    }

    #[test]
    fn test_dedup_within_batch_last_wins() {
        let mut table = CuratedTable::new();
        let batch = vec![
            constructor(1, "McLaren F1", "2021-01-01"),
            constructor(1, "McLaren", "2021-01-01"),
        ];
        let report = Merger::new().merge(&mut table, batch, "2021-01-01");

        assert_eq!(report.inserted, 1);
        assert_eq!(report.deduplicated, 1);
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(&1).unwrap().name, "McLaren");
    }

    #[test]
    fn test_malformed_key_rejected_not_fatal() {
        let mut table = CuratedTable::new();
        let batch = vec![
            constructor(0, "Ghost Team", "2021-01-01"),
            constructor(2, "Ferrari", "2021-01-01"),
        ];
        let report = Merger::new().merge(&mut table, batch, "2021-01-01");

        assert_eq!(report.rejected, 1);
        assert_eq!(report.inserted, 1);
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].contains("constructorId"));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_idempotent_re_merge_reports_updates_only() {
        let mut table = CuratedTable::new();
        let batch = vec![
            constructor(1, "McLaren", "2021-01-01"),
            constructor(2, "Ferrari", "2021-01-01"),
        ];
        let merger = Merger::new();
        let first = merger.merge(&mut table, batch.clone(), "2021-01-01");
        assert_eq!(first.inserted, 2);

        let before: Vec<Constructor> = table.iter().cloned().collect();
        let second = merger.merge(&mut table, batch, "2021-01-01");
        let after: Vec<Constructor> = table.iter().cloned().collect();

        assert_eq!(second.inserted, 0);
        assert_eq!(second.updated, 2);
        assert_eq!(before, after);
    }

    #[test]
    fn test_later_drop_wins_and_leaves_other_keys_alone() {
        let mut table = CuratedTable::new();
        let merger = Merger::new();
        merger.merge(
            &mut table,
            vec![
                constructor(1, "McLaren", "2021-01-01"),
                constructor(2, "Ferrari", "2021-01-01"),
            ],
            "2021-01-01",
        );
        let report = merger.merge(
            &mut table,
            vec![constructor(1, "McLaren Mercedes", "2021-01-02")],
            "2021-01-02",
        );

        assert_eq!(report.updated, 1);
        assert_eq!(table.get(&1).unwrap().name, "McLaren Mercedes");
        assert_eq!(table.get(&1).unwrap().provenance.drop_id, "2021-01-02");
        assert_eq!(table.get(&2).unwrap().name, "Ferrari");
        assert_eq!(table.get(&2).unwrap().provenance.drop_id, "2021-01-01");
    }

    #[test]
    fn test_absorb_sums_counters_and_keeps_errors() {
        let mut first = MergeReport {
            inserted: 2,
            rejected: 1,
            errors: vec!["bad key".to_string()],
            ..MergeReport::default()
        };
        let second = MergeReport {
            inserted: 1,
            updated: 3,
            deduplicated: 1,
            errors: vec!["another bad key".to_string()],
            ..MergeReport::default()
        };
        first.absorb(second);

        assert_eq!(first.inserted, 3);
        assert_eq!(first.updated, 3);
        assert_eq!(first.rejected, 1);
        assert_eq!(first.deduplicated, 1);
        assert_eq!(first.errors.len(), 2);
    }

    #[test]
    fn test_error_messages_capped() {
        let mut report = MergeReport::new();
        for i in 0..250 {
            report.add_error(format!("error {i}"));
        }
        assert_eq!(report.errors.len(), 100);
    }
}
