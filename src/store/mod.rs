//! Curated store
//!
//! A key-addressed table per entity type. Tables support idempotent
//! upsert-by-key, point lookup, and read-by-key-range. The store has a
//! single writer (the merger); fact building and standings aggregation read
//! a cloned snapshot so a stage never observes a partially applied drop.

use std::collections::BTreeMap;
use std::ops::RangeBounds;

use crate::models::{
    Circuit, Constructor, CuratedRecord, Driver, LapTime, PitStop, Qualifying, Race, RaceResult,
};

/// Outcome of a single upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    /// The key was new
    Inserted,
    /// The key existed; its row was replaced whole
    Replaced,
}

/// One key-addressed curated table.
#[derive(Debug, Clone)]
pub struct CuratedTable<T: CuratedRecord> {
    rows: BTreeMap<T::Key, T>,
}

impl<T: CuratedRecord> Default for CuratedTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: CuratedRecord> CuratedTable<T> {
    /// Create an empty table.
    pub fn new() -> Self {
        Self {
            rows: BTreeMap::new(),
        }
    }

    /// Number of live rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Point lookup by natural key.
    pub fn get(&self, key: &T::Key) -> Option<&T> {
        self.rows.get(key)
    }

    /// Whole-row upsert: insert when the key is new, replace when it
    /// already exists. Never a field-level merge.
    pub fn upsert(&mut self, key: T::Key, row: T) -> Upsert {
        match self.rows.insert(key, row) {
            None => Upsert::Inserted,
            Some(_) => Upsert::Replaced,
        }
    }

    /// Iterate all rows in key order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.rows.values()
    }

    /// Range scan over natural keys.
    pub fn range<R: RangeBounds<T::Key>>(&self, range: R) -> impl Iterator<Item = &T> {
        self.rows.range(range).map(|(_, row)| row)
    }

    /// Iterate keys and rows together.
    pub fn entries(&self) -> impl Iterator<Item = (&T::Key, &T)> {
        self.rows.iter()
    }
}

/// The full curated store: one table per entity kind.
///
/// Cloning produces a consistent snapshot; derived artifacts (facts,
/// standings) are rebuilt from a snapshot and can always be discarded.
#[derive(Debug, Clone, Default)]
pub struct CuratedStore {
    pub circuits: CuratedTable<Circuit>,
    pub races: CuratedTable<Race>,
    pub constructors: CuratedTable<Constructor>,
    pub drivers: CuratedTable<Driver>,
    pub results: CuratedTable<RaceResult>,
    pub pit_stops: CuratedTable<PitStop>,
    pub lap_times: CuratedTable<LapTime>,
    pub qualifying: CuratedTable<Qualifying>,
}

impl CuratedStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Take a consistent read-only snapshot for a derivation stage.
    pub fn snapshot(&self) -> CuratedStore {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Provenance;
    use chrono::{TimeZone, Utc};

    fn circuit(id: i64, name: &str) -> Circuit {
        Circuit {
            circuit_id: id,
            circuit_ref: format!("ref_{id}"),
            name: name.to_string(),
            location: None,
            country: None,
            latitude: None,
            longitude: None,
            altitude: None,
            provenance: Provenance::new(
                "test",
                "2021-01-01",
                Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap(),
            ),
        }
    }

    #[test]
    fn test_upsert_insert_then_replace() {
        let mut table = CuratedTable::new();
        assert_eq!(table.upsert(1, circuit(1, "Albert Park")), Upsert::Inserted);
        assert_eq!(table.upsert(1, circuit(1, "Melbourne")), Upsert::Replaced);
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(&1).unwrap().name, "Melbourne");
    }

    #[test]
    fn test_range_scan() {
        let mut table = CuratedTable::new();
        for id in [5, 1, 3, 9] {
            table.upsert(id, circuit(id, "c"));
        }
        let ids: Vec<i64> = table.range(2..=6).map(|c| c.circuit_id).collect();
        assert_eq!(ids, vec![3, 5]);
    }

    #[test]
    fn test_snapshot_is_isolated_from_writes() {
        let mut store = CuratedStore::new();
        store.circuits.upsert(1, circuit(1, "Albert Park"));
        let snapshot = store.snapshot();
        store.circuits.upsert(2, circuit(2, "Monza"));
        assert_eq!(snapshot.circuits.len(), 1);
        assert_eq!(store.circuits.len(), 2);
    }
}
