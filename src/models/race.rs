//! Race model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::kind::EntityKind;
use super::provenance::Provenance;
use super::record::{key_id, CuratedRecord, KeyError};

/// A scheduled race within a season.
///
/// Natural key: `race_id`. `race_time` is kept as delivered (an optional
/// `HH:MM:SS` string); the fact builder derives the combined timestamp and
/// falls back to date-only granularity when the time is absent or
/// unparseable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Race {
    /// Race identifier from the source system
    pub race_id: i64,
    /// Season year
    pub year: i32,
    /// Round number within the season
    pub round: i32,
    /// Circuit the race is held at
    pub circuit_id: i64,
    /// Race name (e.g. "Australian Grand Prix")
    pub name: String,
    /// Race date
    pub race_date: NaiveDate,
    /// Race start time as delivered, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub race_time: Option<String>,
    /// Row provenance
    pub provenance: Provenance,
}

impl CuratedRecord for Race {
    type Key = i64;
    const KIND: EntityKind = EntityKind::Race;

    fn natural_key(&self) -> Result<Self::Key, KeyError> {
        key_id(Self::KIND, "raceId", self.race_id)
    }

    fn provenance(&self) -> &Provenance {
        &self.provenance
    }
}
