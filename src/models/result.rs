//! Race result model

use serde::{Deserialize, Serialize};

use super::kind::EntityKind;
use super::provenance::Provenance;
use super::record::{key_id, CuratedRecord, KeyError};

/// One driver's classified result in one race.
///
/// Natural key: `(race_id, driver_id)` — a re-delivered result for the same
/// race and driver replaces the prior row, whatever its `result_id`.
/// `points` and `position` are optional because sources deliver unclassified
/// finishes; the standings aggregator treats missing points as zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RaceResult {
    /// Source row identifier, kept as payload only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_id: Option<i64>,
    /// Race this result belongs to
    pub race_id: i64,
    /// Driver this result belongs to
    pub driver_id: i64,
    /// Constructor the driver raced for
    pub constructor_id: i64,
    /// Grid position at the start
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grid: Option<i32>,
    /// Final classified position, absent when not classified
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<u32>,
    /// Championship points scored
    #[serde(skip_serializing_if = "Option::is_none")]
    pub points: Option<f64>,
    /// Laps completed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub laps: Option<i32>,
    /// Total race time as delivered
    #[serde(skip_serializing_if = "Option::is_none")]
    pub race_time: Option<String>,
    /// Lap number of the fastest lap
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fastest_lap: Option<i32>,
    /// Fastest lap time as delivered
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fastest_lap_time: Option<String>,
    /// Row provenance
    pub provenance: Provenance,
}

impl CuratedRecord for RaceResult {
    type Key = (i64, i64);
    const KIND: EntityKind = EntityKind::Result;

    fn natural_key(&self) -> Result<Self::Key, KeyError> {
        Ok((
            key_id(Self::KIND, "raceId", self.race_id)?,
            key_id(Self::KIND, "driverId", self.driver_id)?,
        ))
    }

    fn provenance(&self) -> &Provenance {
        &self.provenance
    }
}
