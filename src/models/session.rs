//! Per-session models: pit stops, lap times, qualifying

use serde::{Deserialize, Serialize};

use super::kind::EntityKind;
use super::provenance::Provenance;
use super::record::{key_id, CuratedRecord, KeyError};

/// One pit stop by one driver in one race.
///
/// Natural key: `(race_id, driver_id, stop)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PitStop {
    pub race_id: i64,
    pub driver_id: i64,
    /// Stop number within the race, starting at 1
    pub stop: i32,
    /// Lap the stop happened on
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lap: Option<i32>,
    /// Wall-clock time of the stop as delivered
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    /// Stop duration in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    pub provenance: Provenance,
}

impl CuratedRecord for PitStop {
    type Key = (i64, i64, i32);
    const KIND: EntityKind = EntityKind::PitStop;

    fn natural_key(&self) -> Result<Self::Key, KeyError> {
        let race_id = key_id(Self::KIND, "raceId", self.race_id)?;
        let driver_id = key_id(Self::KIND, "driverId", self.driver_id)?;
        if self.stop < 1 {
            return Err(KeyError::invalid(Self::KIND, "stop", self.stop));
        }
        Ok((race_id, driver_id, self.stop))
    }

    fn provenance(&self) -> &Provenance {
        &self.provenance
    }
}

/// One timed lap by one driver in one race.
///
/// Natural key: `(race_id, driver_id, lap)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LapTime {
    pub race_id: i64,
    pub driver_id: i64,
    /// Lap number, starting at 1
    pub lap: i32,
    /// Track position at the end of the lap
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<i32>,
    /// Lap time as delivered
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    /// Lap time in milliseconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub milliseconds: Option<i64>,
    pub provenance: Provenance,
}

impl CuratedRecord for LapTime {
    type Key = (i64, i64, i32);
    const KIND: EntityKind = EntityKind::LapTime;

    fn natural_key(&self) -> Result<Self::Key, KeyError> {
        let race_id = key_id(Self::KIND, "raceId", self.race_id)?;
        let driver_id = key_id(Self::KIND, "driverId", self.driver_id)?;
        if self.lap < 1 {
            return Err(KeyError::invalid(Self::KIND, "lap", self.lap));
        }
        Ok((race_id, driver_id, self.lap))
    }

    fn provenance(&self) -> &Provenance {
        &self.provenance
    }
}

/// One driver's qualifying session for one race.
///
/// Natural key: `qualify_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Qualifying {
    pub qualify_id: i64,
    pub race_id: i64,
    pub driver_id: i64,
    pub constructor_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number: Option<i32>,
    /// Qualifying classification
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<i32>,
    /// Q1/Q2/Q3 lap times as delivered
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q1: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q2: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q3: Option<String>,
    pub provenance: Provenance,
}

impl CuratedRecord for Qualifying {
    type Key = i64;
    const KIND: EntityKind = EntityKind::Qualifying;

    fn natural_key(&self) -> Result<Self::Key, KeyError> {
        key_id(Self::KIND, "qualifyId", self.qualify_id)
    }

    fn provenance(&self) -> &Provenance {
        &self.provenance
    }
}
