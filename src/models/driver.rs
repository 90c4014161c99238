//! Driver model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::kind::EntityKind;
use super::provenance::Provenance;
use super::record::{key_id, CuratedRecord, KeyError};

/// A driver's name, delivered as a nested struct in raw drops.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverName {
    pub forename: String,
    pub surname: String,
}

impl DriverName {
    /// Full display name, `forename surname`.
    pub fn full(&self) -> String {
        format!("{} {}", self.forename, self.surname)
    }
}

/// A driver.
///
/// Natural key: `driver_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Driver {
    /// Driver identifier from the source system
    pub driver_id: i64,
    /// Stable short reference (e.g. "hamilton")
    pub driver_ref: String,
    /// Permanent car number, when assigned
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number: Option<i32>,
    /// Three-letter code, when assigned
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Driver name
    pub name: DriverName,
    /// Date of birth
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<NaiveDate>,
    /// Nationality
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nationality: Option<String>,
    /// Row provenance
    pub provenance: Provenance,
}

impl CuratedRecord for Driver {
    type Key = i64;
    const KIND: EntityKind = EntityKind::Driver;

    fn natural_key(&self) -> Result<Self::Key, KeyError> {
        key_id(Self::KIND, "driverId", self.driver_id)
    }

    fn provenance(&self) -> &Provenance {
        &self.provenance
    }
}
