//! Circuit model

use serde::{Deserialize, Serialize};

use super::kind::EntityKind;
use super::provenance::Provenance;
use super::record::{key_id, CuratedRecord, KeyError};

/// A circuit (track) a race is held at.
///
/// Natural key: `circuit_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Circuit {
    /// Circuit identifier from the source system
    pub circuit_id: i64,
    /// Stable short reference (e.g. "albert_park")
    pub circuit_ref: String,
    /// Circuit name
    pub name: String,
    /// City or locality
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Country
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    /// Latitude in degrees
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    /// Longitude in degrees
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    /// Altitude in metres
    #[serde(skip_serializing_if = "Option::is_none")]
    pub altitude: Option<f64>,
    /// Row provenance
    pub provenance: Provenance,
}

impl CuratedRecord for Circuit {
    type Key = i64;
    const KIND: EntityKind = EntityKind::Circuit;

    fn natural_key(&self) -> Result<Self::Key, KeyError> {
        key_id(Self::KIND, "circuitId", self.circuit_id)
    }

    fn provenance(&self) -> &Provenance {
        &self.provenance
    }
}
