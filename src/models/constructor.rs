//! Constructor (team) model

use serde::{Deserialize, Serialize};

use super::kind::EntityKind;
use super::provenance::Provenance;
use super::record::{key_id, CuratedRecord, KeyError};

/// A constructor (team) entering cars in races.
///
/// Natural key: `constructor_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Constructor {
    /// Constructor identifier from the source system
    pub constructor_id: i64,
    /// Stable short reference (e.g. "mclaren")
    pub constructor_ref: String,
    /// Constructor name
    pub name: String,
    /// Nationality
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nationality: Option<String>,
    /// Row provenance
    pub provenance: Provenance,
}

impl CuratedRecord for Constructor {
    type Key = i64;
    const KIND: EntityKind = EntityKind::Constructor;

    fn natural_key(&self) -> Result<Self::Key, KeyError> {
        key_id(Self::KIND, "constructorId", self.constructor_id)
    }

    fn provenance(&self) -> &Provenance {
        &self.provenance
    }
}
