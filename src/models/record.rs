//! The `CuratedRecord` trait and natural-key errors

use serde::Serialize;

use super::kind::EntityKind;
use super::provenance::Provenance;

/// Error extracting a natural key from a curated row.
///
/// A row with a malformed key is excluded from a merge and counted under the
/// report's `rejected` field; it never aborts the batch.
#[derive(Debug, Clone, PartialEq, thiserror::Error, Serialize)]
pub enum KeyError {
    #[error("{entity} row has an invalid natural key: {field} = {value}")]
    InvalidComponent {
        entity: EntityKind,
        field: String,
        value: String,
    },
}

impl KeyError {
    pub(crate) fn invalid(entity: EntityKind, field: &str, value: impl ToString) -> Self {
        KeyError::InvalidComponent {
            entity,
            field: field.to_string(),
            value: value.to_string(),
        }
    }
}

/// A typed row the curated store can hold.
///
/// The natural key is the entity-specific field combination that identifies
/// a logical row across drops; at most one live row per key exists in the
/// store at a time.
pub trait CuratedRecord: Clone + PartialEq {
    /// Natural key type; ordered so tables can be range-scanned.
    type Key: Ord + Clone + std::fmt::Debug;

    /// The entity kind this record belongs to.
    const KIND: EntityKind;

    /// Extract the natural key, rejecting malformed key components
    /// (non-positive identifiers).
    fn natural_key(&self) -> Result<Self::Key, KeyError>;

    /// Provenance of this row.
    fn provenance(&self) -> &Provenance;
}

/// Validate a positive integer key component.
pub(crate) fn key_id(entity: EntityKind, field: &str, value: i64) -> Result<i64, KeyError> {
    if value > 0 {
        Ok(value)
    } else {
        Err(KeyError::invalid(entity, field, value))
    }
}
