//! Schema normalization
//!
//! Validates and casts each raw record batch to its typed curated shape and
//! stamps it with provenance (source name, drop identifier, curation
//! timestamp). Normalization is pure with respect to the curated store.
//!
//! A batch is all-or-nothing: any row with a missing or uncoercible
//! required field rejects the whole batch with a [`SchemaError`] listing
//! every offending field, so malformed rows are never silently curated.

pub mod entities;
pub mod raw;

pub use entities::FromRaw;
pub use raw::{FieldError, FieldProblem, RawRecord};

use serde::Serialize;
use tracing::{info, warn};

use crate::models::{EntityKind, Provenance};

/// Batch-level schema rejection.
///
/// Fatal to the offending batch only; other entity batches of the same drop
/// proceed independently.
#[derive(Debug, Clone, PartialEq, thiserror::Error, Serialize)]
#[error(
    "schema validation rejected {entity} batch from drop {drop_id}: {} offending field(s)",
    .errors.len()
)]
pub struct SchemaError {
    /// Entity the batch was being normalized into
    pub entity: EntityKind,
    /// Drop the batch arrived in
    pub drop_id: String,
    /// Every offending field, with row indexes
    pub errors: Vec<FieldError>,
}

impl SchemaError {
    /// Distinct offending field names, in first-seen order.
    pub fn offending_fields(&self) -> Vec<&str> {
        let mut fields: Vec<&str> = Vec::new();
        for error in &self.errors {
            if !fields.contains(&error.field.as_str()) {
                fields.push(&error.field);
            }
        }
        fields
    }
}

/// The schema normalizer.
///
/// Stateless; one instance can normalize batches for any entity kind.
///
/// # Example
///
/// ```rust
/// use motorsport_curation_sdk::models::Circuit;
/// use motorsport_curation_sdk::normalize::{Normalizer, RawRecord};
///
/// let raw = RawRecord::from_value(
///     "ergast",
///     "2021-03-28",
///     serde_json::json!({"circuitId": 1, "circuitRef": "albert_park", "name": "Albert Park"}),
/// )
/// .unwrap();
///
/// let normalizer = Normalizer::new();
/// let circuits: Vec<Circuit> = normalizer.normalize_batch(&[raw], "2021-03-28").unwrap();
/// assert_eq!(circuits.len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct Normalizer;

impl Normalizer {
    /// Create a new normalizer.
    pub fn new() -> Self {
        Self
    }

    /// Normalize a raw batch into typed entities for one drop.
    ///
    /// The provenance source comes from each raw record's `source` tag; the
    /// drop identifier is the caller's `drop_id` parameter, which is
    /// authoritative over whatever the raw records carry.
    pub fn normalize_batch<T: FromRaw>(
        &self,
        batch: &[RawRecord],
        drop_id: &str,
    ) -> Result<Vec<T>, SchemaError> {
        let mut entities = Vec::with_capacity(batch.len());
        let mut errors = Vec::new();

        for (row, raw) in batch.iter().enumerate() {
            if raw.drop_id != drop_id {
                warn!(
                    entity = %T::KIND,
                    row,
                    raw_drop_id = %raw.drop_id,
                    drop_id,
                    "raw record drop tag differs from caller's drop id; caller wins"
                );
            }
            let provenance = Provenance::stamp(&raw.source, drop_id);
            match T::from_raw(raw, provenance) {
                Ok(entity) => entities.push(entity),
                Err(row_errors) => {
                    errors.extend(row_errors.into_iter().map(|e| e.at_row(row)));
                }
            }
        }

        if errors.is_empty() {
            info!(
                entity = %T::KIND,
                drop_id,
                rows = entities.len(),
                "normalized batch"
            );
            Ok(entities)
        } else {
            let error = SchemaError {
                entity: T::KIND,
                drop_id: drop_id.to_string(),
                errors,
            };
            warn!(
                entity = %T::KIND,
                drop_id,
                fields = ?error.offending_fields(),
                "rejected batch"
            );
            Err(error)
        }
    }
}
