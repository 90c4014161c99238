//! Provenance stamped onto every curated row

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where a curated row came from.
///
/// `drop_id` is the logical as-of marker of the delivery the row arrived in.
/// It is an opaque string ordered by the caller (typically an ISO date such
/// as `2021-03-28`); the pipeline never reorders drops on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Provenance {
    /// Source system name (e.g. "ergast")
    pub source: String,
    /// Drop identifier the row was delivered in
    pub drop_id: String,
    /// When the row was normalized into its curated shape
    pub curated_at: DateTime<Utc>,
}

impl Provenance {
    /// Create a provenance record with an explicit curation timestamp.
    pub fn new(source: impl Into<String>, drop_id: impl Into<String>, curated_at: DateTime<Utc>) -> Self {
        Self {
            source: source.into(),
            drop_id: drop_id.into(),
            curated_at,
        }
    }

    /// Stamp a provenance record with the current time.
    pub fn stamp(source: impl Into<String>, drop_id: impl Into<String>) -> Self {
        Self::new(source, drop_id, Utc::now())
    }
}
