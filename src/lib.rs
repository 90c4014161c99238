//! Motorsport Curation SDK - curation pipeline for time-partitioned event data
//!
//! Provides the engine behind a drop-based curation pipeline:
//! - Raw file ingestion (one file per entity kind per drop)
//! - Schema normalization into typed, provenance-stamped entities
//! - Idempotent, dedup-safe merging into a key-addressed curated store
//! - Denormalized fact building across the curated entities
//! - Ranked, tie-broken season standings for drivers and constructors
//!
//! Data flows raw batch → normalizer → merger → curated store → fact
//! builder → standings aggregator; [`pipeline::CurationPipeline`] composes
//! the stages for one drop at a time.

pub mod facts;
pub mod ingest;
pub mod merge;
pub mod models;
pub mod normalize;
pub mod pipeline;
pub mod standings;
pub mod store;

// Re-export commonly used types
pub use facts::{FactBuild, FactBuilder, FactRecord, FactScope, UnresolvedReference};
pub use ingest::{DedupStrategy, IngestError, IngestStats, Ingestor};
pub use merge::{MergeReport, Merger};
pub use models::{
    Circuit, Constructor, CuratedRecord, Driver, DriverName, EntityKind, KeyError, LapTime,
    PitStop, Provenance, Qualifying, Race, RaceResult,
};
pub use normalize::{FieldError, FieldProblem, FromRaw, Normalizer, RawRecord, SchemaError};
pub use pipeline::{CurationPipeline, DropReport};
pub use standings::{CompetitorKind, StandingRow, Standings, StandingsAggregator};
pub use store::{CuratedStore, CuratedTable, Upsert};
