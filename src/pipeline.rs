//! End-to-end drop processing
//!
//! Explicit composition of the pipeline stages for one drop:
//! normalize → merge → rebuild facts → recompute standings. The drop
//! identifier and season are always passed as parameters; there is no
//! ambient global state. Drops are processed one at a time, end-to-end,
//! so a derivation stage never sees a partially applied drop.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::facts::{FactBuilder, FactRecord, FactScope, UnresolvedReference};
use crate::ingest::{IngestError, IngestStats, Ingestor};
use crate::merge::{MergeReport, Merger};
use crate::models::EntityKind;
use crate::normalize::{Normalizer, RawRecord, SchemaError};
use crate::standings::{CompetitorKind, Standings, StandingsAggregator};
use crate::store::CuratedStore;

/// Structured outcome of one drop, returned to the orchestrator.
///
/// A non-zero rejection or unresolved count is an operational signal, not a
/// run failure; schema errors abort only their own batch.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
#[must_use = "drop reports carry rejection counts that should be checked"]
pub struct DropReport {
    pub drop_id: String,
    /// Merge outcome per entity batch
    pub merges: BTreeMap<EntityKind, MergeReport>,
    /// Batches rejected by schema validation
    pub schema_errors: Vec<SchemaError>,
    /// Fact records in the rebuilt fact table
    pub facts_emitted: usize,
    /// Results excluded from the fact table for missing join keys
    pub unresolved_references: usize,
    /// Seasons whose standings were recomputed
    pub seasons: Vec<i32>,
}

impl DropReport {
    /// Total rows rejected across all merges of this drop.
    pub fn rejected_rows(&self) -> usize {
        self.merges.values().map(|m| m.rejected).sum()
    }
}

/// The curation pipeline: curated store plus its derived tables.
///
/// The store is the single source of truth; the fact table and the per-
/// season standings tables are recomputed from a store snapshot after each
/// drop and can always be discarded.
#[derive(Debug, Default)]
pub struct CurationPipeline {
    normalizer: Normalizer,
    merger: Merger,
    fact_builder: FactBuilder,
    aggregator: StandingsAggregator,
    store: CuratedStore,
    facts: Vec<FactRecord>,
    unresolved: Vec<UnresolvedReference>,
    driver_standings: BTreeMap<i32, Standings>,
    constructor_standings: BTreeMap<i32, Standings>,
}

impl CurationPipeline {
    /// Create an empty pipeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// The curated store.
    pub fn store(&self) -> &CuratedStore {
        &self.store
    }

    /// The current fact table.
    pub fn facts(&self) -> &[FactRecord] {
        &self.facts
    }

    /// Results currently excluded from the fact table.
    pub fn unresolved(&self) -> &[UnresolvedReference] {
        &self.unresolved
    }

    /// Driver standings for one season, if any facts exist for it.
    pub fn driver_standings(&self, season: i32) -> Option<&Standings> {
        self.driver_standings.get(&season)
    }

    /// Constructor standings for one season, if any facts exist for it.
    pub fn constructor_standings(&self, season: i32) -> Option<&Standings> {
        self.constructor_standings.get(&season)
    }

    /// Process one drop end-to-end from in-memory raw batches.
    pub fn run_drop(
        &mut self,
        drop_id: &str,
        batches: Vec<(EntityKind, Vec<RawRecord>)>,
    ) -> DropReport {
        let mut report = DropReport {
            drop_id: drop_id.to_string(),
            ..DropReport::default()
        };

        for (kind, batch) in batches {
            match self.apply_batch(kind, &batch, drop_id) {
                // a drop may carry several batches of one kind; fold their
                // reports together so no counter is lost
                Ok(merge) => report.merges.entry(kind).or_default().absorb(merge),
                Err(schema_error) => report.schema_errors.push(schema_error),
            }
        }

        self.rebuild_derived();
        report.facts_emitted = self.facts.len();
        report.unresolved_references = self.unresolved.len();
        report.seasons = self.driver_standings.keys().copied().collect();

        info!(
            drop_id,
            batches = report.merges.len(),
            schema_errors = report.schema_errors.len(),
            facts = report.facts_emitted,
            unresolved = report.unresolved_references,
            "drop processed"
        );
        report
    }

    /// Process one drop end-to-end from raw files on disk.
    pub fn run_drop_from_dir(
        &mut self,
        ingestor: &mut Ingestor,
        root: &Path,
        drop_id: &str,
    ) -> Result<(DropReport, IngestStats), IngestError> {
        let (drop, stats) = ingestor.load_drop(root, drop_id)?;
        Ok((self.run_drop(drop_id, drop.batches), stats))
    }

    /// Normalize and merge one entity batch.
    fn apply_batch(
        &mut self,
        kind: EntityKind,
        batch: &[RawRecord],
        drop_id: &str,
    ) -> Result<MergeReport, SchemaError> {
        match kind {
            EntityKind::Circuit => {
                let rows = self.normalizer.normalize_batch(batch, drop_id)?;
                Ok(self.merger.merge(&mut self.store.circuits, rows, drop_id))
            }
            EntityKind::Race => {
                let rows = self.normalizer.normalize_batch(batch, drop_id)?;
                Ok(self.merger.merge(&mut self.store.races, rows, drop_id))
            }
            EntityKind::Constructor => {
                let rows = self.normalizer.normalize_batch(batch, drop_id)?;
                Ok(self
                    .merger
                    .merge(&mut self.store.constructors, rows, drop_id))
            }
            EntityKind::Driver => {
                let rows = self.normalizer.normalize_batch(batch, drop_id)?;
                Ok(self.merger.merge(&mut self.store.drivers, rows, drop_id))
            }
            EntityKind::Result => {
                let rows = self.normalizer.normalize_batch(batch, drop_id)?;
                Ok(self.merger.merge(&mut self.store.results, rows, drop_id))
            }
            EntityKind::PitStop => {
                let rows = self.normalizer.normalize_batch(batch, drop_id)?;
                Ok(self.merger.merge(&mut self.store.pit_stops, rows, drop_id))
            }
            EntityKind::LapTime => {
                let rows = self.normalizer.normalize_batch(batch, drop_id)?;
                Ok(self.merger.merge(&mut self.store.lap_times, rows, drop_id))
            }
            EntityKind::Qualifying => {
                let rows = self.normalizer.normalize_batch(batch, drop_id)?;
                Ok(self.merger.merge(&mut self.store.qualifying, rows, drop_id))
            }
        }
    }

    /// Rebuild the fact table and all season standings from a consistent
    /// snapshot of the store.
    pub fn rebuild_derived(&mut self) {
        let snapshot = self.store.snapshot();
        let build = self.fact_builder.build(&snapshot, &FactScope::All);
        self.facts = build.facts;
        self.unresolved = build.unresolved;

        let seasons: Vec<i32> = {
            let mut seasons: Vec<i32> = self.facts.iter().map(|f| f.season).collect();
            seasons.sort_unstable();
            seasons.dedup();
            seasons
        };

        self.driver_standings.clear();
        self.constructor_standings.clear();
        for season in seasons {
            self.driver_standings.insert(
                season,
                self.aggregator
                    .aggregate(&self.facts, season, CompetitorKind::Driver),
            );
            self.constructor_standings.insert(
                season,
                self.aggregator
                    .aggregate(&self.facts, season, CompetitorKind::Constructor),
            );
        }
    }
}
