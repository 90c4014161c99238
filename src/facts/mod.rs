//! Fact building
//!
//! Joins curated race, result, driver, constructor, and circuit rows into
//! one denormalized record per (race, driver) pair. The join is inner: a
//! result whose referenced entity is missing from the snapshot is excluded
//! and reported as an unresolved reference, never emitted with gaps.
//!
//! Building is a pure function of a store snapshot, so a fact table can be
//! discarded and rebuilt at any time; output order is unspecified and
//! consumers should rely on set membership per key only.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::models::EntityKind;
use crate::store::CuratedStore;

/// Scope of a fact build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FactScope {
    /// Every curated result
    All,
    /// Results of races in one season
    Season(i32),
    /// Results delivered in one drop
    Drop(String),
}

/// Denormalized join of one (race, driver) result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FactRecord {
    /// Season year
    pub season: i32,
    /// Round within the season
    pub round: i32,
    pub race_id: i64,
    pub race_name: String,
    /// Race date combined with the start time; date-only granularity
    /// (midnight) when the time is absent or unparseable
    pub race_timestamp: NaiveDateTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub circuit_location: Option<String>,
    pub driver_id: i64,
    pub driver_ref: String,
    pub driver_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub driver_number: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub driver_nationality: Option<String>,
    pub constructor_id: i64,
    pub constructor_ref: String,
    pub constructor_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grid: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fastest_lap: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub race_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub points: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<u32>,
    /// Drop the underlying result row was delivered in
    pub drop_id: String,
}

/// A result excluded from the join because a referenced entity is missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnresolvedReference {
    /// Natural key of the excluded result
    pub race_id: i64,
    pub driver_id: i64,
    /// Which referenced entity was absent
    pub missing: EntityKind,
    /// Key of the absent entity
    pub missing_id: i64,
}

/// Output of one fact build.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[must_use = "fact builds carry unresolved-reference counts that should be checked"]
pub struct FactBuild {
    /// The emitted fact records
    pub facts: Vec<FactRecord>,
    /// Results excluded for missing join keys
    pub unresolved: Vec<UnresolvedReference>,
}

impl FactBuild {
    /// Number of excluded results.
    pub fn unresolved_count(&self) -> usize {
        self.unresolved.len()
    }
}

/// Derive the combined race timestamp.
///
/// Falls back to midnight when the optional time component is absent or
/// unparseable; never fails the record.
pub fn race_timestamp(date: NaiveDate, time: Option<&str>) -> NaiveDateTime {
    let parsed = time.and_then(|t| {
        let trimmed = t.trim().trim_end_matches('Z');
        NaiveTime::parse_from_str(trimmed, "%H:%M:%S").ok()
    });
    match parsed {
        Some(time) => date.and_time(time),
        None => date.and_time(NaiveTime::MIN),
    }
}

/// The fact builder.
#[derive(Debug, Default)]
pub struct FactBuilder;

impl FactBuilder {
    /// Create a new fact builder.
    pub fn new() -> Self {
        Self
    }

    /// Build fact records from a store snapshot.
    ///
    /// Restartable: the build reads only the snapshot and can be re-run at
    /// any time with the same outcome.
    pub fn build(&self, snapshot: &CuratedStore, scope: &FactScope) -> FactBuild {
        let mut build = FactBuild::default();

        for result in snapshot.results.iter() {
            if let FactScope::Drop(drop_id) = scope {
                if result.provenance.drop_id != *drop_id {
                    continue;
                }
            }

            let Some(race) = snapshot.races.get(&result.race_id) else {
                debug!(race_id = result.race_id, driver_id = result.driver_id, "unresolved race");
                build.unresolved.push(UnresolvedReference {
                    race_id: result.race_id,
                    driver_id: result.driver_id,
                    missing: EntityKind::Race,
                    missing_id: result.race_id,
                });
                continue;
            };

            if let FactScope::Season(season) = scope {
                if race.year != *season {
                    continue;
                }
            }

            let Some(driver) = snapshot.drivers.get(&result.driver_id) else {
                build.unresolved.push(UnresolvedReference {
                    race_id: result.race_id,
                    driver_id: result.driver_id,
                    missing: EntityKind::Driver,
                    missing_id: result.driver_id,
                });
                continue;
            };

            let Some(constructor) = snapshot.constructors.get(&result.constructor_id) else {
                build.unresolved.push(UnresolvedReference {
                    race_id: result.race_id,
                    driver_id: result.driver_id,
                    missing: EntityKind::Constructor,
                    missing_id: result.constructor_id,
                });
                continue;
            };

            let Some(circuit) = snapshot.circuits.get(&race.circuit_id) else {
                build.unresolved.push(UnresolvedReference {
                    race_id: result.race_id,
                    driver_id: result.driver_id,
                    missing: EntityKind::Circuit,
                    missing_id: race.circuit_id,
                });
                continue;
            };

            build.facts.push(FactRecord {
                season: race.year,
                round: race.round,
                race_id: race.race_id,
                race_name: race.name.clone(),
                race_timestamp: race_timestamp(race.race_date, race.race_time.as_deref()),
                circuit_location: circuit.location.clone(),
                driver_id: driver.driver_id,
                driver_ref: driver.driver_ref.clone(),
                driver_name: driver.name.full(),
                driver_number: driver.number,
                driver_nationality: driver.nationality.clone(),
                constructor_id: constructor.constructor_id,
                constructor_ref: constructor.constructor_ref.clone(),
                constructor_name: constructor.name.clone(),
                grid: result.grid,
                fastest_lap: result.fastest_lap,
                race_time: result.race_time.clone(),
                points: result.points,
                position: result.position,
                drop_id: result.provenance.drop_id.clone(),
            });
        }

        info!(
            scope = ?scope,
            emitted = build.facts.len(),
            unresolved = build.unresolved.len(),
            "fact build complete"
        );
        build
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_combines_date_and_time() {
        let date = NaiveDate::from_ymd_opt(2021, 3, 28).unwrap();
        let ts = race_timestamp(date, Some("15:00:00"));
        assert_eq!(ts.to_string(), "2021-03-28 15:00:00");
    }

    #[test]
    fn test_timestamp_accepts_utc_suffix() {
        let date = NaiveDate::from_ymd_opt(2021, 3, 28).unwrap();
        let ts = race_timestamp(date, Some("15:00:00Z"));
        assert_eq!(ts.to_string(), "2021-03-28 15:00:00");
    }

    #[test]
    fn test_timestamp_falls_back_to_date_only() {
        let date = NaiveDate::from_ymd_opt(2021, 3, 28).unwrap();
        assert_eq!(race_timestamp(date, None).to_string(), "2021-03-28 00:00:00");
        assert_eq!(
            race_timestamp(date, Some("garbage")).to_string(),
            "2021-03-28 00:00:00"
        );
    }
}
