//! Per-entity conversions from raw records
//!
//! Each curated entity declares its required fields here; the required-field
//! list is the de facto schema contract for that entity's raw files. A row
//! missing a required field (or carrying an uncoercible value) produces
//! field errors; optional fields degrade to `None`.

use crate::models::{
    Circuit, Constructor, Driver, EntityKind, LapTime, PitStop, Provenance, Qualifying, Race,
    RaceResult,
};

use super::raw::{FieldError, RawRecord};

/// Conversion from a raw record into a typed curated entity.
pub trait FromRaw: Sized {
    /// Entity kind produced by this conversion.
    const KIND: EntityKind;

    /// Convert one raw record, returning every offending field on failure.
    fn from_raw(raw: &RawRecord, provenance: Provenance) -> Result<Self, Vec<FieldError>>;
}

/// Collect the errors of failed extractions, in field order.
fn collect_errors(failed: Vec<Option<FieldError>>) -> Vec<FieldError> {
    failed.into_iter().flatten().collect()
}

impl FromRaw for Circuit {
    const KIND: EntityKind = EntityKind::Circuit;

    fn from_raw(raw: &RawRecord, provenance: Provenance) -> Result<Self, Vec<FieldError>> {
        let circuit_id = raw.require_i64("circuitId");
        let circuit_ref = raw.require_str("circuitRef");
        let name = raw.require_str("name");
        match (circuit_id, circuit_ref, name) {
            (Ok(circuit_id), Ok(circuit_ref), Ok(name)) => Ok(Circuit {
                circuit_id,
                circuit_ref,
                name,
                location: raw.optional_str("location"),
                country: raw.optional_str("country"),
                latitude: raw.optional_f64("lat"),
                longitude: raw.optional_f64("lng"),
                altitude: raw.optional_f64("alt"),
                provenance,
            }),
            (a, b, c) => Err(collect_errors(vec![a.err(), b.err(), c.err()])),
        }
    }
}

impl FromRaw for Race {
    const KIND: EntityKind = EntityKind::Race;

    fn from_raw(raw: &RawRecord, provenance: Provenance) -> Result<Self, Vec<FieldError>> {
        let race_id = raw.require_i64("raceId");
        let year = raw.require_i32("year");
        let round = raw.require_i32("round");
        let circuit_id = raw.require_i64("circuitId");
        let name = raw.require_str("name");
        let race_date = raw.require_date("date");
        match (race_id, year, round, circuit_id, name, race_date) {
            (Ok(race_id), Ok(year), Ok(round), Ok(circuit_id), Ok(name), Ok(race_date)) => {
                Ok(Race {
                    race_id,
                    year,
                    round,
                    circuit_id,
                    name,
                    race_date,
                    race_time: raw.optional_str("time"),
                    provenance,
                })
            }
            (a, b, c, d, e, f) => Err(collect_errors(vec![
                a.err(),
                b.err(),
                c.err(),
                d.err(),
                e.err(),
                f.err(),
            ])),
        }
    }
}

impl FromRaw for Constructor {
    const KIND: EntityKind = EntityKind::Constructor;

    fn from_raw(raw: &RawRecord, provenance: Provenance) -> Result<Self, Vec<FieldError>> {
        let constructor_id = raw.require_i64("constructorId");
        let constructor_ref = raw.require_str("constructorRef");
        let name = raw.require_str("name");
        match (constructor_id, constructor_ref, name) {
            (Ok(constructor_id), Ok(constructor_ref), Ok(name)) => Ok(Constructor {
                constructor_id,
                constructor_ref,
                name,
                nationality: raw.optional_str("nationality"),
                provenance,
            }),
            (a, b, c) => Err(collect_errors(vec![a.err(), b.err(), c.err()])),
        }
    }
}

impl FromRaw for Driver {
    const KIND: EntityKind = EntityKind::Driver;

    fn from_raw(raw: &RawRecord, provenance: Provenance) -> Result<Self, Vec<FieldError>> {
        let driver_id = raw.require_i64("driverId");
        let driver_ref = raw.require_str("driverRef");
        let name = raw.require_name("name");
        match (driver_id, driver_ref, name) {
            (Ok(driver_id), Ok(driver_ref), Ok(name)) => Ok(Driver {
                driver_id,
                driver_ref,
                number: raw.optional_i32("number"),
                code: raw.optional_str("code"),
                name,
                date_of_birth: raw.optional_date("dob"),
                nationality: raw.optional_str("nationality"),
                provenance,
            }),
            (a, b, c) => Err(collect_errors(vec![a.err(), b.err(), c.err()])),
        }
    }
}

impl FromRaw for RaceResult {
    const KIND: EntityKind = EntityKind::Result;

    fn from_raw(raw: &RawRecord, provenance: Provenance) -> Result<Self, Vec<FieldError>> {
        let race_id = raw.require_i64("raceId");
        let driver_id = raw.require_i64("driverId");
        let constructor_id = raw.require_i64("constructorId");
        match (race_id, driver_id, constructor_id) {
            (Ok(race_id), Ok(driver_id), Ok(constructor_id)) => Ok(RaceResult {
                result_id: raw.optional_i64("resultId"),
                race_id,
                driver_id,
                constructor_id,
                grid: raw.optional_i32("grid"),
                position: raw.optional_u32("position"),
                points: raw.optional_f64("points"),
                laps: raw.optional_i32("laps"),
                race_time: raw.optional_str("time"),
                fastest_lap: raw.optional_i32("fastestLap"),
                fastest_lap_time: raw.optional_str("fastestLapTime"),
                provenance,
            }),
            (a, b, c) => Err(collect_errors(vec![a.err(), b.err(), c.err()])),
        }
    }
}

impl FromRaw for PitStop {
    const KIND: EntityKind = EntityKind::PitStop;

    fn from_raw(raw: &RawRecord, provenance: Provenance) -> Result<Self, Vec<FieldError>> {
        let race_id = raw.require_i64("raceId");
        let driver_id = raw.require_i64("driverId");
        let stop = raw.require_i32("stop");
        match (race_id, driver_id, stop) {
            (Ok(race_id), Ok(driver_id), Ok(stop)) => Ok(PitStop {
                race_id,
                driver_id,
                stop,
                lap: raw.optional_i32("lap"),
                time: raw.optional_str("time"),
                duration: raw.optional_f64("duration"),
                provenance,
            }),
            (a, b, c) => Err(collect_errors(vec![a.err(), b.err(), c.err()])),
        }
    }
}

impl FromRaw for LapTime {
    const KIND: EntityKind = EntityKind::LapTime;

    fn from_raw(raw: &RawRecord, provenance: Provenance) -> Result<Self, Vec<FieldError>> {
        let race_id = raw.require_i64("raceId");
        let driver_id = raw.require_i64("driverId");
        let lap = raw.require_i32("lap");
        match (race_id, driver_id, lap) {
            (Ok(race_id), Ok(driver_id), Ok(lap)) => Ok(LapTime {
                race_id,
                driver_id,
                lap,
                position: raw.optional_i32("position"),
                time: raw.optional_str("time"),
                milliseconds: raw.optional_i64("milliseconds"),
                provenance,
            }),
            (a, b, c) => Err(collect_errors(vec![a.err(), b.err(), c.err()])),
        }
    }
}

impl FromRaw for Qualifying {
    const KIND: EntityKind = EntityKind::Qualifying;

    fn from_raw(raw: &RawRecord, provenance: Provenance) -> Result<Self, Vec<FieldError>> {
        let qualify_id = raw.require_i64("qualifyId");
        let race_id = raw.require_i64("raceId");
        let driver_id = raw.require_i64("driverId");
        let constructor_id = raw.require_i64("constructorId");
        match (qualify_id, race_id, driver_id, constructor_id) {
            (Ok(qualify_id), Ok(race_id), Ok(driver_id), Ok(constructor_id)) => Ok(Qualifying {
                qualify_id,
                race_id,
                driver_id,
                constructor_id,
                number: raw.optional_i32("number"),
                position: raw.optional_i32("position"),
                q1: raw.optional_str("q1"),
                q2: raw.optional_str("q2"),
                q3: raw.optional_str("q3"),
                provenance,
            }),
            (a, b, c, d) => Err(collect_errors(vec![a.err(), b.err(), c.err(), d.err()])),
        }
    }
}
