//! Models module for the SDK
//!
//! Defines the curated entity types produced by normalization and owned by
//! the curated store. Every entity carries:
//! - typed payload fields,
//! - an entity-specific natural key (see [`CuratedRecord`]),
//! - [`Provenance`] describing which drop the row came from.

pub mod circuit;
pub mod constructor;
pub mod driver;
pub mod kind;
pub mod provenance;
pub mod race;
pub mod record;
pub mod result;
pub mod session;

pub use circuit::Circuit;
pub use constructor::Constructor;
pub use driver::{Driver, DriverName};
pub use kind::EntityKind;
pub use provenance::Provenance;
pub use race::Race;
pub use record::{CuratedRecord, KeyError};
pub use result::RaceResult;
pub use session::{LapTime, PitStop, Qualifying};
