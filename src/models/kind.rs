//! Entity kind enumeration

use serde::{Deserialize, Serialize};

/// The curated entity types the pipeline knows about.
///
/// One raw file per kind is expected in each drop; the kind also selects the
/// curated table a merge writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Circuit,
    Race,
    Constructor,
    Driver,
    Result,
    PitStop,
    LapTime,
    Qualifying,
}

impl EntityKind {
    /// All kinds, in the order drops are conventionally applied
    /// (referenced entities before the results that point at them).
    pub const ALL: [EntityKind; 8] = [
        EntityKind::Circuit,
        EntityKind::Race,
        EntityKind::Constructor,
        EntityKind::Driver,
        EntityKind::Result,
        EntityKind::PitStop,
        EntityKind::LapTime,
        EntityKind::Qualifying,
    ];

    /// Map a raw file stem (e.g. `results` from `results.json`) to a kind.
    pub fn from_file_stem(stem: &str) -> Option<Self> {
        match stem.to_lowercase().as_str() {
            "circuits" => Some(EntityKind::Circuit),
            "races" => Some(EntityKind::Race),
            "constructors" => Some(EntityKind::Constructor),
            "drivers" => Some(EntityKind::Driver),
            "results" => Some(EntityKind::Result),
            "pit_stops" | "pitstops" => Some(EntityKind::PitStop),
            "lap_times" | "laptimes" => Some(EntityKind::LapTime),
            "qualifying" => Some(EntityKind::Qualifying),
            _ => None,
        }
    }

    /// Stable lowercase name, matching the raw file stem convention.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Circuit => "circuits",
            EntityKind::Race => "races",
            EntityKind::Constructor => "constructors",
            EntityKind::Driver => "drivers",
            EntityKind::Result => "results",
            EntityKind::PitStop => "pit_stops",
            EntityKind::LapTime => "lap_times",
            EntityKind::Qualifying => "qualifying",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_stem_round_trip() {
        for kind in EntityKind::ALL {
            assert_eq!(EntityKind::from_file_stem(kind.as_str()), Some(kind));
        }
    }

    #[test]
    fn test_unknown_stem() {
        assert_eq!(EntityKind::from_file_stem("sponsors"), None);
    }
}
