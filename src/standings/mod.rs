//! Season standings aggregation
//!
//! Accumulates points and wins per competitor over a season's fact records
//! and emits a ranked ordering. The same algorithm serves driver and
//! constructor standings; only the grouping key differs.
//!
//! Ordering within a season is total: points descending, then wins
//! descending, then competitor id ascending as the final tie-break. Ranks
//! are dense: exact (points, wins) ties share a rank and the next distinct
//! pair advances the rank by exactly one.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::facts::FactRecord;

/// Which entity standings are grouped by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompetitorKind {
    Driver,
    Constructor,
}

impl std::fmt::Display for CompetitorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompetitorKind::Driver => f.write_str("driver"),
            CompetitorKind::Constructor => f.write_str("constructor"),
        }
    }
}

/// One ranked row of a season's standings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StandingRow {
    pub season: i32,
    pub competitor_id: i64,
    pub competitor_name: String,
    pub total_points: f64,
    pub wins: u32,
    /// Dense rank within the season, starting at 1
    pub rank: u32,
}

/// A season's computed standings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[must_use = "standings carry a defaulted-points count that should be checked"]
pub struct Standings {
    /// Ranked rows, in final order
    pub rows: Vec<StandingRow>,
    /// Fact records whose points were missing and contributed zero
    pub defaulted_points: usize,
}

struct Accumulator {
    name: String,
    points: f64,
    wins: u32,
}

/// The standings aggregator.
#[derive(Debug, Default)]
pub struct StandingsAggregator;

impl StandingsAggregator {
    /// Create a new aggregator.
    pub fn new() -> Self {
        Self
    }

    /// Aggregate one season's standings from fact records.
    ///
    /// Facts outside the season are ignored. A fact with missing points
    /// contributes zero and is counted under `defaulted_points`.
    pub fn aggregate(
        &self,
        facts: &[FactRecord],
        season: i32,
        competitor: CompetitorKind,
    ) -> Standings {
        let mut totals: BTreeMap<i64, Accumulator> = BTreeMap::new();
        let mut defaulted_points = 0;

        for fact in facts.iter().filter(|f| f.season == season) {
            let (id, name) = match competitor {
                CompetitorKind::Driver => (fact.driver_id, fact.driver_name.as_str()),
                CompetitorKind::Constructor => {
                    (fact.constructor_id, fact.constructor_name.as_str())
                }
            };
            let entry = totals.entry(id).or_insert_with(|| Accumulator {
                name: name.to_string(),
                points: 0.0,
                wins: 0,
            });
            match fact.points {
                Some(points) => entry.points += points,
                None => {
                    defaulted_points += 1;
                    warn!(
                        season,
                        %competitor,
                        race_id = fact.race_id,
                        driver_id = fact.driver_id,
                        "missing points treated as zero"
                    );
                }
            }
            if fact.position == Some(1) {
                entry.wins += 1;
            }
        }

        let mut rows: Vec<StandingRow> = totals
            .into_iter()
            .map(|(competitor_id, acc)| StandingRow {
                season,
                competitor_id,
                competitor_name: acc.name,
                total_points: acc.points,
                wins: acc.wins,
                rank: 0,
            })
            .collect();

        rows.sort_by(|a, b| {
            b.total_points
                .total_cmp(&a.total_points)
                .then(b.wins.cmp(&a.wins))
                .then(a.competitor_id.cmp(&b.competitor_id))
        });
        assign_dense_ranks(&mut rows);

        info!(
            season,
            %competitor,
            competitors = rows.len(),
            defaulted_points,
            "standings aggregated"
        );
        Standings {
            rows,
            defaulted_points,
        }
    }
}

/// Dense ranking over rows already in final order: exact (points, wins)
/// ties share a rank; the next distinct pair advances by exactly one.
fn assign_dense_ranks(rows: &mut [StandingRow]) {
    let mut rank = 0;
    let mut previous: Option<(f64, u32)> = None;
    for row in rows.iter_mut() {
        let key = (row.total_points, row.wins);
        let tied = previous
            .is_some_and(|(points, wins)| points.total_cmp(&key.0).is_eq() && wins == key.1);
        if !tied {
            rank += 1;
        }
        row.rank = rank;
        previous = Some(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn fact(season: i32, race_id: i64, driver_id: i64, points: Option<f64>, position: Option<u32>) -> FactRecord {
        FactRecord {
            season,
            round: 1,
            race_id,
            race_name: format!("race {race_id}"),
            race_timestamp: NaiveDate::from_ymd_opt(season, 3, 28)
                .unwrap_or_default()
                .and_hms_opt(0, 0, 0)
                .unwrap_or_default(),
            circuit_location: None,
            driver_id,
            driver_ref: format!("driver_{driver_id}"),
            driver_name: format!("Driver {driver_id}"),
            driver_number: None,
            driver_nationality: None,
            constructor_id: driver_id % 2 + 1,
            constructor_ref: "team".to_string(),
            constructor_name: "Team".to_string(),
            grid: None,
            fastest_lap: None,
            race_time: None,
            points,
            position,
            drop_id: "2021-01-01".to_string(),
        }
    }

    #[test]
    fn test_dense_ranking_shares_and_advances_by_one() {
        let facts = vec![
            fact(2021, 1, 10, Some(10.0), Some(2)),
            fact(2021, 1, 11, Some(10.0), Some(3)),
            fact(2021, 1, 12, Some(8.0), Some(4)),
        ];
        let standings = StandingsAggregator::new().aggregate(&facts, 2021, CompetitorKind::Driver);

        let ranks: Vec<(i64, u32)> = standings
            .rows
            .iter()
            .map(|r| (r.competitor_id, r.rank))
            .collect();
        assert_eq!(ranks, vec![(10, 1), (11, 1), (12, 2)]);
    }

    #[test]
    fn test_wins_break_points_ties_before_rank() {
        let facts = vec![
            fact(2021, 1, 10, Some(25.0), Some(1)),
            fact(2021, 2, 10, Some(0.0), None),
            fact(2021, 1, 11, Some(18.0), Some(2)),
            fact(2021, 2, 11, Some(7.0), Some(5)),
        ];
        // both on 25 points, driver 10 has a win
        let standings = StandingsAggregator::new().aggregate(&facts, 2021, CompetitorKind::Driver);

        assert_eq!(standings.rows[0].competitor_id, 10);
        assert_eq!(standings.rows[0].rank, 1);
        assert_eq!(standings.rows[1].competitor_id, 11);
        assert_eq!(standings.rows[1].rank, 2);
    }

    #[test]
    fn test_competitor_id_is_final_tie_break() {
        let facts = vec![
            fact(2021, 1, 11, Some(10.0), Some(2)),
            fact(2021, 1, 10, Some(10.0), Some(3)),
        ];
        let standings = StandingsAggregator::new().aggregate(&facts, 2021, CompetitorKind::Driver);

        assert_eq!(standings.rows[0].competitor_id, 10);
        assert_eq!(standings.rows[1].competitor_id, 11);
        assert_eq!(standings.rows[0].rank, 1);
        assert_eq!(standings.rows[1].rank, 1);
    }

    #[test]
    fn test_missing_points_default_to_zero_and_are_counted() {
        let facts = vec![
            fact(2021, 1, 10, None, Some(1)),
            fact(2021, 1, 11, Some(18.0), Some(2)),
        ];
        let standings = StandingsAggregator::new().aggregate(&facts, 2021, CompetitorKind::Driver);

        assert_eq!(standings.defaulted_points, 1);
        let row_10 = standings
            .rows
            .iter()
            .find(|r| r.competitor_id == 10)
            .unwrap();
        assert_eq!(row_10.total_points, 0.0);
        assert_eq!(row_10.wins, 1);
    }

    #[test]
    fn test_other_seasons_ignored() {
        let facts = vec![
            fact(2021, 1, 10, Some(25.0), Some(1)),
            fact(2020, 9, 10, Some(25.0), Some(1)),
        ];
        let standings = StandingsAggregator::new().aggregate(&facts, 2021, CompetitorKind::Driver);

        assert_eq!(standings.rows.len(), 1);
        assert_eq!(standings.rows[0].total_points, 25.0);
        assert_eq!(standings.rows[0].wins, 1);
    }

    #[test]
    fn test_constructor_grouping_sums_both_cars() {
        let mut fact_a = fact(2021, 1, 10, Some(25.0), Some(1));
        let mut fact_b = fact(2021, 1, 11, Some(18.0), Some(2));
        fact_a.constructor_id = 5;
        fact_b.constructor_id = 5;
        let standings = StandingsAggregator::new().aggregate(
            &[fact_a, fact_b],
            2021,
            CompetitorKind::Constructor,
        );

        assert_eq!(standings.rows.len(), 1);
        assert_eq!(standings.rows[0].competitor_id, 5);
        assert_eq!(standings.rows[0].total_points, 43.0);
        assert_eq!(standings.rows[0].wins, 1);
    }
}
