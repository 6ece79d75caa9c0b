//! Result types produced by the aggregators.

use chrono::NaiveDate;
use serde::Serialize;

use crate::metrics::attacking::AttackingMetrics;
use crate::metrics::defensive::DefensiveMetrics;
use crate::metrics::possession::PossessionMetrics;
use crate::stats::{MatchRow, Outcome, Side};

/// Everything known about one team's season, or any subset of it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TeamSeasonSummary {
    pub team: String,
    pub season: String,
    pub matches_played: usize,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    pub points: u32,
    pub points_per_game: f64,
    pub goals_for: u32,
    pub goals_against: u32,
    pub goal_difference: i32,
    pub clean_sheets: u32,
    pub home_wins: u32,
    pub away_wins: u32,
    pub attacking: AttackingMetrics,
    pub defensive: DefensiveMetrics,
    pub possession: PossessionMetrics,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HomeAwaySplit {
    pub home: TeamSeasonSummary,
    pub away: TeamSeasonSummary,
}

/// One match of a form sequence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormEntry {
    pub date: NaiveDate,
    pub round: Option<u32>,
    pub opponent: String,
    pub side: Side,
    pub score: String,
    pub goals_scored: u32,
    pub goals_conceded: u32,
    pub outcome: Outcome,
    pub points: u32,
}

impl From<&MatchRow> for FormEntry {
    fn from(row: &MatchRow) -> Self {
        FormEntry {
            date: row.date,
            round: row.round,
            opponent: row.opponent.clone(),
            side: row.side,
            score: row.score.clone(),
            goals_scored: row.goals_scored,
            goals_conceded: row.goals_conceded,
            outcome: row.outcome(),
            points: row.points(),
        }
    }
}

/// A team's most recent matches, oldest first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormSequence {
    pub team: String,
    pub season: String,
    pub requested: usize,
    pub entries: Vec<FormEntry>,
    /// One letter per entry, e.g. `"WWDLW"`.
    pub form: String,
    pub points: u32,
    /// Three points per entry returned.
    pub max_points: u32,
    pub summary: TeamSeasonSummary,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StandingRow {
    pub position: usize,
    pub team: String,
    pub played: usize,
    pub won: u32,
    pub drawn: u32,
    pub lost: u32,
    pub goals_for: u32,
    pub goals_against: u32,
    pub goal_difference: i32,
    pub points: u32,
}

impl StandingRow {
    pub const CSV_HEADER: &'static [&'static str] = &[
        "position",
        "team",
        "played",
        "won",
        "drawn",
        "lost",
        "goals_for",
        "goals_against",
        "goal_difference",
        "points",
    ];
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeagueStanding {
    pub season: String,
    pub rows: Vec<StandingRow>,
}

impl LeagueStanding {
    pub fn position_of(&self, team: &str) -> Option<usize> {
        self.rows.iter().find(|r| r.team == team).map(|r| r.position)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CumulativePoint {
    pub round: Option<u32>,
    pub date: NaiveDate,
    pub opponent: String,
    pub outcome: Outcome,
    pub points: u32,
    pub cumulative_points: u32,
}

/// A per-match value alongside its trailing rolling mean.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub opponent: String,
    pub value: f64,
    pub rolling: f64,
}

/// Attacking, defensive and possession metrics of one team.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamComparison {
    pub team: String,
    pub attacking: AttackingMetrics,
    pub defensive: DefensiveMetrics,
    pub possession: PossessionMetrics,
}

/// Flat, one-line view of a match row for listings and CSV export.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultLine {
    pub index: usize,
    pub season: String,
    pub date: NaiveDate,
    pub round: Option<u32>,
    pub team: String,
    pub opponent: String,
    pub side: Side,
    pub score: String,
    pub goals_scored: u32,
    pub goals_conceded: u32,
    pub result: String,
    pub points: u32,
    pub xg: f64,
    pub total_shots: u32,
    pub possession_pct: Option<f64>,
}

impl ResultLine {
    pub const CSV_HEADER: &'static [&'static str] = &[
        "index",
        "season",
        "date",
        "round",
        "team",
        "opponent",
        "side",
        "score",
        "goals_scored",
        "goals_conceded",
        "result",
        "points",
        "xg",
        "total_shots",
        "possession_pct",
    ];
}

impl From<&MatchRow> for ResultLine {
    fn from(row: &MatchRow) -> Self {
        ResultLine {
            index: row.index,
            season: row.season.clone(),
            date: row.date,
            round: row.round,
            team: row.team.clone(),
            opponent: row.opponent.clone(),
            side: row.side,
            score: row.score.clone(),
            goals_scored: row.goals_scored,
            goals_conceded: row.goals_conceded,
            result: row.outcome().letter().to_string(),
            points: row.points(),
            xg: row.stats.xg,
            total_shots: row.stats.total_shots,
            possession_pct: row.stats.possession_pct,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::RowBuilder;

    #[test]
    fn test_csv_headers_match_field_order() {
        let row = RowBuilder::new("Arsenal", "Chelsea", Side::Home, 2, 1).build();
        let standing = StandingRow {
            position: 1,
            team: "Arsenal".to_string(),
            played: 1,
            won: 1,
            drawn: 0,
            lost: 0,
            goals_for: 2,
            goals_against: 1,
            goal_difference: 1,
            points: 3,
        };

        assert_eq!(serialized_header(&ResultLine::from(&row)), ResultLine::CSV_HEADER);
        assert_eq!(serialized_header(&standing), StandingRow::CSV_HEADER);
    }

    fn serialized_header<T: Serialize>(record: &T) -> Vec<String> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.serialize(record).unwrap();
        let bytes = writer.into_inner().unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let header = text.lines().next().unwrap_or_default();
        header.split(',').map(str::to_string).collect()
    }
}
