//! Row builders shared by unit tests.

use chrono::NaiveDate;
use std::collections::BTreeMap;

use crate::stats::{DerivedStats, MatchRow, MatchStats, Side};

pub(crate) struct RowBuilder {
    row: MatchRow,
}

impl RowBuilder {
    pub(crate) fn new(team: &str, opponent: &str, side: Side, scored: u32, conceded: u32) -> Self {
        let stats = MatchStats::default();
        let (home, away) = match side {
            Side::Home => (scored, conceded),
            Side::Away => (conceded, scored),
        };
        Self {
            row: MatchRow {
                index: 0,
                season: "2023-2024".to_string(),
                line: 2,
                date: NaiveDate::from_ymd_opt(2023, 8, 12).unwrap(),
                date_text: String::new(),
                match_label: String::new(),
                team: team.to_string(),
                opponent: opponent.to_string(),
                side,
                round: Some(1),
                score: format!("{home} - {away}"),
                goals_scored: scored,
                goals_conceded: conceded,
                reported_points: None,
                derived: DerivedStats::compute(scored, conceded, &stats),
                stats,
                extra: BTreeMap::new(),
            },
        }
    }

    pub(crate) fn index(mut self, index: usize) -> Self {
        self.row.index = index;
        self.row.line = index as u64 + 2;
        self
    }

    pub(crate) fn season(mut self, season: &str) -> Self {
        self.row.season = season.to_string();
        self
    }

    pub(crate) fn round(mut self, round: u32) -> Self {
        self.row.round = Some(round);
        self
    }

    pub(crate) fn date(mut self, y: i32, m: u32, d: u32) -> Self {
        self.row.date = NaiveDate::from_ymd_opt(y, m, d).unwrap();
        self
    }

    pub(crate) fn stats(mut self, f: impl FnOnce(&mut MatchStats)) -> Self {
        f(&mut self.row.stats);
        self
    }

    pub(crate) fn build(mut self) -> MatchRow {
        self.row.derived =
            DerivedStats::compute(self.row.goals_scored, self.row.goals_conceded, &self.row.stats);
        self.row
    }
}

/// Both rows of one match, home side first.
pub(crate) fn fixture(
    index: usize,
    round: u32,
    home: &str,
    away: &str,
    home_goals: u32,
    away_goals: u32,
) -> [MatchRow; 2] {
    let date = (2023, 8, round.min(28));
    [
        RowBuilder::new(home, away, Side::Home, home_goals, away_goals)
            .index(index)
            .round(round)
            .date(date.0, date.1, date.2)
            .build(),
        RowBuilder::new(away, home, Side::Away, away_goals, home_goals)
            .index(index + 1)
            .round(round)
            .date(date.0, date.1, date.2)
            .build(),
    ]
}
