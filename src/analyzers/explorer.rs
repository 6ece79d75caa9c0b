//! Single-match views: the opponent's row and the surrounding fixtures.

use serde::Serialize;

use crate::analyzers::types::ResultLine;
use crate::error::{Result, StatsError};
use crate::preprocess::{MatchTable, pairs};
use crate::stats::MatchRow;

/// The opponent's row of the match `row` describes.
pub fn find_counterpart<'a>(table: &'a MatchTable, row: &MatchRow) -> Option<&'a MatchRow> {
    pairs::find_counterpart(table.rows(), row)
}

/// One statistic for both sides of a match.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatLine {
    pub stat: &'static str,
    pub team: Option<f64>,
    pub opponent: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchContext {
    pub focus: ResultLine,
    pub counterpart: Option<ResultLine>,
    pub head_to_head: Vec<StatLine>,
    /// The team's matches around the focus match, in date order, focus included.
    pub surrounding: Vec<ResultLine>,
    /// Position of the focus match within `surrounding`.
    pub focus_position: usize,
}

const HEAD_TO_HEAD: &[(&str, fn(&MatchRow) -> Option<f64>)] = &[
    ("Goals", |r| Some(r.goals_scored as f64)),
    ("Expected goals (xG)", |r| Some(r.stats.xg)),
    ("Total shots", |r| Some(r.stats.total_shots as f64)),
    ("Shots on target", |r| Some(r.stats.shots_on_target as f64)),
    ("Big chances", |r| Some(r.stats.big_chances as f64)),
    ("Ball possession", |r| r.stats.possession_pct),
    ("Passes", |r| Some(r.stats.passes as f64)),
    ("Pass accuracy", |r| r.stats.accurate_passes.pct),
    ("Corners", |r| Some(r.stats.corners as f64)),
    ("Tackles", |r| Some(r.stats.tackles as f64)),
    ("Fouls committed", |r| Some(r.stats.fouls_committed as f64)),
];

/// A match of `team` with up to `radius` of the team's matches on each side.
///
/// # Errors
///
/// [`StatsError::InvalidParameter`] when `row_index` is not one of the
/// team's matches in `season`.
pub fn match_context(
    table: &MatchTable,
    team: &str,
    season: &str,
    row_index: usize,
    radius: usize,
) -> Result<MatchContext> {
    let rows = table.team_rows(team, season)?;
    let pos = rows
        .iter()
        .position(|r| r.index == row_index)
        .ok_or_else(|| StatsError::InvalidParameter {
            name: "row_index",
            reason: format!("row {row_index} is not a {season} match of {team}"),
        })?;

    let focus = rows[pos];
    let counterpart = find_counterpart(table, focus);
    let start = pos.saturating_sub(radius);
    let end = (pos + radius + 1).min(rows.len());

    Ok(MatchContext {
        focus: ResultLine::from(focus),
        counterpart: counterpart.map(ResultLine::from),
        head_to_head: HEAD_TO_HEAD
            .iter()
            .map(|&(stat, value)| StatLine {
                stat,
                team: value(focus),
                opponent: counterpart.and_then(value),
            })
            .collect(),
        surrounding: rows[start..end].iter().map(|&r| ResultLine::from(r)).collect(),
        focus_position: pos - start,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::fixture;

    #[test]
    fn test_counterpart_lookup() {
        let table = table();
        let row = table.row(0).unwrap();
        let other = find_counterpart(&table, row).unwrap();
        assert_eq!(other.team, "Chelsea");
        assert_eq!(other.goals_scored, row.goals_conceded);
    }

    #[test]
    fn test_match_context_window() {
        let table = table();
        // Arsenal's round 2 match is row 2
        let ctx = match_context(&table, "Arsenal", "2023-2024", 2, 1).unwrap();
        assert_eq!(ctx.focus.opponent, "Liverpool");
        assert_eq!(ctx.counterpart.as_ref().map(|c| c.team.as_str()), Some("Liverpool"));
        assert_eq!(ctx.surrounding.len(), 3);
        assert_eq!(ctx.focus_position, 1);
        assert_eq!(ctx.head_to_head[0].team, Some(1.0));
        assert_eq!(ctx.head_to_head[0].opponent, Some(3.0));

        let edge = match_context(&table, "Arsenal", "2023-2024", 0, 2).unwrap();
        assert_eq!(edge.focus_position, 0);
        assert_eq!(edge.surrounding.len(), 3);
    }

    #[test]
    fn test_match_context_rejects_foreign_row() {
        let table = table();
        // row 1 is Chelsea's
        let err = match_context(&table, "Arsenal", "2023-2024", 1, 2).unwrap_err();
        assert!(matches!(err, StatsError::InvalidParameter { name: "row_index", .. }));
    }

    fn table() -> MatchTable {
        let rows: Vec<_> = [
            fixture(0, 1, "Arsenal", "Chelsea", 2, 1),
            fixture(2, 2, "Arsenal", "Liverpool", 1, 3),
            fixture(4, 3, "Everton", "Arsenal", 0, 0),
        ]
        .into_iter()
        .flatten()
        .collect();
        MatchTable::from_rows(rows, &["2023-2024"])
    }
}
