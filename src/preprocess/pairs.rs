//! Consistency checks between the two team-perspective rows of a match.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;

use crate::stats::MatchRow;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum PairProblem {
    /// No row for the opponent's side of this match.
    MissingCounterpart,
    /// More than one candidate row for the opponent's side.
    AmbiguousCounterpart(usize),
    GoalsMismatch {
        scored: u32,
        conceded: u32,
        counterpart_scored: u32,
        counterpart_conceded: u32,
    },
    SameSide,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairIssue {
    pub season: String,
    pub team: String,
    pub opponent: String,
    pub date: NaiveDate,
    pub round: Option<u32>,
    pub problem: PairProblem,
}

impl PairIssue {
    fn new(row: &MatchRow, problem: PairProblem) -> Self {
        Self {
            season: row.season.clone(),
            team: row.team.clone(),
            opponent: row.opponent.clone(),
            date: row.date,
            round: row.round,
            problem,
        }
    }
}

/// `true` when `other` is the opponent's record of the same match as `row`.
///
/// Rows are matched on season and swapped team names, then on round when
/// both rows carry one, otherwise on date.
pub fn is_counterpart(row: &MatchRow, other: &MatchRow) -> bool {
    row.index != other.index
        && row.season == other.season
        && row.team == other.opponent
        && row.opponent == other.team
        && match (row.round, other.round) {
            (Some(a), Some(b)) => a == b,
            _ => row.date == other.date,
        }
}

/// Finds the opponent's row for the match `row` describes.
pub fn find_counterpart<'a>(rows: &'a [MatchRow], row: &MatchRow) -> Option<&'a MatchRow> {
    rows.iter().find(|other| is_counterpart(row, other))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Fixture {
    Round(u32),
    Date(NaiveDate),
}

type PairKey<'a> = (&'a str, &'a str, &'a str, Fixture);

fn fixture(row: &MatchRow) -> Fixture {
    match row.round {
        Some(r) => Fixture::Round(r),
        None => Fixture::Date(row.date),
    }
}

/// Checks every row against its counterpart.
///
/// A missing or ambiguous counterpart is reported for the row that lacks
/// one; goal and side disagreements are reported once per pair.
pub fn check_match_pairs(rows: &[MatchRow]) -> Vec<PairIssue> {
    let mut by_key: HashMap<PairKey<'_>, Vec<&MatchRow>> = HashMap::new();
    for row in rows {
        by_key
            .entry((row.season.as_str(), row.team.as_str(), row.opponent.as_str(), fixture(row)))
            .or_default()
            .push(row);
    }

    let mut issues = Vec::new();

    for row in rows {
        let key = (row.season.as_str(), row.opponent.as_str(), row.team.as_str(), fixture(row));
        let candidates: Vec<&MatchRow> = by_key
            .get(&key)
            .map(|c| c.iter().copied().filter(|o| is_counterpart(row, o)).collect())
            .unwrap_or_default();

        // a counterpart missing its round is only reachable by date
        let candidates = if candidates.is_empty() {
            rows.iter().filter(|o| is_counterpart(row, o)).collect()
        } else {
            candidates
        };

        let other = match candidates.as_slice() {
            [] => {
                issues.push(PairIssue::new(row, PairProblem::MissingCounterpart));
                continue;
            }
            [other] => *other,
            many => {
                issues.push(PairIssue::new(row, PairProblem::AmbiguousCounterpart(many.len())));
                continue;
            }
        };

        if row.index > other.index {
            continue;
        }

        if row.goals_scored != other.goals_conceded || row.goals_conceded != other.goals_scored {
            issues.push(PairIssue::new(
                row,
                PairProblem::GoalsMismatch {
                    scored: row.goals_scored,
                    conceded: row.goals_conceded,
                    counterpart_scored: other.goals_scored,
                    counterpart_conceded: other.goals_conceded,
                },
            ));
        }

        if row.side == other.side {
            issues.push(PairIssue::new(row, PairProblem::SameSide));
        }
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::{DerivedStats, MatchStats, Side};
    use std::collections::BTreeMap;

    #[test]
    fn test_complementary_pair_has_no_issues() {
        let rows = vec![
            row(0, "Arsenal", "Chelsea", Side::Home, 2, 1),
            row(1, "Chelsea", "Arsenal", Side::Away, 1, 2),
        ];
        assert!(check_match_pairs(&rows).is_empty());
        assert_eq!(find_counterpart(&rows, &rows[0]).map(|r| r.index), Some(1));
        assert_eq!(find_counterpart(&rows, &rows[1]).map(|r| r.index), Some(0));
    }

    #[test]
    fn test_missing_counterpart() {
        let rows = vec![row(0, "Arsenal", "Chelsea", Side::Home, 2, 1)];
        let issues = check_match_pairs(&rows);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].problem, PairProblem::MissingCounterpart);
    }

    #[test]
    fn test_goal_mismatch_reported_once() {
        let rows = vec![
            row(0, "Arsenal", "Chelsea", Side::Home, 2, 1),
            row(1, "Chelsea", "Arsenal", Side::Away, 0, 2),
        ];
        let issues = check_match_pairs(&rows);
        assert_eq!(issues.len(), 1);
        assert!(matches!(issues[0].problem, PairProblem::GoalsMismatch { scored: 2, .. }));
    }

    #[test]
    fn test_same_side_reported() {
        let rows = vec![
            row(0, "Arsenal", "Chelsea", Side::Home, 1, 1),
            row(1, "Chelsea", "Arsenal", Side::Home, 1, 1),
        ];
        let issues = check_match_pairs(&rows);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].problem, PairProblem::SameSide);
    }

    #[test]
    fn test_reverse_fixture_in_other_round_is_not_counterpart() {
        let mut away_leg = row(1, "Chelsea", "Arsenal", Side::Away, 1, 2);
        away_leg.round = Some(20);
        let rows = vec![row(0, "Arsenal", "Chelsea", Side::Home, 2, 1), away_leg];
        assert_eq!(check_match_pairs(&rows).len(), 2);
    }

    #[test]
    fn test_counterpart_without_round_paired_by_date() {
        let mut away = row(1, "Chelsea", "Arsenal", Side::Away, 1, 2);
        away.round = None;
        let rows = vec![row(0, "Arsenal", "Chelsea", Side::Home, 2, 1), away];

        assert!(check_match_pairs(&rows).is_empty());
        assert_eq!(find_counterpart(&rows, &rows[0]).map(|r| r.index), Some(1));
        assert_eq!(find_counterpart(&rows, &rows[1]).map(|r| r.index), Some(0));
    }

    #[test]
    fn test_counterpart_without_round_on_other_date_is_missing() {
        let mut away = row(1, "Chelsea", "Arsenal", Side::Away, 1, 2);
        away.round = None;
        away.date = NaiveDate::from_ymd_opt(2024, 1, 20).unwrap();
        let rows = vec![row(0, "Arsenal", "Chelsea", Side::Home, 2, 1), away];

        let issues = check_match_pairs(&rows);
        assert_eq!(issues.len(), 2);
        assert!(issues.iter().all(|i| i.problem == PairProblem::MissingCounterpart));
    }

    #[test]
    fn test_duplicate_counterparts_are_ambiguous() {
        let rows = vec![
            row(0, "Arsenal", "Chelsea", Side::Home, 2, 1),
            row(1, "Chelsea", "Arsenal", Side::Away, 1, 2),
            row(2, "Chelsea", "Arsenal", Side::Away, 1, 2),
        ];
        let issues = check_match_pairs(&rows);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].team, "Arsenal");
        assert_eq!(issues[0].problem, PairProblem::AmbiguousCounterpart(2));
    }

    fn row(
        index: usize,
        team: &str,
        opponent: &str,
        side: Side,
        scored: u32,
        conceded: u32,
    ) -> MatchRow {
        let stats = MatchStats::default();
        MatchRow {
            index,
            season: "2023-2024".to_string(),
            line: index as u64 + 2,
            date: NaiveDate::from_ymd_opt(2023, 8, 12).unwrap(),
            date_text: "Saturday, August 12, 2023".to_string(),
            match_label: String::new(),
            team: team.to_string(),
            opponent: opponent.to_string(),
            side,
            round: Some(1),
            score: String::new(),
            goals_scored: scored,
            goals_conceded: conceded,
            reported_points: None,
            derived: DerivedStats::compute(scored, conceded, &stats),
            stats,
            extra: BTreeMap::new(),
        }
    }
}
