use std::cmp::Reverse;

use crate::analyzers::aggregate::summarize;
use crate::analyzers::types::{LeagueStanding, StandingRow};
use crate::error::Result;
use crate::preprocess::MatchTable;

/// League table for one season, built from each team's own rows.
///
/// Ranked by points, then goal difference, then goals scored, all
/// descending; remaining ties are broken by team name so positions are
/// always 1..=n without gaps.
#[tracing::instrument(skip(table))]
pub fn calculate_league_position(table: &MatchTable, season: &str) -> Result<LeagueStanding> {
    let mut rows = Vec::new();
    for team in table.season_teams(season)? {
        let team_rows = table.team_rows(team, season)?;
        let s = summarize(team, season, &team_rows);
        rows.push(StandingRow {
            position: 0,
            team: s.team,
            played: s.matches_played,
            won: s.wins,
            drawn: s.draws,
            lost: s.losses,
            goals_for: s.goals_for,
            goals_against: s.goals_against,
            goal_difference: s.goal_difference,
            points: s.points,
        });
    }

    rows.sort_by(|a, b| {
        (Reverse(a.points), Reverse(a.goal_difference), Reverse(a.goals_for), &a.team).cmp(&(
            Reverse(b.points),
            Reverse(b.goal_difference),
            Reverse(b.goals_for),
            &b.team,
        ))
    });
    for (i, row) in rows.iter_mut().enumerate() {
        row.position = i + 1;
    }

    Ok(LeagueStanding {
        season: season.to_string(),
        rows,
    })
}
