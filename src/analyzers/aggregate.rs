use tracing::debug;

use crate::analyzers::types::{HomeAwaySplit, TeamComparison, TeamSeasonSummary};
use crate::analyzers::utility::{per_game, sum_u32};
use crate::error::Result;
use crate::metrics::attacking::AttackingMetrics;
use crate::metrics::defensive::DefensiveMetrics;
use crate::metrics::possession::PossessionMetrics;
use crate::preprocess::MatchTable;
use crate::stats::{MatchRow, Outcome, Side, goal_difference};

fn count(rows: &[&MatchRow], f: impl Fn(&MatchRow) -> bool) -> u32 {
    rows.iter().filter(|r| f(r)).count() as u32
}

/// Summarises any subset of a team's rows.
///
/// Shared by the season summary, the home/away split and form, so every
/// subset is totalled the same way.
pub fn summarize(team: &str, season: &str, rows: &[&MatchRow]) -> TeamSeasonSummary {
    let matches = rows.len();
    let points = sum_u32(rows, |r| r.points());
    let goals_for = sum_u32(rows, |r| r.goals_scored);
    let goals_against = sum_u32(rows, |r| r.goals_conceded);
    let is_win = |r: &MatchRow| r.outcome() == Outcome::Win;

    TeamSeasonSummary {
        team: team.to_string(),
        season: season.to_string(),
        matches_played: matches,
        wins: count(rows, is_win),
        draws: count(rows, |r| r.outcome() == Outcome::Draw),
        losses: count(rows, |r| r.outcome() == Outcome::Loss),
        points,
        points_per_game: per_game(points as f64, matches),
        goals_for,
        goals_against,
        goal_difference: goal_difference(goals_for, goals_against),
        clean_sheets: count(rows, |r| r.derived.is_clean_sheet),
        home_wins: count(rows, |r| r.side == Side::Home && is_win(r)),
        away_wins: count(rows, |r| r.side == Side::Away && is_win(r)),
        attacking: AttackingMetrics::from_rows(rows),
        defensive: DefensiveMetrics::from_rows(rows),
        possession: PossessionMetrics::from_rows(rows),
    }
}

/// Season totals and averaged metrics for one team.
///
/// A team with no rows in the season gets a zeroed summary.
///
/// # Errors
///
/// [`StatsError::InvalidSeason`](crate::error::StatsError::InvalidSeason)
/// when `season` was never loaded.
pub fn get_season_summary(
    table: &MatchTable,
    team: &str,
    season: &str,
) -> Result<TeamSeasonSummary> {
    let rows = table.team_rows(team, season)?;
    debug!(team, season, matches = rows.len(), "Summarising season");
    Ok(summarize(team, season, &rows))
}

/// Summaries of a team's home and away matches.
///
/// The two halves add up to the full season summary.
pub fn get_home_away_split(table: &MatchTable, team: &str, season: &str) -> Result<HomeAwaySplit> {
    let (home, away): (Vec<&MatchRow>, Vec<&MatchRow>) = table
        .team_rows(team, season)?
        .into_iter()
        .partition(|r| r.side == Side::Home);

    Ok(HomeAwaySplit {
        home: summarize(team, season, &home),
        away: summarize(team, season, &away),
    })
}

/// Metric sets for several teams in one season, in the order given.
pub fn compare_teams(
    table: &MatchTable,
    teams: &[&str],
    season: &str,
) -> Result<Vec<TeamComparison>> {
    teams
        .iter()
        .map(|&team| {
            let rows = table.team_rows(team, season)?;
            Ok(TeamComparison {
                team: team.to_string(),
                attacking: AttackingMetrics::from_rows(&rows),
                defensive: DefensiveMetrics::from_rows(&rows),
                possession: PossessionMetrics::from_rows(&rows),
            })
        })
        .collect()
}
