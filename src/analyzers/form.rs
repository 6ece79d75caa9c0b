use crate::analyzers::aggregate::summarize;
use crate::analyzers::types::{FormEntry, FormSequence};
use crate::error::{Result, StatsError};
use crate::preprocess::MatchTable;

/// A team's last `last_n` matches of a season, oldest first.
///
/// Fewer entries are returned when the team played fewer matches.
///
/// # Errors
///
/// [`StatsError::InvalidParameter`] when `last_n` is zero, and
/// [`StatsError::InvalidSeason`] for an unknown season.
pub fn get_form(
    table: &MatchTable,
    team: &str,
    season: &str,
    last_n: usize,
) -> Result<FormSequence> {
    if last_n == 0 {
        return Err(StatsError::InvalidParameter {
            name: "last_n",
            reason: "must be at least 1".to_string(),
        });
    }

    let rows = table.team_rows(team, season)?;
    let recent = &rows[rows.len().saturating_sub(last_n)..];

    let entries: Vec<FormEntry> = recent.iter().map(|&r| FormEntry::from(r)).collect();
    let form = entries.iter().map(|e| e.outcome.letter()).collect();
    let points = entries.iter().map(|e| e.points).sum();

    Ok(FormSequence {
        team: team.to_string(),
        season: season.to_string(),
        requested: last_n,
        max_points: 3 * entries.len() as u32,
        form,
        points,
        entries,
        summary: summarize(team, season, recent),
    })
}
