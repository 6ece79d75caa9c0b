//! Turns raw season rows into the analysis-ready [`MatchTable`].
//!
//! Cells that fail to parse never abort preprocessing: they are stored as
//! absent (or zero for plain counts) and counted in [`DataQuality`]. Rows
//! missing a usable date, team, side or score are left out and listed with
//! the reason.

pub mod pairs;

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{info, warn};

use crate::error::{ParseWarning, Result, StatsError};
use crate::loader::{CorruptRecord, RawRow, RawTable};
use crate::parser::{
    PercentageStat, parse_count, parse_date, parse_decimal, parse_percentage_string,
    parse_possession, parse_score,
};
use crate::stats::{DerivedStats, MatchRow, MatchStats, Side};

use pairs::{PairIssue, check_match_pairs};

/// Column names used by the scraped season files.
pub mod columns {
    pub const DATE: &str = "Date";
    pub const MATCH: &str = "Match";
    pub const TEAM: &str = "Team";
    pub const OPPONENT: &str = "Opponent";
    pub const SIDE: &str = "Side";
    pub const ROUND: &str = "Round";
    pub const SCORE: &str = "Score";
    pub const POINTS: &str = "points";
    pub const GOAL_SCORED: &str = "Goal scored";
    pub const GOAL_CONCEDED: &str = "Goal conceded";

    pub const XG: &str = "Expected goals (xG)";
    pub const XG_OPEN_PLAY: &str = "xG open play";
    pub const XG_SET_PLAY: &str = "xG set play";
    pub const NON_PENALTY_XG: &str = "Non-penalty xG";
    pub const XGOT: &str = "xG on target (xGOT)";

    pub const TOTAL_SHOTS: &str = "Total shots";
    pub const SHOTS_ON_TARGET: &str = "Shots on target";
    pub const SHOTS_OFF_TARGET: &str = "Shots off target";
    pub const BLOCKED_SHOTS: &str = "Blocked shots";
    pub const HIT_WOODWORK: &str = "Hit woodwork";
    pub const SHOTS_INSIDE_BOX: &str = "Shots inside box";
    pub const SHOTS_OUTSIDE_BOX: &str = "Shots outside box";
    pub const BIG_CHANCES: &str = "Big chances";
    pub const BIG_CHANCES_MISSED: &str = "Big chances missed";

    pub const BALL_POSSESSION: &str = "Ball possession";
    pub const PASSES: &str = "Passes";
    pub const OWN_HALF: &str = "Own half";
    pub const OPPOSITION_HALF: &str = "Opposition half";
    pub const ACCURATE_PASSES: &str = "Accurate passes";
    pub const ACCURATE_LONG_BALLS: &str = "Accurate long balls";
    pub const ACCURATE_CROSSES: &str = "Accurate crosses";
    pub const THROWS: &str = "Throws";
    pub const TOUCHES_IN_OPPOSITION_BOX: &str = "Touches in opposition box";
    pub const OFFSIDES: &str = "Offsides";
    pub const CORNERS: &str = "Corners";

    pub const FOULS_COMMITTED: &str = "Fouls committed";
    pub const YELLOW_CARDS: &str = "Yellow cards";
    pub const RED_CARDS: &str = "Red cards";
    pub const TACKLES: &str = "Tackles";
    pub const INTERCEPTIONS: &str = "Interceptions";
    pub const BLOCKS: &str = "Blocks";
    pub const CLEARANCES: &str = "Clearances";
    pub const KEEPER_SAVES: &str = "Keeper saves";
    pub const DUELS_WON: &str = "Duels won";
    pub const GROUND_DUELS_WON: &str = "Ground duels won";
    pub const AERIAL_DUELS_WON: &str = "Aerial duels won";
    pub const SUCCESSFUL_DRIBBLES: &str = "Successful dribbles";

    pub const KNOWN: &[&str] = &[
        DATE, MATCH, TEAM, OPPONENT, SIDE, ROUND, SCORE, POINTS, GOAL_SCORED,
        GOAL_CONCEDED, XG, XG_OPEN_PLAY, XG_SET_PLAY, NON_PENALTY_XG, XGOT,
        TOTAL_SHOTS, SHOTS_ON_TARGET, SHOTS_OFF_TARGET, BLOCKED_SHOTS, HIT_WOODWORK,
        SHOTS_INSIDE_BOX, SHOTS_OUTSIDE_BOX, BIG_CHANCES, BIG_CHANCES_MISSED,
        BALL_POSSESSION, PASSES, OWN_HALF, OPPOSITION_HALF, ACCURATE_PASSES,
        ACCURATE_LONG_BALLS, ACCURATE_CROSSES, THROWS, TOUCHES_IN_OPPOSITION_BOX,
        OFFSIDES, CORNERS, FOULS_COMMITTED, YELLOW_CARDS, RED_CARDS, TACKLES,
        INTERCEPTIONS, BLOCKS, CLEARANCES, KEEPER_SAVES, DUELS_WON, GROUND_DUELS_WON,
        AERIAL_DUELS_WON, SUCCESSFUL_DRIBBLES,
    ];
}

use columns::*;

/// Why a raw row was left out of the analysis table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ExcludeReason {
    MissingTeam,
    InvalidDate(String),
    InvalidSide(String),
    InvalidScore(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExcludedRow {
    pub season: String,
    pub line: u64,
    pub reason: ExcludeReason,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellWarning {
    pub season: String,
    pub line: u64,
    pub column: String,
    pub warning: String,
}

/// The file's `points` column disagreed with the points derived from the goals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointsMismatch {
    pub season: String,
    pub line: u64,
    pub team: String,
    pub reported: u32,
    pub derived: u32,
}

/// Data-quality report produced alongside every [`MatchTable`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DataQuality {
    pub rows_read: usize,
    pub rows_kept: usize,
    pub excluded_rows: Vec<ExcludedRow>,
    pub cell_warnings: Vec<CellWarning>,
    pub points_mismatches: Vec<PointsMismatch>,
    pub corrupt_records: Vec<CorruptRecord>,
    pub pair_issues: Vec<PairIssue>,
}

impl DataQuality {
    pub fn is_clean(&self) -> bool {
        self.excluded_rows.is_empty()
            && self.cell_warnings.is_empty()
            && self.points_mismatches.is_empty()
            && self.corrupt_records.is_empty()
            && self.pair_issues.is_empty()
    }

    pub fn warnings_by_column(&self) -> BTreeMap<&str, usize> {
        let mut counts = BTreeMap::new();
        for w in &self.cell_warnings {
            *counts.entry(w.column.as_str()).or_default() += 1;
        }
        counts
    }

    /// The part of the report that concerns `season`.
    pub fn for_season(&self, season: &str) -> DataQuality {
        fn keep<T: Clone>(items: &[T], pred: impl Fn(&T) -> bool) -> Vec<T> {
            items.iter().filter(|&i| pred(i)).cloned().collect()
        }

        let excluded_rows = keep(&self.excluded_rows, |r| r.season == season);
        let pair_issues = keep(&self.pair_issues, |p| p.season == season);
        let cell_warnings = keep(&self.cell_warnings, |w| w.season == season);
        let points_mismatches = keep(&self.points_mismatches, |m| m.season == season);
        let corrupt_records = keep(&self.corrupt_records, |c| c.season == season);

        DataQuality {
            rows_read: 0,
            rows_kept: 0,
            excluded_rows,
            cell_warnings,
            points_mismatches,
            corrupt_records,
            pair_issues,
        }
    }

    fn record_warning(&mut self, row: &RawRow, column: &str, warning: ParseWarning) {
        self.cell_warnings.push(CellWarning {
            season: row.season().to_string(),
            line: row.line(),
            column: column.to_string(),
            warning: warning.to_string(),
        });
    }
}

/// The analysis-ready table. Read-only once built.
#[derive(Debug, Clone, Default)]
pub struct MatchTable {
    rows: Vec<MatchRow>,
    seasons: Vec<String>,
    quality: DataQuality,
}

impl MatchTable {
    pub fn rows(&self) -> &[MatchRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Every loaded season label, in load order, including seasons whose
    /// rows were all excluded.
    pub fn available_seasons(&self) -> &[String] {
        &self.seasons
    }

    pub fn quality(&self) -> &DataQuality {
        &self.quality
    }

    /// Sorted, de-duplicated team names.
    pub fn available_teams(&self) -> Vec<&str> {
        self.rows
            .iter()
            .map(|r| r.team.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn has_season(&self, season: &str) -> bool {
        self.seasons.iter().any(|s| s == season)
    }

    /// # Errors
    ///
    /// [`StatsError::InvalidSeason`] when `season` was never loaded.
    pub fn require_season(&self, season: &str) -> Result<()> {
        if self.has_season(season) {
            Ok(())
        } else {
            Err(StatsError::InvalidSeason {
                season: season.to_string(),
                available: self.seasons.clone(),
            })
        }
    }

    /// Rows of one season in table order.
    pub fn season_rows<'a>(
        &'a self,
        season: &str,
    ) -> Result<impl Iterator<Item = &'a MatchRow> + use<'a>> {
        self.require_season(season)?;
        let season = season.to_string();
        Ok(self.rows.iter().filter(move |r| r.season == season))
    }

    /// A team's rows of one season in chronological order (ties keep table order).
    pub fn team_rows(&self, team: &str, season: &str) -> Result<Vec<&MatchRow>> {
        let mut rows: Vec<&MatchRow> = self
            .season_rows(season)?
            .filter(|r| r.team == team)
            .collect();
        rows.sort_by_key(|r| r.chrono_key());
        Ok(rows)
    }

    /// Teams appearing (as `team`) in one season, sorted.
    pub fn season_teams(&self, season: &str) -> Result<Vec<&str>> {
        Ok(self
            .season_rows(season)?
            .map(|r| r.team.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect())
    }

    pub fn row(&self, index: usize) -> Option<&MatchRow> {
        self.rows.iter().find(|r| r.index == index)
    }

    #[cfg(test)]
    pub(crate) fn from_rows(rows: Vec<MatchRow>, seasons: &[&str]) -> Self {
        MatchTable {
            rows,
            seasons: seasons.iter().map(|s| s.to_string()).collect(),
            quality: DataQuality::default(),
        }
    }
}

/// Returns the rows of `season` as a table of their own.
///
/// # Errors
///
/// [`StatsError::InvalidSeason`] when the label is not present in `table`.
/// A known season without rows yields an empty table.
pub fn filter_by_season(table: &MatchTable, season: &str) -> Result<MatchTable> {
    let rows: Vec<MatchRow> = table.season_rows(season)?.cloned().collect();

    let mut quality = table.quality.for_season(season);
    quality.rows_kept = rows.len();
    quality.rows_read = rows.len() + quality.excluded_rows.len();

    Ok(MatchTable {
        rows,
        seasons: vec![season.to_string()],
        quality,
    })
}

/// Parses, validates and enriches every raw row.
#[tracing::instrument(skip(raw), fields(rows = raw.len()))]
pub fn preprocess(raw: &RawTable) -> MatchTable {
    let mut quality = DataQuality {
        rows_read: raw.len(),
        corrupt_records: raw.corrupt_records.clone(),
        ..Default::default()
    };
    let mut rows = Vec::with_capacity(raw.len());

    for raw_row in &raw.rows {
        match build_row(rows.len(), raw_row, &mut quality) {
            Ok(row) => rows.push(row),
            Err(reason) => quality.excluded_rows.push(ExcludedRow {
                season: raw_row.season().to_string(),
                line: raw_row.line(),
                reason,
            }),
        }
    }

    quality.rows_kept = rows.len();
    quality.pair_issues = check_match_pairs(&rows);

    if !quality.excluded_rows.is_empty() {
        warn!(excluded = quality.excluded_rows.len(), "Rows excluded from analysis");
    }
    if !quality.pair_issues.is_empty() {
        warn!(issues = quality.pair_issues.len(), "Match pair inconsistencies found");
    }
    info!(
        kept = quality.rows_kept,
        cell_warnings = quality.cell_warnings.len(),
        points_mismatches = quality.points_mismatches.len(),
        "Preprocessing complete"
    );

    MatchTable {
        rows,
        seasons: raw.seasons.clone(),
        quality,
    }
}

/// Reads cells of one raw row, recording parse warnings as it goes.
struct Cells<'a> {
    raw: &'a RawRow,
    quality: &'a mut DataQuality,
}

impl Cells<'_> {
    fn parse<T>(
        &mut self,
        column: &str,
        f: impl Fn(&str) -> std::result::Result<T, ParseWarning>,
    ) -> Option<T> {
        let value = self.raw.get(column)?;
        match f(value) {
            Ok(v) => Some(v),
            Err(w) => {
                self.quality.record_warning(self.raw, column, w);
                None
            }
        }
    }

    fn count(&mut self, column: &str) -> u32 {
        self.parse(column, parse_count).unwrap_or(0)
    }

    /// `None` when the column is missing or the cell is blank.
    fn optional_count(&mut self, column: &str) -> Option<u32> {
        match self.raw.get(column) {
            Some(v) if !v.trim().is_empty() => self.parse(column, parse_count),
            _ => None,
        }
    }

    fn decimal(&mut self, column: &str) -> f64 {
        self.parse(column, parse_decimal).unwrap_or(0.0)
    }

    fn percentage(&mut self, column: &str) -> PercentageStat {
        self.parse(column, parse_percentage_string).unwrap_or_default()
    }

    fn possession(&mut self, column: &str) -> Option<f64> {
        self.parse(column, parse_possession).flatten()
    }

    fn text(&self, column: &str) -> String {
        self.raw.get(column).unwrap_or_default().trim().to_string()
    }
}

fn build_row(
    index: usize,
    raw: &RawRow,
    quality: &mut DataQuality,
) -> std::result::Result<MatchRow, ExcludeReason> {
    let team = raw
        .get(TEAM)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(ExcludeReason::MissingTeam)?
        .to_string();

    let date_text = raw.get(DATE).unwrap_or_default().trim().to_string();
    let date: NaiveDate =
        parse_date(&date_text).map_err(|w| ExcludeReason::InvalidDate(w.value))?;

    let side_text = raw.get(SIDE).unwrap_or_default();
    let side = Side::parse(side_text)
        .ok_or_else(|| ExcludeReason::InvalidSide(side_text.trim().to_string()))?;

    let score = raw.get(SCORE).unwrap_or_default().trim().to_string();
    let (home, away) = parse_score(&score).map_err(|w| ExcludeReason::InvalidScore(w.value))?;
    let (score_for, score_against) = match side {
        Side::Home => (home, away),
        Side::Away => (away, home),
    };

    let mut cells = Cells { raw, quality };

    let opponent = cells.text(OPPONENT);
    let match_label = match cells.text(MATCH) {
        label if label.is_empty() => default_match_label(&team, &opponent, side),
        label => label,
    };
    let round = cells.optional_count(ROUND);
    let reported_points = cells.optional_count(POINTS);
    let goals_scored = cells.optional_count(GOAL_SCORED).unwrap_or(score_for);
    let goals_conceded = cells.optional_count(GOAL_CONCEDED).unwrap_or(score_against);

    let stats = MatchStats {
        xg: cells.decimal(XG),
        xg_open_play: cells.decimal(XG_OPEN_PLAY),
        xg_set_play: cells.decimal(XG_SET_PLAY),
        non_penalty_xg: cells.decimal(NON_PENALTY_XG),
        xgot: cells.decimal(XGOT),
        total_shots: cells.count(TOTAL_SHOTS),
        shots_on_target: cells.count(SHOTS_ON_TARGET),
        shots_off_target: cells.count(SHOTS_OFF_TARGET),
        blocked_shots: cells.count(BLOCKED_SHOTS),
        hit_woodwork: cells.count(HIT_WOODWORK),
        shots_inside_box: cells.count(SHOTS_INSIDE_BOX),
        shots_outside_box: cells.count(SHOTS_OUTSIDE_BOX),
        big_chances: cells.count(BIG_CHANCES),
        big_chances_missed: cells.count(BIG_CHANCES_MISSED),
        passes: cells.count(PASSES),
        own_half: cells.count(OWN_HALF),
        opposition_half: cells.count(OPPOSITION_HALF),
        accurate_passes: cells.percentage(ACCURATE_PASSES),
        accurate_long_balls: cells.percentage(ACCURATE_LONG_BALLS),
        accurate_crosses: cells.percentage(ACCURATE_CROSSES),
        throws: cells.count(THROWS),
        touches_in_opposition_box: cells.count(TOUCHES_IN_OPPOSITION_BOX),
        corners: cells.count(CORNERS),
        offsides: cells.count(OFFSIDES),
        tackles: cells.count(TACKLES),
        interceptions: cells.count(INTERCEPTIONS),
        blocks: cells.count(BLOCKS),
        clearances: cells.count(CLEARANCES),
        keeper_saves: cells.count(KEEPER_SAVES),
        duels_won: cells.percentage(DUELS_WON),
        ground_duels_won: cells.percentage(GROUND_DUELS_WON),
        aerial_duels_won: cells.percentage(AERIAL_DUELS_WON),
        successful_dribbles: cells.percentage(SUCCESSFUL_DRIBBLES),
        fouls_committed: cells.count(FOULS_COMMITTED),
        yellow_cards: cells.count(YELLOW_CARDS),
        red_cards: cells.count(RED_CARDS),
        possession_pct: cells.possession(BALL_POSSESSION),
    };

    let derived = DerivedStats::compute(goals_scored, goals_conceded, &stats);

    if let Some(reported) = reported_points.filter(|p| *p != derived.points) {
        quality.points_mismatches.push(PointsMismatch {
            season: raw.season().to_string(),
            line: raw.line(),
            team: team.clone(),
            reported,
            derived: derived.points,
        });
    }

    let extra = raw
        .columns()
        .filter(|(name, _)| !name.is_empty() && !KNOWN.contains(name))
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect();

    Ok(MatchRow {
        index,
        season: raw.season().to_string(),
        line: raw.line(),
        date,
        date_text,
        match_label,
        team,
        opponent,
        side,
        round,
        score,
        goals_scored,
        goals_conceded,
        reported_points,
        stats,
        derived,
        extra,
    })
}

fn default_match_label(team: &str, opponent: &str, side: Side) -> String {
    match side {
        Side::Home => format!("{team} vs {opponent}"),
        Side::Away => format!("{opponent} vs {team}"),
    }
}
