use serde::Serialize;

use crate::analyzers::utility::{mean_present, per_game, sum_u32};
use crate::stats::{MatchRow, pct};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DefensiveMetrics {
    pub matches: usize,
    pub total_goals_conceded: u32,
    pub goals_conceded_per_game: f64,
    pub clean_sheets: u32,
    pub clean_sheet_pct: f64,
    pub tackles_per_game: f64,
    pub interceptions_per_game: f64,
    pub blocks_per_game: f64,
    pub clearances_per_game: f64,
    pub defensive_actions_per_game: f64,
    pub saves_per_game: f64,
    pub total_tackles: u32,
    pub total_interceptions: u32,
    pub total_blocks: u32,
    pub total_clearances: u32,
    /// Mean of the per-match duels won percentage, over matches that report it.
    pub duels_won_pct: Option<f64>,
    pub aerial_duels_won_pct: Option<f64>,
}

impl DefensiveMetrics {
    pub fn from_rows(rows: &[&MatchRow]) -> Self {
        let matches = rows.len();
        let conceded = sum_u32(rows, |r| r.goals_conceded);
        let clean_sheets = rows.iter().filter(|r| r.derived.is_clean_sheet).count() as u32;
        let tackles = sum_u32(rows, |r| r.stats.tackles);
        let interceptions = sum_u32(rows, |r| r.stats.interceptions);
        let blocks = sum_u32(rows, |r| r.stats.blocks);
        let clearances = sum_u32(rows, |r| r.stats.clearances);
        let saves = sum_u32(rows, |r| r.stats.keeper_saves);
        let actions = tackles
            .saturating_add(interceptions)
            .saturating_add(blocks)
            .saturating_add(clearances);

        DefensiveMetrics {
            matches,
            total_goals_conceded: conceded,
            goals_conceded_per_game: per_game(conceded as f64, matches),
            clean_sheets,
            clean_sheet_pct: pct(clean_sheets as f64, matches as f64),
            tackles_per_game: per_game(tackles as f64, matches),
            interceptions_per_game: per_game(interceptions as f64, matches),
            blocks_per_game: per_game(blocks as f64, matches),
            clearances_per_game: per_game(clearances as f64, matches),
            defensive_actions_per_game: per_game(actions as f64, matches),
            saves_per_game: per_game(saves as f64, matches),
            total_tackles: tackles,
            total_interceptions: interceptions,
            total_blocks: blocks,
            total_clearances: clearances,
            duels_won_pct: mean_present(rows.iter().map(|r| r.stats.duels_won.pct)),
            aerial_duels_won_pct: mean_present(rows.iter().map(|r| r.stats.aerial_duels_won.pct)),
        }
    }
}
