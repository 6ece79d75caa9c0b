//! Possession, passing and how well possession turns into results.

use serde::Serialize;

use crate::analyzers::utility::{mean, mean_present, per_game, sum_f64, sum_u32};
use crate::metrics::bands::{POSSESSION_BRACKETS, bracket};
use crate::metrics::{Insight, Severity};
use crate::stats::{MatchRow, Outcome, pct, ratio};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PossessionMetrics {
    pub matches: usize,
    /// Mean possession over matches that report it.
    pub avg_possession: Option<f64>,
    pub passes_per_game: f64,
    pub pass_accuracy_pct: Option<f64>,
    pub opp_half_passes_per_game: f64,
    pub own_half_passes_per_game: f64,
    pub long_ball_accuracy_pct: Option<f64>,
    pub cross_accuracy_pct: Option<f64>,
    pub touches_in_box_per_game: f64,
    pub corners_per_game: f64,
    pub successful_dribbles_per_game: f64,
    pub total_passes: u32,
    pub total_corners: u32,
}

impl PossessionMetrics {
    pub fn from_rows(rows: &[&MatchRow]) -> Self {
        let matches = rows.len();
        let passes = sum_u32(rows, |r| r.stats.passes);
        let corners = sum_u32(rows, |r| r.stats.corners);
        let dribbles = sum_u32(rows, |r| r.stats.successful_dribbles.count.unwrap_or(0));

        PossessionMetrics {
            matches,
            avg_possession: mean_present(rows.iter().map(|r| r.stats.possession_pct)),
            passes_per_game: per_game(passes as f64, matches),
            pass_accuracy_pct: mean_present(rows.iter().map(|r| r.stats.accurate_passes.pct)),
            opp_half_passes_per_game: per_game(
                sum_u32(rows, |r| r.stats.opposition_half) as f64,
                matches,
            ),
            own_half_passes_per_game: per_game(sum_u32(rows, |r| r.stats.own_half) as f64, matches),
            long_ball_accuracy_pct: mean_present(
                rows.iter().map(|r| r.stats.accurate_long_balls.pct),
            ),
            cross_accuracy_pct: mean_present(rows.iter().map(|r| r.stats.accurate_crosses.pct)),
            touches_in_box_per_game: per_game(
                sum_u32(rows, |r| r.stats.touches_in_opposition_box) as f64,
                matches,
            ),
            corners_per_game: per_game(corners as f64, matches),
            successful_dribbles_per_game: per_game(dribbles as f64, matches),
            total_passes: passes,
            total_corners: corners,
        }
    }
}

/// Possession at or above this share counts as dominating the ball.
const HIGH_POSSESSION: f64 = 55.0;
const LOW_POSSESSION: f64 = 45.0;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PossessionEffectiveness {
    pub high_possession_games: usize,
    pub high_possession_ppg: f64,
    pub high_possession_win_rate: f64,
    pub medium_possession_games: usize,
    pub medium_possession_ppg: f64,
    pub low_possession_games: usize,
    pub low_possession_ppg: f64,
    pub low_possession_win_rate: f64,
    /// Expected goals per possession percentage point.
    pub xg_per_possession_pct: f64,
    pub touches_per_xg: f64,
    pub better_with_possession: bool,
    pub possession_differential: f64,
}

impl PossessionEffectiveness {
    /// Returns `None` for an empty slice. Matches without a possession
    /// figure are left out of every group.
    pub fn from_rows(rows: &[&MatchRow]) -> Option<Self> {
        if rows.is_empty() {
            return None;
        }

        let high = with_possession(rows, |p| p >= HIGH_POSSESSION);
        let medium = with_possession(rows, |p| (LOW_POSSESSION..HIGH_POSSESSION).contains(&p));
        let low = with_possession(rows, |p| p < LOW_POSSESSION);

        let high_ppg = points_per_game(&high);
        let low_ppg = points_per_game(&low);

        let total_xg = sum_f64(rows, |r| r.stats.xg);
        let avg_possession =
            mean_present(rows.iter().map(|r| r.stats.possession_pct)).unwrap_or(0.0);
        let touches = sum_u32(rows, |r| r.stats.touches_in_opposition_box) as f64;

        Some(PossessionEffectiveness {
            high_possession_games: high.len(),
            high_possession_ppg: high_ppg,
            high_possession_win_rate: win_rate(&high),
            medium_possession_games: medium.len(),
            medium_possession_ppg: points_per_game(&medium),
            low_possession_games: low.len(),
            low_possession_ppg: low_ppg,
            low_possession_win_rate: win_rate(&low),
            xg_per_possession_pct: ratio(total_xg, avg_possession * rows.len() as f64),
            touches_per_xg: ratio(touches, total_xg),
            better_with_possession: high_ppg > low_ppg,
            possession_differential: high_ppg - low_ppg,
        })
    }
}

fn with_possession<'a>(rows: &[&'a MatchRow], keep: impl Fn(f64) -> bool) -> Vec<&'a MatchRow> {
    rows.iter()
        .copied()
        .filter(|r| r.stats.possession_pct.is_some_and(&keep))
        .collect()
}

fn points_per_game(rows: &[&MatchRow]) -> f64 {
    per_game(sum_u32(rows, |r| r.points()) as f64, rows.len())
}

fn count_outcome(rows: &[&MatchRow], outcome: Outcome) -> u32 {
    rows.iter().filter(|r| r.outcome() == outcome).count() as u32
}

fn win_rate(rows: &[&MatchRow]) -> f64 {
    pct(count_outcome(rows, Outcome::Win) as f64, rows.len() as f64)
}

/// Results for one possession bracket.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PossessionBracketResult {
    pub range: &'static str,
    pub games: usize,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    pub win_pct: f64,
    pub ppg: f64,
    pub avg_xg: f64,
    pub avg_goals: f64,
}

/// Results grouped by possession bracket, lowest first. Empty brackets are omitted.
pub fn possession_vs_results(rows: &[&MatchRow]) -> Vec<PossessionBracketResult> {
    POSSESSION_BRACKETS
        .iter()
        .filter_map(|&(label, _, _)| {
            let in_bracket: Vec<&MatchRow> = rows
                .iter()
                .copied()
                .filter(|r| r.stats.possession_pct.and_then(bracket) == Some(label))
                .collect();
            if in_bracket.is_empty() {
                return None;
            }

            let xg: Vec<f64> = in_bracket.iter().map(|r| r.stats.xg).collect();
            let goals: Vec<f64> = in_bracket.iter().map(|r| r.goals_scored as f64).collect();

            Some(PossessionBracketResult {
                range: label,
                games: in_bracket.len(),
                wins: count_outcome(&in_bracket, Outcome::Win),
                draws: count_outcome(&in_bracket, Outcome::Draw),
                losses: count_outcome(&in_bracket, Outcome::Loss),
                win_pct: win_rate(&in_bracket),
                ppg: points_per_game(&in_bracket),
                avg_xg: mean(&xg),
                avg_goals: mean(&goals),
            })
        })
        .collect()
}

pub fn possession_insights(
    team_rows: &[&MatchRow],
    comparison_rows: &[&MatchRow],
    team_name: &str,
    comparison_name: &str,
) -> Vec<Insight> {
    let mut insights = Vec::new();

    let Some(team) = PossessionEffectiveness::from_rows(team_rows) else {
        return insights;
    };
    let comp_xg_eff = PossessionEffectiveness::from_rows(comparison_rows)
        .map_or(0.0, |c| c.xg_per_possession_pct);

    if !team.better_with_possession {
        insights.push(Insight::new(
            "Counter-Attack Style More Effective",
            format!(
                "{team_name} earns {:.2} PPG with low possession vs {:.2} PPG with high possession",
                team.low_possession_ppg, team.high_possession_ppg
            ),
            "Consider tactical shift towards counter-attacking style",
            Severity::High,
        ));
    }

    if team.xg_per_possession_pct < comp_xg_eff * 0.8 {
        insights.push(Insight::new(
            "Possession Efficiency Gap",
            format!(
                "{team_name}: {:.3} xG per possession % vs {comparison_name}: {:.3}",
                team.xg_per_possession_pct, comp_xg_eff
            ),
            "Possession is not translating to chances - work on final third penetration",
            Severity::Medium,
        ));
    }

    if team.high_possession_win_rate < 50.0 && team.high_possession_games >= 5 {
        insights.push(Insight::new(
            "High Possession Not Converting to Wins",
            format!(
                "{team_name} wins only {:.1}% when dominating possession (>55%)",
                team.high_possession_win_rate
            ),
            "Add more directness and urgency when in control of possession",
            Severity::High,
        ));
    }

    insights
}
