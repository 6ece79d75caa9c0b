//! Attacking output: goals, expected goals, shooting and set pieces.

use serde::Serialize;

use crate::analyzers::utility::{per_game, sum_f64, sum_u32};
use crate::metrics::{Insight, Severity};
use crate::stats::{MatchRow, pct, ratio};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AttackingMetrics {
    pub matches: usize,
    pub total_goals: u32,
    pub total_xg: f64,
    pub goals_per_game: f64,
    pub xg_per_game: f64,
    /// Goals minus xG; positive means scoring above expectation.
    pub xg_overperformance: f64,
    pub xg_overperformance_per_game: f64,
    pub shot_conversion_pct: f64,
    pub shots_on_target_pct: f64,
    pub big_chance_conversion_pct: f64,
    pub shots_per_game: f64,
    pub shots_on_target_per_game: f64,
    pub big_chances_per_game: f64,
    pub xgot_per_game: f64,
    pub shots_inside_box_pct: f64,
    pub total_big_chances: u32,
    pub total_big_chances_missed: u32,
}

impl AttackingMetrics {
    pub fn from_rows(rows: &[&MatchRow]) -> Self {
        let matches = rows.len();
        let goals = sum_u32(rows, |r| r.goals_scored);
        let xg = sum_f64(rows, |r| r.stats.xg);
        let xgot = sum_f64(rows, |r| r.stats.xgot);
        let shots = sum_u32(rows, |r| r.stats.total_shots) as f64;
        let on_target = sum_u32(rows, |r| r.stats.shots_on_target) as f64;
        let inside_box = sum_u32(rows, |r| r.stats.shots_inside_box) as f64;
        let big_chances = sum_u32(rows, |r| r.stats.big_chances);
        let big_chances_missed = sum_u32(rows, |r| r.stats.big_chances_missed);

        let overperformance = goals as f64 - xg;

        AttackingMetrics {
            matches,
            total_goals: goals,
            total_xg: xg,
            goals_per_game: per_game(goals as f64, matches),
            xg_per_game: per_game(xg, matches),
            xg_overperformance: overperformance,
            xg_overperformance_per_game: per_game(overperformance, matches),
            shot_conversion_pct: pct(goals as f64, shots),
            shots_on_target_pct: pct(on_target, shots),
            big_chance_conversion_pct: pct(
                big_chances.saturating_sub(big_chances_missed) as f64,
                big_chances as f64,
            ),
            shots_per_game: per_game(shots, matches),
            shots_on_target_per_game: per_game(on_target, matches),
            big_chances_per_game: per_game(big_chances as f64, matches),
            xgot_per_game: per_game(xgot, matches),
            shots_inside_box_pct: pct(inside_box, shots),
            total_big_chances: big_chances,
            total_big_chances_missed: big_chances_missed,
        }
    }
}

/// Where a team's expected goals come from.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SetPieceMetrics {
    pub xg_from_set_pieces: f64,
    pub xg_from_open_play: f64,
    pub set_piece_xg_pct: f64,
    pub open_play_xg_pct: f64,
    pub corners_total: u32,
    pub corners_per_game: f64,
    pub xg_per_corner: f64,
    pub set_piece_xg_per_game: f64,
    pub open_play_xg_per_game: f64,
}

impl SetPieceMetrics {
    pub fn from_rows(rows: &[&MatchRow]) -> Self {
        let matches = rows.len();
        let total_xg = sum_f64(rows, |r| r.stats.xg);
        let set_play = sum_f64(rows, |r| r.stats.xg_set_play);
        let open_play = sum_f64(rows, |r| r.stats.xg_open_play);
        let corners = sum_u32(rows, |r| r.stats.corners);

        SetPieceMetrics {
            xg_from_set_pieces: set_play,
            xg_from_open_play: open_play,
            set_piece_xg_pct: pct(set_play, total_xg),
            open_play_xg_pct: pct(open_play, total_xg),
            corners_total: corners,
            corners_per_game: per_game(corners as f64, matches),
            xg_per_corner: ratio(set_play, corners as f64),
            set_piece_xg_per_game: per_game(set_play, matches),
            open_play_xg_per_game: per_game(open_play, matches),
        }
    }
}

/// Expected goals recovered per woodwork hit when estimating unlucky misses.
const XG_PER_WOODWORK: f64 = 0.5;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ShotQualityMetrics {
    pub avg_xg_per_shot: f64,
    pub total_shots: u32,
    pub woodwork_total: u32,
    pub woodwork_rate_pct: f64,
    pub blocked_shots_total: u32,
    pub blocked_rate_pct: f64,
    pub off_target_total: u32,
    pub off_target_rate_pct: f64,
    pub on_target_total: u32,
    pub on_target_rate_pct: f64,
    pub goals_total: u32,
    pub goal_rate_pct: f64,
    pub potential_woodwork_goals: f64,
}

impl ShotQualityMetrics {
    pub fn from_rows(rows: &[&MatchRow]) -> Self {
        let shots = sum_u32(rows, |r| r.stats.total_shots);
        let xg = sum_f64(rows, |r| r.stats.xg);
        let woodwork = sum_u32(rows, |r| r.stats.hit_woodwork);
        let blocked = sum_u32(rows, |r| r.stats.blocked_shots);
        let off_target = sum_u32(rows, |r| r.stats.shots_off_target);
        let on_target = sum_u32(rows, |r| r.stats.shots_on_target);
        let goals = sum_u32(rows, |r| r.goals_scored);
        let of_shots = |n: u32| pct(n as f64, shots as f64);

        ShotQualityMetrics {
            avg_xg_per_shot: ratio(xg, shots as f64),
            total_shots: shots,
            woodwork_total: woodwork,
            woodwork_rate_pct: of_shots(woodwork),
            blocked_shots_total: blocked,
            blocked_rate_pct: of_shots(blocked),
            off_target_total: off_target,
            off_target_rate_pct: of_shots(off_target),
            on_target_total: on_target,
            on_target_rate_pct: of_shots(on_target),
            goals_total: goals,
            goal_rate_pct: of_shots(goals),
            potential_woodwork_goals: woodwork as f64 * XG_PER_WOODWORK,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShotOutcome {
    pub label: &'static str,
    pub count: u32,
    pub pct: f64,
}

/// Splits all shots into goals, saved, blocked, off target and woodwork.
///
/// Saved shots are shots on target that did not go in.
pub fn shot_outcome_breakdown(rows: &[&MatchRow]) -> Vec<ShotOutcome> {
    let shots = sum_u32(rows, |r| r.stats.total_shots) as f64;
    let goals = sum_u32(rows, |r| r.goals_scored);
    let saved = sum_u32(rows, |r| r.stats.shots_on_target).saturating_sub(goals);

    [
        ("Goals", goals),
        ("Saved", saved),
        ("Blocked", sum_u32(rows, |r| r.stats.blocked_shots)),
        ("Off Target", sum_u32(rows, |r| r.stats.shots_off_target)),
        ("Woodwork", sum_u32(rows, |r| r.stats.hit_woodwork)),
    ]
    .into_iter()
    .map(|(label, count)| ShotOutcome {
        label,
        count,
        pct: pct(count as f64, shots),
    })
    .collect()
}

/// Compares a team's chance creation with another team's.
pub fn tactical_insights(
    team_rows: &[&MatchRow],
    comparison_rows: &[&MatchRow],
    team_name: &str,
    comparison_name: &str,
) -> Vec<Insight> {
    let team_sp = SetPieceMetrics::from_rows(team_rows);
    let comp_sp = SetPieceMetrics::from_rows(comparison_rows);
    let team_sq = ShotQualityMetrics::from_rows(team_rows);
    let comp_sq = ShotQualityMetrics::from_rows(comparison_rows);

    let mut insights = Vec::new();

    if team_sp.set_piece_xg_pct > comp_sp.set_piece_xg_pct + 5.0 {
        insights.push(Insight::new(
            "Set Piece Dependency",
            format!(
                "{team_name}: {:.1}% of xG from set pieces vs {comparison_name}: {:.1}%",
                team_sp.set_piece_xg_pct, comp_sp.set_piece_xg_pct
            ),
            "Improve open play build-up patterns and create more chances from possession",
            if team_sp.set_piece_xg_pct > 35.0 {
                Severity::High
            } else {
                Severity::Medium
            },
        ));
    }

    let xg_per_shot_diff = team_sq.avg_xg_per_shot - comp_sq.avg_xg_per_shot;
    if xg_per_shot_diff < -0.02 {
        insights.push(Insight::new(
            "Shot Quality Gap",
            format!(
                "{team_name}: {:.3} xG/shot vs {comparison_name}: {:.3} xG/shot",
                team_sq.avg_xg_per_shot, comp_sq.avg_xg_per_shot
            ),
            "Focus on creating higher quality chances rather than volume of shots",
            if xg_per_shot_diff < -0.03 {
                Severity::High
            } else {
                Severity::Medium
            },
        ));
    }

    if team_sq.blocked_rate_pct - comp_sq.blocked_rate_pct > 5.0 {
        insights.push(Insight::new(
            "Shots Being Blocked",
            format!(
                "{team_name}: {:.1}% blocked vs {comparison_name}: {:.1}%",
                team_sq.blocked_rate_pct, comp_sq.blocked_rate_pct
            ),
            "Work on quicker shooting and less telegraphed attempts",
            Severity::Medium,
        ));
    }

    if team_sq.woodwork_total > 5 {
        insights.push(Insight::new(
            "Finishing Luck",
            format!(
                "{team_name} hit woodwork {} times (est. {:.1} unlucky goals)",
                team_sq.woodwork_total, team_sq.potential_woodwork_goals
            ),
            "Finishing execution is good - variance should correct over time",
            Severity::Info,
        ));
    }

    if team_sp.open_play_xg_per_game < comp_sp.open_play_xg_per_game - 0.3 {
        insights.push(Insight::new(
            "Open Play Creation",
            format!(
                "{team_name}: {:.2} open play xG/game vs {comparison_name}: {:.2}",
                team_sp.open_play_xg_per_game, comp_sp.open_play_xg_per_game
            ),
            "Tactical focus needed on build-up play and creating chances from possession",
            Severity::High,
        ));
    }

    insights
}
