use chrono::NaiveDate;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use crate::metrics::bands::PossessionBand;
use crate::parser::PercentageStat;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Side {
    Home,
    Away,
}

impl Side {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "home" | "h" => Some(Side::Home),
            "away" | "a" => Some(Side::Away),
            _ => None,
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Side::Home => Side::Away,
            Side::Away => Side::Home,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Side::Home => "Home",
            Side::Away => "Away",
        })
    }
}

/// Result of a match from one team's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Outcome {
    Win,
    Draw,
    Loss,
}

impl Outcome {
    pub fn from_goals(scored: u32, conceded: u32) -> Self {
        match scored.cmp(&conceded) {
            Ordering::Greater => Outcome::Win,
            Ordering::Equal => Outcome::Draw,
            Ordering::Less => Outcome::Loss,
        }
    }

    pub fn points(self) -> u32 {
        match self {
            Outcome::Win => 3,
            Outcome::Draw => 1,
            Outcome::Loss => 0,
        }
    }

    pub fn letter(self) -> char {
        match self {
            Outcome::Win => 'W',
            Outcome::Draw => 'D',
            Outcome::Loss => 'L',
        }
    }
}

/// Raw counting and expected-goals statistics of one team in one match.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MatchStats {
    // expected goals
    pub xg: f64,
    pub xg_open_play: f64,
    pub xg_set_play: f64,
    pub non_penalty_xg: f64,
    pub xgot: f64,

    // shooting
    pub total_shots: u32,
    pub shots_on_target: u32,
    pub shots_off_target: u32,
    pub blocked_shots: u32,
    pub hit_woodwork: u32,
    pub shots_inside_box: u32,
    pub shots_outside_box: u32,
    pub big_chances: u32,
    pub big_chances_missed: u32,

    // passing
    pub passes: u32,
    pub own_half: u32,
    pub opposition_half: u32,
    pub accurate_passes: PercentageStat,
    pub accurate_long_balls: PercentageStat,
    pub accurate_crosses: PercentageStat,
    pub throws: u32,
    pub touches_in_opposition_box: u32,
    pub corners: u32,
    pub offsides: u32,

    // defending
    pub tackles: u32,
    pub interceptions: u32,
    pub blocks: u32,
    pub clearances: u32,
    pub keeper_saves: u32,
    pub duels_won: PercentageStat,
    pub ground_duels_won: PercentageStat,
    pub aerial_duels_won: PercentageStat,
    pub successful_dribbles: PercentageStat,

    // discipline
    pub fouls_committed: u32,
    pub yellow_cards: u32,
    pub red_cards: u32,

    pub possession_pct: Option<f64>,
}

/// Calculated columns, computed once by the preprocessor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedStats {
    pub outcome: Outcome,
    pub points: u32,
    pub goal_difference: i32,
    pub is_clean_sheet: bool,
    pub xg_difference: f64,
    pub shot_conversion_pct: f64,
    pub shots_on_target_pct: f64,
    pub big_chance_conversion_pct: f64,
    pub shots_inside_box_pct: f64,
    pub pass_accuracy_pct: Option<f64>,
    pub defensive_actions: u32,
    pub opp_half_passes_pct: f64,
    pub xg_open_play_ratio: f64,
    pub xg_set_play_ratio: f64,
    pub xg_per_shot: f64,
    pub woodwork_rate: f64,
    pub blocked_shot_rate: f64,
    pub shots_off_target_rate: f64,
    pub possession_band: Option<PossessionBand>,
}

impl DerivedStats {
    pub fn compute(goals_scored: u32, goals_conceded: u32, s: &MatchStats) -> Self {
        let outcome = Outcome::from_goals(goals_scored, goals_conceded);
        let goals = goals_scored as f64;

        DerivedStats {
            outcome,
            points: outcome.points(),
            goal_difference: goal_difference(goals_scored, goals_conceded),
            is_clean_sheet: goals_conceded == 0,
            xg_difference: goals - s.xg,
            shot_conversion_pct: pct(goals, s.total_shots as f64),
            shots_on_target_pct: pct(s.shots_on_target as f64, s.total_shots as f64),
            big_chance_conversion_pct: pct(
                s.big_chances.saturating_sub(s.big_chances_missed) as f64,
                s.big_chances as f64,
            ),
            shots_inside_box_pct: pct(s.shots_inside_box as f64, s.total_shots as f64),
            pass_accuracy_pct: s.accurate_passes.pct,
            defensive_actions: s
                .tackles
                .saturating_add(s.interceptions)
                .saturating_add(s.blocks)
                .saturating_add(s.clearances),
            opp_half_passes_pct: pct(s.opposition_half as f64, s.passes as f64),
            xg_open_play_ratio: ratio(s.xg_open_play, s.xg),
            xg_set_play_ratio: ratio(s.xg_set_play, s.xg),
            xg_per_shot: ratio(s.xg, s.total_shots as f64),
            woodwork_rate: pct(s.hit_woodwork as f64, s.total_shots as f64),
            blocked_shot_rate: pct(s.blocked_shots as f64, s.total_shots as f64),
            shots_off_target_rate: pct(s.shots_off_target as f64, s.total_shots as f64),
            possession_band: s.possession_pct.map(PossessionBand::from_pct),
        }
    }
}

/// One team's record of one match, ready for analysis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchRow {
    /// Position in the combined table, in load order.
    pub index: usize,
    pub season: String,
    pub line: u64,
    pub date: NaiveDate,
    pub date_text: String,
    pub match_label: String,
    pub team: String,
    pub opponent: String,
    pub side: Side,
    pub round: Option<u32>,
    pub score: String,
    pub goals_scored: u32,
    pub goals_conceded: u32,
    /// The `points` column as written in the file, if present.
    pub reported_points: Option<u32>,
    pub stats: MatchStats,
    pub derived: DerivedStats,
    /// Columns this crate does not interpret, passed through untouched.
    pub extra: BTreeMap<String, String>,
}

impl MatchRow {
    pub fn outcome(&self) -> Outcome {
        self.derived.outcome
    }

    pub fn points(&self) -> u32 {
        self.derived.points
    }

    /// Chronological sort key: date first, then original row order.
    pub fn chrono_key(&self) -> (NaiveDate, usize) {
        (self.date, self.index)
    }
}

/// `part / total * 100`, or 0 when `total` is zero.
pub fn pct(part: f64, total: f64) -> f64 {
    if total == 0.0 {
        0.0
    } else {
        (part / total) * 100.0
    }
}

/// `scored - conceded`, clamped to the `i32` range.
pub fn goal_difference(scored: u32, conceded: u32) -> i32 {
    let diff = i64::from(scored) - i64::from(conceded);
    diff.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// `part / total`, or 0 when `total` is zero.
pub fn ratio(part: f64, total: f64) -> f64 {
    if total == 0.0 { 0.0 } else { part / total }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pct_with_zero_total() {
        assert_eq!(pct(10.0, 0.0), 0.0);
        assert_eq!(ratio(1.2, 0.0), 0.0);
    }

    #[test]
    fn test_pct_normal_values() {
        assert_eq!(pct(50.0, 100.0), 50.0);
        assert_eq!(pct(1.0, 4.0), 25.0);
    }

    #[test]
    fn test_goal_difference_clamps() {
        assert_eq!(goal_difference(2, 5), -3);
        assert_eq!(goal_difference(u32::MAX, 0), i32::MAX);
        assert_eq!(goal_difference(0, u32::MAX), i32::MIN);
    }

    #[test]
    fn test_defensive_actions_saturate() {
        let stats = MatchStats {
            tackles: u32::MAX,
            interceptions: 1,
            ..Default::default()
        };
        let d = DerivedStats::compute(0, 0, &stats);
        assert_eq!(d.defensive_actions, u32::MAX);
    }

    #[test]
    fn test_outcome_points() {
        assert_eq!(Outcome::from_goals(2, 1), Outcome::Win);
        assert_eq!(Outcome::from_goals(1, 1), Outcome::Draw);
        assert_eq!(Outcome::from_goals(0, 3), Outcome::Loss);
        assert_eq!(Outcome::Win.points(), 3);
        assert_eq!(Outcome::Draw.points(), 1);
        assert_eq!(Outcome::Loss.points(), 0);
        assert_eq!(Outcome::Draw.letter(), 'D');
    }

    #[test]
    fn test_side_parse() {
        assert_eq!(Side::parse("Home"), Some(Side::Home));
        assert_eq!(Side::parse(" away "), Some(Side::Away));
        assert_eq!(Side::parse("neutral"), None);
        assert_eq!(Side::Home.opposite(), Side::Away);
    }

    #[test]
    fn test_derived_zero_shots_never_divides() {
        let derived = DerivedStats::compute(0, 0, &MatchStats::default());
        assert_eq!(derived.shot_conversion_pct, 0.0);
        assert_eq!(derived.xg_per_shot, 0.0);
        assert_eq!(derived.big_chance_conversion_pct, 0.0);
        assert!(derived.is_clean_sheet);
        assert_eq!(derived.outcome, Outcome::Draw);
        assert_eq!(derived.possession_band, None);
    }

    #[test]
    fn test_derived_rates() {
        let stats = MatchStats {
            xg: 2.0,
            xg_open_play: 1.5,
            xg_set_play: 0.5,
            total_shots: 10,
            shots_on_target: 4,
            shots_inside_box: 7,
            big_chances: 4,
            big_chances_missed: 3,
            tackles: 10,
            interceptions: 5,
            blocks: 2,
            clearances: 13,
            passes: 400,
            opposition_half: 100,
            accurate_passes: PercentageStat {
                count: Some(340),
                pct: Some(85.0),
            },
            possession_pct: Some(58.0),
            ..Default::default()
        };

        let d = DerivedStats::compute(2, 1, &stats);
        assert_eq!(d.points, 3);
        assert_eq!(d.goal_difference, 1);
        assert_eq!(d.shot_conversion_pct, 20.0);
        assert_eq!(d.shots_on_target_pct, 40.0);
        assert_eq!(d.big_chance_conversion_pct, 25.0);
        assert_eq!(d.shots_inside_box_pct, 70.0);
        assert_eq!(d.pass_accuracy_pct, Some(85.0));
        assert_eq!(d.defensive_actions, 30);
        assert_eq!(d.opp_half_passes_pct, 25.0);
        assert_eq!(d.xg_open_play_ratio, 0.75);
        assert_eq!(d.xg_set_play_ratio, 0.25);
        assert_eq!(d.xg_per_shot, 0.2);
        assert_eq!(d.xg_difference, 0.0);
        assert_eq!(d.possession_band, Some(PossessionBand::High));
    }
}
