//! Per-match series over a season: rolling averages and points accumulation.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::analyzers::types::{CumulativePoint, TrendPoint};
use crate::error::{Result, StatsError};
use crate::preprocess::MatchTable;
use crate::stats::MatchRow;

/// Trailing rolling mean with a minimum of one period.
///
/// Element `i` is the mean of `values[i + 1 - window ..= i]`, using however
/// many values exist at the start of the series. A zero window is treated
/// as one.
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<f64> {
    let window = window.max(1);
    let mut out = Vec::with_capacity(values.len());
    let mut sum = 0.0;
    for (i, v) in values.iter().enumerate() {
        sum += v;
        if i >= window {
            sum -= values[i - window];
        }
        out.push(sum / (i + 1).min(window) as f64);
    }
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendMetric {
    Goals,
    GoalsConceded,
    Xg,
    Possession,
}

impl TrendMetric {
    /// The metric's value for one match; `None` when the match does not report it.
    pub fn value(self, row: &MatchRow) -> Option<f64> {
        match self {
            TrendMetric::Goals => Some(row.goals_scored as f64),
            TrendMetric::GoalsConceded => Some(row.goals_conceded as f64),
            TrendMetric::Xg => Some(row.stats.xg),
            TrendMetric::Possession => row.stats.possession_pct,
        }
    }
}

impl FromStr for TrendMetric {
    type Err = StatsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "goals" => Ok(TrendMetric::Goals),
            "goals_conceded" | "conceded" => Ok(TrendMetric::GoalsConceded),
            "xg" => Ok(TrendMetric::Xg),
            "possession" => Ok(TrendMetric::Possession),
            other => Err(StatsError::InvalidParameter {
                name: "metric",
                reason: format!(
                    "unknown metric '{other}' (expected goals, goals_conceded, xg or possession)"
                ),
            }),
        }
    }
}

impl fmt::Display for TrendMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TrendMetric::Goals => "goals",
            TrendMetric::GoalsConceded => "goals_conceded",
            TrendMetric::Xg => "xg",
            TrendMetric::Possession => "possession",
        })
    }
}

/// A team's per-match `metric` values in date order with their rolling mean.
///
/// Matches that do not report the metric are left out of the series.
///
/// # Errors
///
/// [`StatsError::InvalidParameter`] for a zero window,
/// [`StatsError::InvalidSeason`] for an unknown season.
pub fn rolling_team_series(
    table: &MatchTable,
    team: &str,
    season: &str,
    window: usize,
    metric: TrendMetric,
) -> Result<Vec<TrendPoint>> {
    if window == 0 {
        return Err(StatsError::InvalidParameter {
            name: "window",
            reason: "must be at least 1".to_string(),
        });
    }

    let present: Vec<(&MatchRow, f64)> = table
        .team_rows(team, season)?
        .into_iter()
        .filter_map(|r| metric.value(r).map(|v| (r, v)))
        .collect();
    let values: Vec<f64> = present.iter().map(|(_, v)| *v).collect();

    Ok(present
        .iter()
        .zip(rolling_mean(&values, window))
        .map(|((row, value), rolling)| TrendPoint {
            date: row.date,
            opponent: row.opponent.clone(),
            value: *value,
            rolling,
        })
        .collect())
}

/// Running points total over a season, ordered by round then date.
///
/// Matches without a round sort after those with one.
pub fn cumulative_points(
    table: &MatchTable,
    team: &str,
    season: &str,
) -> Result<Vec<CumulativePoint>> {
    let mut rows = table.team_rows(team, season)?;
    rows.sort_by_key(|r| (r.round.is_none(), r.round, r.chrono_key()));

    let mut total = 0;
    Ok(rows
        .into_iter()
        .map(|r| {
            total += r.points();
            CumulativePoint {
                round: r.round,
                date: r.date,
                opponent: r.opponent.clone(),
                outcome: r.outcome(),
                points: r.points(),
                cumulative_points: total,
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::aggregate::get_season_summary;
    use crate::test_support::fixture;

    #[test]
    fn test_rolling_mean_minimum_one_period() {
        assert_eq!(rolling_mean(&[1.0, 2.0, 3.0, 4.0], 2), vec![1.0, 1.5, 2.5, 3.5]);
        assert_eq!(rolling_mean(&[2.0, 4.0], 5), vec![2.0, 3.0]);
        assert_eq!(rolling_mean(&[2.0, 4.0], 0), vec![2.0, 4.0]);
        assert!(rolling_mean(&[], 3).is_empty());
    }

    #[test]
    fn test_metric_from_str() {
        assert_eq!("xG".parse::<TrendMetric>().unwrap(), TrendMetric::Xg);
        assert_eq!("goals-conceded".parse::<TrendMetric>().unwrap(), TrendMetric::GoalsConceded);
        assert!("corners".parse::<TrendMetric>().is_err());
    }

    #[test]
    fn test_rolling_team_series() {
        let table = table();
        let series =
            rolling_team_series(&table, "Arsenal", "2023-2024", 2, TrendMetric::Goals).unwrap();
        let values: Vec<_> = series.iter().map(|p| p.value).collect();
        let rolling: Vec<_> = series.iter().map(|p| p.rolling).collect();
        assert_eq!(values, vec![2.0, 1.0, 1.0]);
        assert_eq!(rolling, vec![2.0, 1.5, 1.0]);

        assert!(
            rolling_team_series(&table, "Arsenal", "2023-2024", 0, TrendMetric::Goals).is_err()
        );
        // fixtures carry no possession figures
        assert!(
            rolling_team_series(&table, "Arsenal", "2023-2024", 2, TrendMetric::Possession)
                .unwrap()
                .is_empty()
        );
    }

    #[test]
    fn test_cumulative_points_ends_at_total() {
        let table = table();
        let points = cumulative_points(&table, "Arsenal", "2023-2024").unwrap();
        let totals: Vec<_> = points.iter().map(|p| p.cumulative_points).collect();
        assert_eq!(totals, vec![3, 3, 4]);
        assert!(totals.windows(2).all(|w| w[0] <= w[1]));

        let summary = get_season_summary(&table, "Arsenal", "2023-2024").unwrap();
        assert_eq!(totals.last().copied(), Some(summary.points));
    }

    fn table() -> MatchTable {
        let rows: Vec<_> = [
            fixture(0, 3, "Arsenal", "Chelsea", 1, 1),
            fixture(2, 1, "Arsenal", "Chelsea", 2, 1),
            fixture(4, 2, "Liverpool", "Arsenal", 3, 1),
        ]
        .into_iter()
        .flatten()
        .collect();
        MatchTable::from_rows(rows, &["2023-2024"])
    }
}
