use crate::stats::MatchRow;

/// Computes the arithmetic mean of a slice of values. Returns 0.0 for empty input.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Mean of the values that are present, or `None` when none are.
pub fn mean_present(values: impl IntoIterator<Item = Option<f64>>) -> Option<f64> {
    let present: Vec<f64> = values.into_iter().flatten().collect();
    if present.is_empty() {
        None
    } else {
        Some(mean(&present))
    }
}

/// `total / matches`, or 0.0 when no matches were played.
pub fn per_game(total: f64, matches: usize) -> f64 {
    if matches == 0 {
        0.0
    } else {
        total / matches as f64
    }
}

/// Sums a counting column over `rows`, saturating at `u32::MAX`.
pub fn sum_u32(rows: &[&MatchRow], f: impl Fn(&MatchRow) -> u32) -> u32 {
    rows.iter().fold(0, |acc, r| acc.saturating_add(f(r)))
}

/// Sums a decimal column over `rows`.
pub fn sum_f64(rows: &[&MatchRow], f: impl Fn(&MatchRow) -> f64) -> f64 {
    rows.iter().map(|r| f(r)).sum()
}
