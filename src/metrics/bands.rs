use serde::Serialize;
use std::fmt;

/// Possession band used to group matches by how much of the ball a team had.
///
/// | Range        | Band   |
/// |--------------|--------|
/// | < 45         | Low    |
/// | 45 ..= 55    | Medium |
/// | > 55         | High   |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum PossessionBand {
    Low,
    Medium,
    High,
}

impl PossessionBand {
    pub fn from_pct(p: f64) -> Self {
        match p {
            p if p > 55.0 => PossessionBand::High,
            p if p >= 45.0 => PossessionBand::Medium,
            _ => PossessionBand::Low,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PossessionBand::Low => "Low (<45%)",
            PossessionBand::Medium => "Medium (45-55%)",
            PossessionBand::High => "High (>55%)",
        }
    }
}

impl fmt::Display for PossessionBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Finer possession brackets for the possession-vs-results breakdown.
/// Lower bound inclusive, upper bound exclusive; the last bracket includes 100.
pub const POSSESSION_BRACKETS: &[(&str, f64, f64)] = &[
    ("Very Low (<40%)", 0.0, 40.0),
    ("Low (40-45%)", 40.0, 45.0),
    ("Medium (45-55%)", 45.0, 55.0),
    ("High (55-60%)", 55.0, 60.0),
    ("Very High (>60%)", 60.0, 100.0),
];

/// Returns the bracket label for a possession percentage.
pub fn bracket(p: f64) -> Option<&'static str> {
    POSSESSION_BRACKETS
        .iter()
        .enumerate()
        .find(|(i, (_, low, high))| {
            p >= *low && (p < *high || (*i == POSSESSION_BRACKETS.len() - 1 && p <= *high))
        })
        .map(|(_, (label, _, _))| *label)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_boundaries() {
        assert_eq!(PossessionBand::from_pct(0.0), PossessionBand::Low);
        assert_eq!(PossessionBand::from_pct(44.9), PossessionBand::Low);
        assert_eq!(PossessionBand::from_pct(45.0), PossessionBand::Medium);
        assert_eq!(PossessionBand::from_pct(55.0), PossessionBand::Medium);
        assert_eq!(PossessionBand::from_pct(55.1), PossessionBand::High);
        assert_eq!(PossessionBand::from_pct(100.0), PossessionBand::High);
    }

    #[test]
    fn test_bracket_boundaries() {
        assert_eq!(bracket(0.0), Some("Very Low (<40%)"));
        assert_eq!(bracket(40.0), Some("Low (40-45%)"));
        assert_eq!(bracket(54.9), Some("Medium (45-55%)"));
        assert_eq!(bracket(55.0), Some("High (55-60%)"));
        assert_eq!(bracket(100.0), Some("Very High (>60%)"));
        assert_eq!(bracket(101.0), None);
    }
}
