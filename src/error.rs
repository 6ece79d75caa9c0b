//! Error types shared by the loading and aggregation pipeline.

use std::path::PathBuf;

/// Errors that abort a single library call.
#[derive(Debug, thiserror::Error)]
pub enum StatsError {
    #[error("failed to read season '{season}' from {}: {source}", path.display())]
    Load {
        season: String,
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("CSV error in season '{season}' ({}): {source}", path.display())]
    Csv {
        season: String,
        path: PathBuf,
        source: csv::Error,
    },

    #[error("unknown season '{season}' (available: {})", available.join(", "))]
    InvalidSeason {
        season: String,
        available: Vec<String>,
    },

    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

impl StatsError {
    /// `true` for file-level failures (missing, unreadable or truncated source).
    pub fn is_load_error(&self) -> bool {
        matches!(self, StatsError::Load { .. } | StatsError::Csv { .. })
    }
}

pub type Result<T> = std::result::Result<T, StatsError>;

/// A single cell that could not be parsed.
///
/// Never fatal: the preprocessor stores an absent value for the cell and
/// counts the warning in the table's [`DataQuality`](crate::preprocess::DataQuality).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("could not parse {value:?} as {expected}")]
pub struct ParseWarning {
    pub value: String,
    pub expected: &'static str,
}

impl ParseWarning {
    pub(crate) fn new(value: &str, expected: &'static str) -> Self {
        Self {
            value: value.to_string(),
            expected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_season_lists_available() {
        let err = StatsError::InvalidSeason {
            season: "1999-2000".to_string(),
            available: vec!["2023-2024".to_string(), "2024-2025".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "unknown season '1999-2000' (available: 2023-2024, 2024-2025)"
        );
        assert!(!err.is_load_error());
    }

    #[test]
    fn test_load_error_is_load_error() {
        let err = StatsError::Load {
            season: "2023-2024".to_string(),
            path: PathBuf::from("missing.csv"),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert!(err.is_load_error());
        assert!(err.to_string().contains("missing.csv"));
    }
}
