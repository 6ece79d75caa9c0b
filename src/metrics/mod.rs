//! Metric sets computed over a slice of a team's match rows.
//!
//! Every function here is pure and returns zeros (or absent values) for an
//! empty slice, so callers can feed them any filter of the table.

pub mod attacking;
pub mod bands;
pub mod defensive;
pub mod possession;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Medium,
    High,
}

/// A comparative finding with a suggested course of action.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Insight {
    pub title: String,
    pub finding: String,
    pub action: String,
    pub severity: Severity,
}

impl Insight {
    pub(crate) fn new(title: &str, finding: String, action: &str, severity: Severity) -> Self {
        Self {
            title: title.to_string(),
            finding,
            action: action.to_string(),
            severity,
        }
    }
}
