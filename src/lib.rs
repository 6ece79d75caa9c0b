pub mod analyzers;
pub mod cache;
pub mod error;
pub mod loader;
pub mod metrics;
pub mod output;
pub mod parser;
pub mod preprocess;
pub mod stats;

#[cfg(test)]
pub(crate) mod test_support;

pub use error::{Result, StatsError};
pub use preprocess::{MatchTable, filter_by_season, preprocess};
