//! Binary-side infrastructure: where the season files come from.

mod config;

pub use config::SeasonConfig;
