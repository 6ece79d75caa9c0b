//! Team and league aggregations over the preprocessed match table.
//!
//! Every aggregator is a pure function of a [`MatchTable`](crate::preprocess::MatchTable)
//! plus filter parameters, returning plain serializable records.

pub mod aggregate;
pub mod explorer;
pub mod form;
pub mod standings;
pub mod trend;
pub mod types;
pub mod utility;

pub use aggregate::{compare_teams, get_home_away_split, get_season_summary};
pub use form::get_form;
pub use standings::calculate_league_position;
