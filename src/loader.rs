//! Raw season file loading.
//!
//! Every season file is read as strings; interpretation of the cells is left
//! to the [`preprocess`](crate::preprocess) stage. Column sets are allowed to
//! drift between files: unknown columns are carried along, missing ones read
//! as absent.

use csv::{ReaderBuilder, StringRecord};
use flate2::read::GzDecoder;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::{Result, StatsError};

/// A season label and the file holding its matches.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SeasonSource {
    pub label: String,
    pub path: PathBuf,
}

impl SeasonSource {
    pub fn new(label: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            label: label.into(),
            path: path.into(),
        }
    }
}

/// Header row of one source file with a name lookup.
#[derive(Debug)]
struct Header {
    names: StringRecord,
    index: HashMap<String, usize>,
}

impl Header {
    fn new(names: StringRecord) -> Self {
        let mut index = HashMap::with_capacity(names.len());
        for (i, name) in names.iter().enumerate() {
            // first occurrence wins on duplicated headers
            index.entry(name.trim().to_string()).or_insert(i);
        }
        Self { names, index }
    }
}

/// One CSV record tagged with its season.
#[derive(Debug, Clone)]
pub struct RawRow {
    season: String,
    line: u64,
    header: Arc<Header>,
    record: StringRecord,
}

impl RawRow {
    pub fn season(&self) -> &str {
        &self.season
    }

    /// 1-based line number in the source file.
    pub fn line(&self) -> u64 {
        self.line
    }

    /// Returns the cell for `column`, or `None` when the file has no such
    /// column or the record is short.
    pub fn get(&self, column: &str) -> Option<&str> {
        let i = *self.header.index.get(column)?;
        self.record.get(i)
    }

    /// Iterates over `(column, value)` pairs in file order.
    pub fn columns(&self) -> impl Iterator<Item = (&str, &str)> {
        self.header
            .names
            .iter()
            .map(str::trim)
            .zip(self.record.iter())
    }
}

/// A record the CSV reader could not decode.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorruptRecord {
    pub season: String,
    pub line: Option<u64>,
    pub message: String,
}

/// All loaded rows, season after season in the order requested.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub rows: Vec<RawRow>,
    pub seasons: Vec<String>,
    pub corrupt_records: Vec<CorruptRecord>,
}

impl RawTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn append(&mut self, season: SeasonRows) {
        self.seasons.push(season.label);
        self.rows.extend(season.rows);
        self.corrupt_records.extend(season.corrupt_records);
    }
}

/// Rows read from a single season source.
#[derive(Debug)]
pub struct SeasonRows {
    pub label: String,
    pub rows: Vec<RawRow>,
    pub corrupt_records: Vec<CorruptRecord>,
}

/// Loads and concatenates several season files.
///
/// # Errors
///
/// Fails on the first file that is missing or unreadable, and when the same
/// season label is supplied twice.
#[tracing::instrument(skip(sources), fields(seasons = sources.len()))]
pub fn load_seasons(sources: &[SeasonSource]) -> Result<RawTable> {
    let mut seen = HashSet::new();
    for source in sources {
        if !seen.insert(source.label.as_str()) {
            return Err(StatsError::InvalidParameter {
                name: "sources",
                reason: format!("season '{}' listed more than once", source.label),
            });
        }
    }

    let mut table = RawTable::default();
    for source in sources {
        table.append(load_season(source)?);
    }

    info!(
        rows = table.rows.len(),
        seasons = table.seasons.len(),
        corrupt = table.corrupt_records.len(),
        "Season files loaded"
    );
    Ok(table)
}

/// Loads one season file. Paths ending in `.gz` are decompressed on the fly.
pub fn load_season(source: &SeasonSource) -> Result<SeasonRows> {
    let file = File::open(&source.path).map_err(|e| StatsError::Load {
        season: source.label.clone(),
        path: source.path.clone(),
        source: e,
    })?;

    debug!(season = %source.label, path = %source.path.display(), "Reading season file");

    let reader: Box<dyn Read> = if is_gzip(&source.path) {
        Box::new(GzDecoder::new(BufReader::new(file)))
    } else {
        Box::new(BufReader::new(file))
    };

    read_season(&source.label, reader).map_err(|e| match e {
        StatsError::Csv { season, source: csv_err, .. } => StatsError::Csv {
            season,
            path: source.path.clone(),
            source: csv_err,
        },
        other => other,
    })
}

/// Reads a season from any byte source.
///
/// Records that fail to decode are skipped and reported in
/// [`SeasonRows::corrupt_records`]; I/O failures abort the read.
pub fn read_season<R: Read>(season: &str, reader: R) -> Result<SeasonRows> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(reader);

    let csv_error = |e: csv::Error| StatsError::Csv {
        season: season.to_string(),
        path: PathBuf::new(),
        source: e,
    };

    let header = Arc::new(Header::new(rdr.headers().map_err(csv_error)?.clone()));

    let mut rows = Vec::new();
    let mut corrupt_records = Vec::new();
    let mut record = StringRecord::new();

    loop {
        match rdr.read_record(&mut record) {
            Ok(false) => break,
            Ok(true) => {
                if record.iter().all(|f| f.trim().is_empty()) {
                    continue;
                }
                let line = record.position().map(|p| p.line()).unwrap_or_default();
                rows.push(RawRow {
                    season: season.to_string(),
                    line,
                    header: Arc::clone(&header),
                    record: record.clone(),
                });
            }
            Err(e) if e.is_io_error() => return Err(csv_error(e)),
            Err(e) => {
                let line = e.position().map(|p| p.line());
                warn!(season, line, error = %e, "Skipping corrupt record");
                corrupt_records.push(CorruptRecord {
                    season: season.to_string(),
                    line,
                    message: e.to_string(),
                });
            }
        }
    }

    debug!(season, rows = rows.len(), "Season read");

    Ok(SeasonRows {
        label: season.to_string(),
        rows,
        corrupt_records,
    })
}

fn is_gzip(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("gz"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::env;
    use std::fs;
    use std::io::Write;

    const SAMPLE: &str = "Date,Team,Opponent,Scraped at\n\
        \"Saturday, August 12, 2023\",Arsenal,Chelsea,x\n\
        \"Saturday, August 12, 2023\",Chelsea,Arsenal,y\n";

    fn temp_path(name: &str) -> PathBuf {
        env::temp_dir().join(name)
    }

    #[test]
    fn test_read_season_tags_rows_and_keeps_extra_columns() {
        let rows = read_season("2023-2024", SAMPLE.as_bytes()).unwrap();
        assert_eq!(rows.rows.len(), 2);

        let first = &rows.rows[0];
        assert_eq!(first.season(), "2023-2024");
        assert_eq!(first.get("Team"), Some("Arsenal"));
        assert_eq!(first.get("Scraped at"), Some("x"));
        assert_eq!(first.get("Ball possession"), None);
        assert_eq!(first.line(), 2);

        let columns: Vec<_> = first.columns().map(|(k, _)| k).collect();
        assert_eq!(columns, vec!["Date", "Team", "Opponent", "Scraped at"]);
    }

    #[test]
    fn test_short_record_reads_missing_fields_as_absent() {
        let data = "Team,Opponent,Side\nArsenal,Chelsea\n";
        let rows = read_season("s", data.as_bytes()).unwrap();
        assert_eq!(rows.rows[0].get("Opponent"), Some("Chelsea"));
        assert_eq!(rows.rows[0].get("Side"), None);
    }

    #[test]
    fn test_blank_lines_are_skipped() {
        let data = "Team,Opponent\nArsenal,Chelsea\n,\nChelsea,Arsenal\n";
        let rows = read_season("s", data.as_bytes()).unwrap();
        assert_eq!(rows.rows.len(), 2);
    }

    #[test]
    fn test_invalid_utf8_record_is_reported_not_fatal() {
        let mut data = b"Team,Opponent\nArsenal,Chelsea\n".to_vec();
        data.extend_from_slice(b"Bad\xFF\xFE,Team\n");
        data.extend_from_slice(b"Chelsea,Arsenal\n");

        let rows = read_season("s", data.as_slice()).unwrap();
        assert_eq!(rows.rows.len(), 2);
        assert_eq!(rows.corrupt_records.len(), 1);
        assert_eq!(rows.corrupt_records[0].line, Some(3));
    }

    #[test]
    fn test_missing_file_is_load_error() {
        let source = SeasonSource::new("2023-2024", temp_path("matchday_stats_no_such_file.csv"));
        let err = load_season(&source).unwrap_err();
        assert!(matches!(err, StatsError::Load { ref season, .. } if season == "2023-2024"));
    }

    #[test]
    fn test_load_seasons_preserves_order() {
        let a = temp_path("matchday_stats_loader_a.csv");
        let b = temp_path("matchday_stats_loader_b.csv");
        fs::write(&a, SAMPLE).unwrap();
        fs::write(&b, "Team,Opponent\nLiverpool,Everton\n").unwrap();

        let table = load_seasons(&[
            SeasonSource::new("2024-2025", &b),
            SeasonSource::new("2023-2024", &a),
        ])
        .unwrap();

        assert_eq!(table.seasons, vec!["2024-2025", "2023-2024"]);
        let teams: Vec<_> = table.rows.iter().map(|r| r.get("Team").unwrap()).collect();
        assert_eq!(teams, vec!["Liverpool", "Arsenal", "Chelsea"]);

        fs::remove_file(&a).unwrap();
        fs::remove_file(&b).unwrap();
    }

    #[test]
    fn test_duplicate_season_label_rejected() {
        let source = SeasonSource::new("2023-2024", "a.csv");
        let err = load_seasons(&[source.clone(), source]).unwrap_err();
        assert!(matches!(err, StatsError::InvalidParameter { name: "sources", .. }));
    }

    #[test]
    fn test_gzip_file_loads() {
        let path = temp_path("matchday_stats_loader.csv.gz");
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(SAMPLE.as_bytes()).unwrap();
        fs::write(&path, encoder.finish().unwrap()).unwrap();

        let rows = load_season(&SeasonSource::new("2023-2024", &path)).unwrap();
        assert_eq!(rows.rows.len(), 2);
        assert_eq!(rows.rows[1].get("Team"), Some("Chelsea"));

        fs::remove_file(&path).unwrap();
    }
}
