//! Output formatting and persistence for analysis results.
//!
//! Supports debug logging, JSON rendering and CSV export.

use anyhow::{Context, Result};
use csv::WriterBuilder;
use serde::Serialize;
use std::fmt::Debug;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};

/// Logs a value using Rust's debug pretty-print format.
pub fn print_pretty<T: Debug>(value: &T) {
    debug!("{:#?}", value);
}

/// Renders a value as pretty-printed JSON.
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Writes a value as pretty-printed JSON followed by a newline.
pub fn print_json<T: Serialize + ?Sized>(out: &mut impl Write, value: &T) -> Result<()> {
    writeln!(out, "{}", to_json(value)?)?;
    Ok(())
}

/// Writes `records` to a CSV file at `path` under `header`, replacing any
/// previous content.
///
/// The header row is written even when `records` is empty, so it must list
/// the record's field names in order. Parent directories are created as
/// needed.
pub fn write_records<T: Serialize>(
    path: impl AsRef<Path>,
    header: &[&str],
    records: &[T],
) -> Result<()> {
    let path = path.as_ref();
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }

    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);

    writer.write_record(header)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;

    info!(path = %path.display(), records = records.len(), "CSV written");
    Ok(())
}
