//! Process-wide cache of the preprocessed match table.
//!
//! The table is keyed by the exact set of season files it was built from.
//! A changed path, label, order or modification time triggers a reload; the
//! cached entry is replaced as a whole, so readers holding the previous
//! `Arc` keep a consistent table.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::SystemTime;
use tracing::{debug, info};

use crate::error::{Result, StatsError};
use crate::loader::{SeasonSource, load_seasons};
use crate::preprocess::{MatchTable, preprocess};

#[derive(Debug, Clone, PartialEq, Eq)]
struct SourceStamp {
    label: String,
    path: PathBuf,
    modified: Option<SystemTime>,
}

type CacheKey = Vec<SourceStamp>;

#[derive(Debug)]
struct CachedTable {
    key: CacheKey,
    table: Arc<MatchTable>,
}

#[derive(Debug, Default)]
pub struct TableCache {
    entry: RwLock<Option<Arc<CachedTable>>>,
    loads: AtomicUsize,
}

impl TableCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached table for `sources`, loading it if the files changed.
    ///
    /// # Errors
    ///
    /// [`StatsError::Load`] when a source file cannot be inspected or read,
    /// plus anything [`load_seasons`] returns.
    #[tracing::instrument(skip_all, fields(sources = sources.len()))]
    pub fn get_or_load(&self, sources: &[SeasonSource]) -> Result<Arc<MatchTable>> {
        let key = cache_key(sources)?;

        if let Some(cached) = self.current() {
            if cached.key == key {
                debug!("Table cache hit");
                return Ok(Arc::clone(&cached.table));
            }
        }

        let raw = load_seasons(sources)?;
        let table = Arc::new(preprocess(&raw));
        let loads = self.loads.fetch_add(1, Ordering::Relaxed) + 1;
        info!(rows = table.len(), loads, "Table cache reloaded");

        let entry = Arc::new(CachedTable {
            key,
            table: Arc::clone(&table),
        });
        *self.entry.write().unwrap_or_else(PoisonError::into_inner) = Some(entry);

        Ok(table)
    }

    /// Drops the cached table; the next call reloads from disk.
    pub fn invalidate(&self) {
        *self.entry.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Number of times the table has been read from disk.
    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::Relaxed)
    }

    fn current(&self) -> Option<Arc<CachedTable>> {
        self.entry
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(Arc::clone)
    }
}

fn cache_key(sources: &[SeasonSource]) -> Result<CacheKey> {
    sources
        .iter()
        .map(|s| {
            let load_error = |source| StatsError::Load {
                season: s.label.clone(),
                path: s.path.clone(),
                source,
            };
            let path = s.path.canonicalize().map_err(load_error)?;
            let modified = path.metadata().map_err(load_error)?.modified().ok();
            Ok(SourceStamp {
                label: s.label.clone(),
                path,
                modified,
            })
        })
        .collect()
}
