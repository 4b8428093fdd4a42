//! Request-scoped facade over loader, query engine and pivot.
//!
//! Every call re-reads the source directory; nothing is cached between
//! calls, so concurrent callers never share mutable state.

use crate::config::AppConfig;
use crate::data::{load_all, scan_sources, SourceSummary};
use crate::domain::{Dataset, PriceRecord, SeriesMatrix};
use crate::pivot::pivot;
use crate::query::{query, QueryFilter, SortDir, SortKey};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct StockService {
    csv_root: PathBuf,
}

impl StockService {
    pub fn new(csv_root: impl Into<PathBuf>) -> Self {
        Self {
            csv_root: csv_root.into(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.csv_root.clone())
    }

    pub fn csv_root(&self) -> &Path {
        &self.csv_root
    }

    /// Fresh dataset from disk.
    pub fn load_all(&self) -> Dataset {
        load_all(&self.csv_root)
    }

    /// Flat listing of matching rows.
    pub fn query(&self, filter: &QueryFilter, key: SortKey, dir: SortDir) -> Vec<PriceRecord> {
        query(&self.load_all(), filter, key, dir)
    }

    /// Close-price matrix for charting.
    pub fn chart(&self, filter: &QueryFilter) -> SeriesMatrix {
        pivot(&self.load_all(), filter)
    }

    /// Per-file row counts.
    pub fn sources(&self) -> Vec<SourceSummary> {
        scan_sources(&self.csv_root)
    }
}
