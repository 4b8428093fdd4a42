//! Dataset loading from a directory of CSV files.
//!
//! Loading never fails from the caller's point of view:
//! 1. Missing directory → empty dataset
//! 2. Directory that cannot be listed → empty dataset
//! 3. File that cannot be opened or read → contributes the rows read so far
//!
//! Every degraded path is logged, so an empty result can still be diagnosed
//! from the logs.

use crate::data::parser::{parse_file, ParsedFile};
use crate::domain::Dataset;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Extension (compared case-insensitively) of source files.
pub const SOURCE_EXTENSION: &str = ".csv";

/// Per-file outcome, for the `sources` listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSummary {
    pub path: PathBuf,
    pub rows: usize,
    pub skipped_rows: usize,
    /// False when the file could not be opened at all.
    pub readable: bool,
}

/// Whether a path names a source file by extension.
pub fn is_source_file(path: &Path) -> bool {
    path.file_name()
        .map(|n| n.to_string_lossy().to_lowercase().ends_with(SOURCE_EXTENSION))
        .unwrap_or(false)
}

/// Source files directly inside `dir`, in directory-listing order.
///
/// Returns an empty list when the directory is missing or cannot be listed.
pub fn list_sources(dir: &Path) -> Vec<PathBuf> {
    if !dir.exists() {
        debug!(dir = %dir.display(), "source directory does not exist");
        return Vec::new();
    }

    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(dir = %dir.display(), error = %e, "cannot list source directory");
            return Vec::new();
        }
    };

    let mut files = Vec::new();
    for entry in entries {
        match entry {
            Ok(entry) => {
                let path = entry.path();
                if is_source_file(&path) {
                    files.push(path);
                }
            }
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "cannot list source directory");
                return Vec::new();
            }
        }
    }
    files
}

fn load_file(path: &Path) -> Option<ParsedFile> {
    match parse_file(path) {
        Ok(parsed) => {
            debug!(
                file = %path.display(),
                rows = parsed.records.len(),
                skipped = parsed.skipped_rows,
                "parsed source file"
            );
            Some(parsed)
        }
        Err(e) => {
            warn!(file = %path.display(), error = %e, "cannot open source file");
            None
        }
    }
}

/// Load every source file in `dir` into one dataset.
///
/// Records keep file-enumeration order, then in-file order.
pub fn load_all(dir: &Path) -> Dataset {
    let files = list_sources(dir);
    let mut dataset = Dataset::new();

    for path in &files {
        if let Some(parsed) = load_file(path) {
            dataset.append(parsed.records);
        }
    }

    info!(
        dir = %dir.display(),
        files = files.len(),
        records = dataset.len(),
        "loaded dataset"
    );
    dataset
}

/// Parse every source file and report row counts without keeping records.
pub fn scan_sources(dir: &Path) -> Vec<SourceSummary> {
    list_sources(dir)
        .into_iter()
        .map(|path| match load_file(&path) {
            Some(parsed) => SourceSummary {
                rows: parsed.records.len(),
                skipped_rows: parsed.skipped_rows,
                readable: true,
                path,
            },
            None => SourceSummary {
                rows: 0,
                skipped_rows: 0,
                readable: false,
                path,
            },
        })
        .collect()
}
