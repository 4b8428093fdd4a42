//! Export of query and pivot results for offline consumers.
//!
//! One export run writes three artifacts into its own timestamped directory:
//! - `rows.csv`: the sorted listing, null prices as empty cells
//! - `series.json`: the pivot matrix
//! - `manifest.json`: title, filters, counts, dataset fingerprint

use crate::domain::{PriceRecord, SeriesMatrix};
use crate::query::{QueryFilter, SortDir, SortKey};
use chrono::NaiveDateTime;
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

pub const ROWS_FILE: &str = "rows.csv";
pub const SERIES_FILE: &str = "series.json";
pub const MANIFEST_FILE: &str = "manifest.json";

/// Column order of `rows.csv`.
pub const ROW_HEADER: [&str; 7] = ["date", "ticker", "open", "high", "low", "close", "volume"];

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("export I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Filters as they appear in the manifest: plain strings, empty when unset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActiveFilters {
    pub tickers: String,
    pub start_date: String,
    pub end_date: String,
    pub sort_by: String,
    pub sort_dir: String,
}

impl ActiveFilters {
    pub fn describe(filter: &QueryFilter, key: SortKey, dir: SortDir) -> Self {
        Self {
            tickers: filter.tickers.to_string(),
            start_date: filter.start.map(|d| d.to_string()).unwrap_or_default(),
            end_date: filter.end.map(|d| d.to_string()).unwrap_or_default(),
            sort_by: key.to_string(),
            sort_dir: dir.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ExportManifest {
    pub title: String,
    pub generated_at: NaiveDateTime,
    pub filters: ActiveFilters,
    pub row_count: usize,
    pub category_count: usize,
    pub ticker_count: usize,
    pub dataset_fingerprint: String,
}

/// Everything one export run needs.
#[derive(Debug, Clone, Copy)]
pub struct ExportRequest<'a> {
    pub title: &'a str,
    pub filter: &'a QueryFilter,
    pub sort_key: SortKey,
    pub sort_dir: SortDir,
    pub rows: &'a [PriceRecord],
    pub matrix: &'a SeriesMatrix,
    pub dataset_fingerprint: &'a str,
}

/// Paths of the artifacts written by [`export_run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPaths {
    pub dir: PathBuf,
    pub rows_csv: PathBuf,
    pub series_json: PathBuf,
    pub manifest_json: PathBuf,
}

/// Write rows as CSV with the [`ROW_HEADER`] columns.
pub fn write_rows_csv<W: Write>(writer: W, rows: &[PriceRecord]) -> Result<(), ExportError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(ROW_HEADER)?;

    let text = |v: Option<rust_decimal::Decimal>| v.map(|d| d.to_string()).unwrap_or_default();
    for row in rows {
        wtr.write_record([
            row.date().map(|d| d.to_string()).unwrap_or_default(),
            row.ticker().unwrap_or_default().to_string(),
            text(row.open()),
            text(row.high()),
            text(row.low()),
            text(row.close()),
            row.volume().to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Serialize a pivot matrix to pretty JSON.
pub fn series_json(matrix: &SeriesMatrix) -> Result<String, ExportError> {
    Ok(serde_json::to_string_pretty(matrix)?)
}

/// Create a fresh run directory under `parent`, named by timestamp.
fn create_run_dir(parent: &Path, at: NaiveDateTime) -> Result<PathBuf, ExportError> {
    std::fs::create_dir_all(parent)?;
    let stem = format!("export-{}", at.format("%Y%m%d-%H%M%S"));

    let mut candidate = parent.join(&stem);
    let mut n = 1;
    loop {
        match std::fs::create_dir(&candidate) {
            Ok(()) => return Ok(candidate),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                n += 1;
                candidate = parent.join(format!("{stem}-{n}"));
            }
            Err(e) => return Err(e.into()),
        }
    }
}

/// Write rows, series and manifest into a new directory under `export_dir`.
pub fn export_run(export_dir: &Path, req: &ExportRequest<'_>) -> Result<ExportPaths, ExportError> {
    let generated_at = chrono::Local::now().naive_local();
    let dir = create_run_dir(export_dir, generated_at)?;

    let rows_csv = dir.join(ROWS_FILE);
    write_rows_csv(std::fs::File::create(&rows_csv)?, req.rows)?;

    let series_path = dir.join(SERIES_FILE);
    std::fs::write(&series_path, series_json(req.matrix)?)?;

    let manifest = ExportManifest {
        title: req.title.to_string(),
        generated_at,
        filters: ActiveFilters::describe(req.filter, req.sort_key, req.sort_dir),
        row_count: req.rows.len(),
        category_count: req.matrix.categories().len(),
        ticker_count: req.matrix.series().len(),
        dataset_fingerprint: req.dataset_fingerprint.to_string(),
    };
    let manifest_json = dir.join(MANIFEST_FILE);
    std::fs::write(&manifest_json, serde_json::to_string_pretty(&manifest)?)?;

    info!(dir = %dir.display(), rows = req.rows.len(), "export written");

    Ok(ExportPaths {
        dir,
        rows_csv,
        series_json: series_path,
        manifest_json,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::TickerSet;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use std::collections::BTreeMap;

    fn rows() -> Vec<PriceRecord> {
        vec![
            PriceRecord::new(
                NaiveDate::from_ymd_opt(2024, 1, 2),
                Some("ABC".into()),
                Some(dec!(10)),
                Some(dec!(12)),
                Some(dec!(9)),
                Some(dec!(11)),
                1000,
            ),
            PriceRecord::new(
                NaiveDate::from_ymd_opt(2024, 1, 3),
                Some("ABC".into()),
                None,
                None,
                None,
                Some(dec!(12.5)),
                0,
            ),
        ]
    }

    fn matrix() -> SeriesMatrix {
        let mut series = BTreeMap::new();
        series.insert("ABC".to_string(), vec![Some(11.0), Some(12.5)]);
        SeriesMatrix::new(vec!["2024-01-02".into(), "2024-01-03".into()], series)
    }

    #[test]
    fn csv_writes_empty_cells_for_null_prices() {
        let mut buf = Vec::new();
        write_rows_csv(&mut buf, &rows()).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "date,ticker,open,high,low,close,volume");
        assert_eq!(lines[1], "2024-01-02,ABC,10,12,9,11,1000");
        assert_eq!(lines[2], "2024-01-03,ABC,,,,12.5,0");
    }

    #[test]
    fn active_filters_render_unset_values_as_empty() {
        let filters = ActiveFilters::describe(&QueryFilter::default(), SortKey::Close, SortDir::Desc);
        assert_eq!(filters.tickers, "(all)");
        assert_eq!(filters.start_date, "");
        assert_eq!(filters.sort_by, "close");
        assert_eq!(filters.sort_dir, "desc");
    }

    #[test]
    fn export_run_writes_all_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let filter = QueryFilter::new(TickerSet::parse("ABC"), NaiveDate::from_ymd_opt(2024, 1, 1), None);
        let rows = rows();
        let matrix = matrix();
        let req = ExportRequest {
            title: "Stocks Dashboard",
            filter: &filter,
            sort_key: SortKey::Date,
            sort_dir: SortDir::Asc,
            rows: &rows,
            matrix: &matrix,
            dataset_fingerprint: "abc123",
        };

        let paths = export_run(dir.path(), &req).unwrap();
        assert!(paths.rows_csv.is_file());
        assert!(paths.series_json.is_file());

        let manifest: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&paths.manifest_json).unwrap()).unwrap();
        assert_eq!(manifest["row_count"], 2);
        assert_eq!(manifest["category_count"], 2);
        assert_eq!(manifest["filters"]["tickers"], "ABC");
        assert_eq!(manifest["filters"]["start_date"], "2024-01-01");
        assert_eq!(manifest["dataset_fingerprint"], "abc123");
    }

    #[test]
    fn repeated_exports_do_not_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let filter = QueryFilter::default();
        let rows = rows();
        let matrix = matrix();
        let req = ExportRequest {
            title: "t",
            filter: &filter,
            sort_key: SortKey::Date,
            sort_dir: SortDir::Asc,
            rows: &rows,
            matrix: &matrix,
            dataset_fingerprint: "",
        };
        let first = export_run(dir.path(), &req).unwrap();
        let second = export_run(dir.path(), &req).unwrap();
        assert_ne!(first.dir, second.dir);
    }
}
