//! stockdesk core: price record ingestion, querying and pivoting.
//!
//! This crate contains the whole data pipeline:
//! - Domain types (price records, datasets, series matrices)
//! - Schema-tolerant CSV parsing with header aliases and multi-format dates
//! - Best-effort directory loading
//! - Query engine with ticker/date filters and null-last sorting
//! - Pivot into a per-ticker close series on a shared date axis
//! - Configuration and export of results

pub mod config;
pub mod data;
pub mod domain;
pub mod export;
pub mod pivot;
pub mod query;
pub mod service;

pub use config::{AppConfig, ConfigError};
pub use data::load_all;
pub use domain::{Dataset, PriceRecord, SeriesMatrix};
pub use export::{export_run, ExportError, ExportPaths, ExportRequest};
pub use pivot::pivot;
pub use query::{query, QueryFilter, SortDir, SortKey, TickerSet};
pub use service::StockService;

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: every type handed across a request boundary is
    /// Send + Sync, so independent queries can run on separate threads.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<PriceRecord>();
        require_sync::<PriceRecord>();
        require_send::<Dataset>();
        require_sync::<Dataset>();
        require_send::<SeriesMatrix>();
        require_sync::<SeriesMatrix>();
        require_send::<QueryFilter>();
        require_sync::<QueryFilter>();
        require_send::<TickerSet>();
        require_sync::<TickerSet>();
        require_send::<StockService>();
        require_sync::<StockService>();
        require_send::<AppConfig>();
        require_sync::<AppConfig>();
        require_send::<data::SourceSummary>();
        require_sync::<data::SourceSummary>();
    }

    #[test]
    fn queries_run_on_parallel_threads() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("a.csv"),
            "date,ticker,close\n2024-01-02,ABC,1\n2024-01-03,ABC,2\n",
        )
        .unwrap();
        let service = StockService::new(dir.path());

        let counts: Vec<usize> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..4)
                .map(|_| {
                    s.spawn(|| {
                        service
                            .query(&QueryFilter::default(), SortKey::Date, SortDir::Asc)
                            .len()
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        assert_eq!(counts, vec![2, 2, 2, 2]);
    }
}
