//! Pivot of filtered records into a per-ticker close series on a shared
//! date axis.
//!
//! The axis is the union of dates across all tickers. A ticker with no
//! record on an axis date gets an explicit gap (`None`); nothing is
//! interpolated or forward-filled.

use crate::domain::{Dataset, PriceRecord, SeriesMatrix};
use crate::query::{query, QueryFilter, SortDir, SortKey};
use rust_decimal::prelude::ToPrimitive;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Category labels are ISO dates, so lexical order is chronological.
pub const CATEGORY_FORMAT: &str = "%Y-%m-%d";

/// Filter `dataset` and pivot the result. The requested sort of any
/// companion listing does not matter: the pivot always starts from a
/// date-ascending baseline.
pub fn pivot(dataset: &Dataset, filter: &QueryFilter) -> SeriesMatrix {
    let rows = query(dataset, filter, SortKey::Date, SortDir::Asc);
    pivot_rows(&rows)
}

/// Pivot already-filtered rows. Rows without a date or ticker are ignored.
pub fn pivot_rows(rows: &[PriceRecord]) -> SeriesMatrix {
    // Group by ticker; BTreeMap gives lexical ticker order
    let mut by_ticker: BTreeMap<&str, Vec<&PriceRecord>> = BTreeMap::new();
    let mut all_dates = BTreeSet::new();

    for row in rows {
        let (Some(date), Some(ticker)) = (row.date(), row.ticker()) else {
            continue;
        };
        all_dates.insert(date.format(CATEGORY_FORMAT).to_string());
        by_ticker.entry(ticker).or_default().push(row);
    }
    let categories: Vec<String> = all_dates.into_iter().collect();

    let mut series = BTreeMap::new();
    for (ticker, mut records) in by_ticker {
        // Sort first, then insert with overwrite: the last record for a
        // date in sorted order wins, even when its close is absent.
        records.sort_by_key(|r| r.date());
        let mut lookup: HashMap<String, Option<f64>> = HashMap::new();
        for record in records {
            if let Some(date) = record.date() {
                lookup.insert(
                    date.format(CATEGORY_FORMAT).to_string(),
                    record.close().and_then(|c| c.to_f64()),
                );
            }
        }

        let values: Vec<Option<f64>> = categories
            .iter()
            .map(|c| lookup.get(c).copied().flatten())
            .collect();
        series.insert(ticker.to_string(), values);
    }

    SeriesMatrix::new(categories, series)
}
