//! Query engine: filter a dataset, then sort it.

pub mod filter;
pub mod sort;

pub use filter::{QueryFilter, TickerSet};
pub use sort::{compare, null_last, sort_records, SortDir, SortKey};

use crate::domain::{Dataset, PriceRecord};

/// Filter `dataset` and return the matching records sorted by `key`/`dir`.
///
/// Duplicate (ticker, date) rows are all returned. An empty or non-matching
/// dataset yields an empty vector.
pub fn query(
    dataset: &Dataset,
    filter: &QueryFilter,
    key: SortKey,
    dir: SortDir,
) -> Vec<PriceRecord> {
    let mut rows = filter.apply(dataset);
    sort_records(&mut rows, key, dir);
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn dataset() -> Dataset {
        let d = |day| NaiveDate::from_ymd_opt(2024, 1, day);
        vec![
            PriceRecord::new(d(3), Some("XYZ".into()), None, None, None, Some(dec!(5)), 10),
            PriceRecord::new(d(2), Some("ABC".into()), None, None, None, Some(dec!(11)), 20),
            PriceRecord::new(None, Some("ABC".into()), None, None, None, Some(dec!(1)), 0),
            PriceRecord::new(d(2), Some("XYZ".into()), None, None, None, None, 30),
            PriceRecord::new(d(3), Some("ABC".into()), None, None, None, Some(dec!(12)), 40),
        ]
        .into()
    }

    #[test]
    fn default_sort_is_date_ascending() {
        let rows = query(&dataset(), &QueryFilter::default(), SortKey::Date, SortDir::Asc);
        let dates: Vec<u32> = rows
            .iter()
            .map(|r| chrono::Datelike::day(&r.date().unwrap()))
            .collect();
        assert_eq!(dates, vec![2, 2, 3, 3]);
        // stable: ABC (input index 1) before XYZ (input index 3) on day 2
        assert_eq!(rows[0].ticker(), Some("ABC"));
    }

    #[test]
    fn empty_ticker_set_returns_all_tickers() {
        let rows = query(&dataset(), &QueryFilter::default(), SortKey::Date, SortDir::Asc);
        assert_eq!(rows.len(), 4);
    }

    #[test]
    fn unmatched_ticker_returns_empty() {
        let filter = QueryFilter::new(TickerSet::parse("ZZZ"), None, None);
        assert!(query(&dataset(), &filter, SortKey::Date, SortDir::Asc).is_empty());
    }

    #[test]
    fn close_desc_puts_null_close_last() {
        let rows = query(&dataset(), &QueryFilter::default(), SortKey::Close, SortDir::Desc);
        let closes: Vec<Option<_>> = rows.iter().map(|r| r.close()).collect();
        assert_eq!(closes, vec![Some(dec!(12)), Some(dec!(11)), Some(dec!(5)), None]);
    }

    #[test]
    fn empty_dataset_yields_empty_result() {
        let rows = query(&Dataset::new(), &QueryFilter::default(), SortKey::Ticker, SortDir::Desc);
        assert!(rows.is_empty());
    }
}
