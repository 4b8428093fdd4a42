//! Sort keys, directions and the null-last comparator.
//!
//! Nulls are resolved before the direction is applied, so `desc` reverses
//! only the non-null values and absent values stay at the end either way.

use crate::domain::PriceRecord;
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    Date,
    Ticker,
    Open,
    High,
    Low,
    Close,
    Volume,
}

impl SortKey {
    /// Case-insensitive; anything unrecognized sorts by date.
    pub fn parse(param: &str) -> Self {
        match param.trim().to_lowercase().as_str() {
            "ticker" => SortKey::Ticker,
            "open" => SortKey::Open,
            "high" => SortKey::High,
            "low" => SortKey::Low,
            "close" => SortKey::Close,
            "volume" => SortKey::Volume,
            _ => SortKey::Date,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::Date => "date",
            SortKey::Ticker => "ticker",
            SortKey::Open => "open",
            SortKey::High => "high",
            SortKey::Low => "low",
            SortKey::Close => "close",
            SortKey::Volume => "volume",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDir {
    #[default]
    Asc,
    Desc,
}

impl SortDir {
    /// Only `desc` (any case) is descending.
    pub fn parse(param: &str) -> Self {
        if param.trim().eq_ignore_ascii_case("desc") {
            SortDir::Desc
        } else {
            SortDir::Asc
        }
    }

    pub fn apply(self, ord: Ordering) -> Ordering {
        match self {
            SortDir::Asc => ord,
            SortDir::Desc => ord.reverse(),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortDir::Asc => "asc",
            SortDir::Desc => "desc",
        }
    }
}

impl fmt::Display for SortDir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Absent values after present ones; direction flips present values only.
pub fn null_last<T: Ord>(a: Option<T>, b: Option<T>, dir: SortDir) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => dir.apply(a.cmp(&b)),
    }
}

/// Compare two records on one key.
pub fn compare(a: &PriceRecord, b: &PriceRecord, key: SortKey, dir: SortDir) -> Ordering {
    match key {
        SortKey::Date => null_last(a.date(), b.date(), dir),
        SortKey::Ticker => null_last(a.ticker(), b.ticker(), dir),
        SortKey::Open => null_last(a.open(), b.open(), dir),
        SortKey::High => null_last(a.high(), b.high(), dir),
        SortKey::Low => null_last(a.low(), b.low(), dir),
        SortKey::Close => null_last(a.close(), b.close(), dir),
        SortKey::Volume => null_last(Some(a.volume()), Some(b.volume()), dir),
    }
}

/// Stable in-place sort; ties keep their input order.
pub fn sort_records(records: &mut [PriceRecord], key: SortKey, dir: SortDir) {
    records.sort_by(|a, b| compare(a, b, key, dir));
}
