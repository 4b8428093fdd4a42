//! Record filtering by ticker membership and inclusive date range.

use crate::domain::{PriceRecord, Ticker};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

/// Tickers to keep. Empty means every ticker.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TickerSet(BTreeSet<Ticker>);

impl TickerSet {
    pub fn all() -> Self {
        Self::default()
    }

    /// Parse a comma-separated parameter such as `"ABC, XYZ"`.
    /// Tokens are trimmed; blanks are dropped. Case is preserved.
    pub fn parse(param: &str) -> Self {
        param
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(String::from)
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Exact, case-sensitive membership. An empty set admits everything.
    pub fn admits(&self, ticker: &str) -> bool {
        self.0.is_empty() || self.0.contains(ticker)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|t| t.as_str())
    }
}

impl<S: Into<String>> FromIterator<S> for TickerSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for TickerSet {
    /// `(all)` for an empty set, otherwise the tickers joined by commas.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("(all)");
        }
        let joined: Vec<&str> = self.iter().collect();
        f.write_str(&joined.join(","))
    }
}

/// The filtering half of a query. All predicates are AND-combined.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QueryFilter {
    pub tickers: TickerSet,
    /// Inclusive lower bound.
    pub start: Option<NaiveDate>,
    /// Inclusive upper bound.
    pub end: Option<NaiveDate>,
}

impl QueryFilter {
    pub fn new(tickers: TickerSet, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self {
            tickers,
            start,
            end,
        }
    }

    /// Records lacking a date or ticker never match.
    pub fn matches(&self, record: &PriceRecord) -> bool {
        let (Some(date), Some(ticker)) = (record.date(), record.ticker()) else {
            return false;
        };
        self.tickers.admits(ticker)
            && self.start.map_or(true, |start| date >= start)
            && self.end.map_or(true, |end| date <= end)
    }

    /// Matching records, cloned, in input order.
    pub fn apply<'a, I>(&self, records: I) -> Vec<PriceRecord>
    where
        I: IntoIterator<Item = &'a PriceRecord>,
    {
        records
            .into_iter()
            .filter(|r| self.matches(r))
            .cloned()
            .collect()
    }
}
