//! SeriesMatrix: the pivot output consumed by chart and export code.

use serde::Serialize;
use std::collections::BTreeMap;

/// Close prices per ticker on a shared date axis.
///
/// Every series has exactly `categories.len()` entries; `None` marks a date
/// the ticker has no observation for. Tickers iterate in lexical order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SeriesMatrix {
    categories: Vec<String>,
    series: BTreeMap<String, Vec<Option<f64>>>,
}

impl SeriesMatrix {
    pub fn new(categories: Vec<String>, series: BTreeMap<String, Vec<Option<f64>>>) -> Self {
        debug_assert!(series.values().all(|s| s.len() == categories.len()));
        Self { categories, series }
    }

    /// ISO `YYYY-MM-DD` dates, ascending and deduplicated.
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn series(&self) -> &BTreeMap<String, Vec<Option<f64>>> {
        &self.series
    }

    pub fn get(&self, ticker: &str) -> Option<&[Option<f64>]> {
        self.series.get(ticker).map(|v| v.as_slice())
    }

    pub fn tickers(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(|k| k.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_gaps_as_null() {
        let mut series = BTreeMap::new();
        series.insert("ABC".to_string(), vec![Some(11.0), Some(12.5)]);
        series.insert("XYZ".to_string(), vec![Some(20.0), None]);
        let matrix = SeriesMatrix::new(vec!["2024-01-02".into(), "2024-01-03".into()], series);

        let json = serde_json::to_value(&matrix).unwrap();
        assert_eq!(json["categories"][1], "2024-01-03");
        assert_eq!(json["series"]["XYZ"][1], serde_json::Value::Null);
        assert_eq!(json["series"]["ABC"][1], 12.5);
    }

    #[test]
    fn tickers_iterate_lexically() {
        let mut series = BTreeMap::new();
        series.insert("ZZZ".to_string(), vec![]);
        series.insert("AAA".to_string(), vec![]);
        let matrix = SeriesMatrix::new(vec![], series);
        let tickers: Vec<&str> = matrix.tickers().collect();
        assert_eq!(tickers, vec!["AAA", "ZZZ"]);
        assert!(matrix.is_empty());
    }
}
