//! PriceRecord and Dataset: the fundamental market data units.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

/// One daily observation for one ticker.
///
/// Fields are private: a record is built once by the parser (or a test) and
/// read through accessors afterwards. `date` and `ticker` may be absent at
/// parse time; the query layer drops such records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriceRecord {
    date: Option<NaiveDate>,
    ticker: Option<String>,
    open: Option<Decimal>,
    high: Option<Decimal>,
    low: Option<Decimal>,
    close: Option<Decimal>,
    volume: u64,
}

impl PriceRecord {
    pub fn new(
        date: Option<NaiveDate>,
        ticker: Option<String>,
        open: Option<Decimal>,
        high: Option<Decimal>,
        low: Option<Decimal>,
        close: Option<Decimal>,
        volume: u64,
    ) -> Self {
        Self {
            date,
            ticker,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    pub fn ticker(&self) -> Option<&str> {
        self.ticker.as_deref()
    }

    pub fn open(&self) -> Option<Decimal> {
        self.open
    }

    pub fn high(&self) -> Option<Decimal> {
        self.high
    }

    pub fn low(&self) -> Option<Decimal> {
        self.low
    }

    pub fn close(&self) -> Option<Decimal> {
        self.close
    }

    pub fn volume(&self) -> u64 {
        self.volume
    }

    /// A record can take part in queries only with both a date and a ticker.
    pub fn is_addressable(&self) -> bool {
        self.date.is_some() && self.ticker.is_some()
    }
}

/// Ordered concatenation of every parsed record, in file-enumeration then
/// in-file order. Duplicated (ticker, date) pairs are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Dataset {
    records: Vec<PriceRecord>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[PriceRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PriceRecord> {
        self.records.iter()
    }

    /// Append a file's worth of records, taking ownership of them.
    pub fn append(&mut self, records: Vec<PriceRecord>) {
        self.records.extend(records);
    }

    /// Deterministic BLAKE3 digest over every record, in dataset order.
    ///
    /// Absent fields hash as a distinct marker byte so `None` never collides
    /// with an empty string or zero.
    pub fn fingerprint(&self) -> String {
        let mut hasher = blake3::Hasher::new();

        for record in &self.records {
            hash_opt(&mut hasher, record.date.map(|d| d.to_string()));
            hash_opt(&mut hasher, record.ticker.clone());
            for price in [record.open, record.high, record.low, record.close] {
                hash_opt(&mut hasher, price.map(|p| p.normalize().to_string()));
            }
            hasher.update(&record.volume.to_le_bytes());
        }

        hasher.finalize().to_hex().to_string()
    }
}

fn hash_opt(hasher: &mut blake3::Hasher, value: Option<String>) {
    match value {
        Some(v) => {
            hasher.update(&[1]);
            hasher.update(&(v.len() as u64).to_le_bytes());
            hasher.update(v.as_bytes());
        }
        None => {
            hasher.update(&[0]);
        }
    }
}

impl From<Vec<PriceRecord>> for Dataset {
    fn from(records: Vec<PriceRecord>) -> Self {
        Self { records }
    }
}

impl FromIterator<PriceRecord> for Dataset {
    fn from_iter<I: IntoIterator<Item = PriceRecord>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Dataset {
    type Item = PriceRecord;
    type IntoIter = std::vec::IntoIter<PriceRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a PriceRecord;
    type IntoIter = std::slice::Iter<'a, PriceRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample_record() -> PriceRecord {
        PriceRecord::new(
            NaiveDate::from_ymd_opt(2024, 1, 2),
            Some("ABC".into()),
            Some(dec!(10)),
            Some(dec!(12)),
            Some(dec!(9)),
            Some(dec!(11)),
            1000,
        )
    }

    #[test]
    fn record_without_date_is_not_addressable() {
        let record = PriceRecord::new(None, Some("ABC".into()), None, None, None, None, 0);
        assert!(!record.is_addressable());
        assert!(sample_record().is_addressable());
    }

    #[test]
    fn dataset_append_preserves_order_and_duplicates() {
        let mut ds = Dataset::new();
        ds.append(vec![sample_record()]);
        ds.append(vec![sample_record(), sample_record()]);
        assert_eq!(ds.len(), 3);
        assert!(ds.iter().all(|r| r.ticker() == Some("ABC")));
    }

    #[test]
    fn fingerprint_is_deterministic() {
        let a: Dataset = vec![sample_record()].into();
        let b: Dataset = vec![sample_record()].into();
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_eq!(a.fingerprint().len(), 64);
    }

    #[test]
    fn fingerprint_ignores_decimal_scale() {
        let a: Dataset = vec![sample_record()].into();
        let b: Dataset = vec![PriceRecord::new(
            NaiveDate::from_ymd_opt(2024, 1, 2),
            Some("ABC".into()),
            Some(dec!(10.00)),
            Some(dec!(12)),
            Some(dec!(9)),
            Some(dec!(11.0)),
            1000,
        )]
        .into();
        assert_eq!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn fingerprint_distinguishes_missing_from_empty_ticker() {
        let missing: Dataset =
            vec![PriceRecord::new(None, None, None, None, None, None, 0)].into();
        let empty: Dataset =
            vec![PriceRecord::new(None, Some(String::new()), None, None, None, None, 0)].into();
        assert_ne!(missing.fingerprint(), empty.fingerprint());
    }

    #[test]
    fn record_serializes_decimals_exactly() {
        let json = serde_json::to_value(sample_record()).unwrap();
        assert_eq!(json["ticker"], "ABC");
        assert_eq!(json["date"], "2024-01-02");
        assert_eq!(json["close"], "11");
        assert_eq!(json["volume"], 1000);
    }
}
