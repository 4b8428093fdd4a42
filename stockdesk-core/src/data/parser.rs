//! Record parser: one delimited-text source in, typed price records out.
//!
//! Ingestion is best-effort per file and fail-fast per row:
//! - a malformed price aborts only its own row
//! - an unparseable date becomes `None`, a bad volume becomes `0`
//! - an I/O or UTF-8 error mid-file stops that file, keeping rows already parsed
//!
//! The delimiter is a bare comma. Quote characters carry no meaning, so a
//! field containing a comma shifts the rest of its row; that row then parses
//! into whatever the shifted columns hold.

use crate::data::header::{CanonicalField, ColumnIndex};
use crate::domain::PriceRecord;
use chrono::{Datelike, Months, NaiveDate};
use csv::StringRecord;
use rust_decimal::Decimal;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, warn};

/// How a day past the end of its month is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayResolution {
    /// `2024-02-30` is not a date.
    Strict,
    /// A day in 1..=31 is clamped to the month's last day.
    ClampToMonthEnd,
}

/// Accepted date layouts in priority order: a textual shape (`d` = ASCII
/// digit, anything else literal), the chrono pattern that reads it, and its
/// day resolution.
pub const DATE_FORMATS: &[(&str, &str, DayResolution)] = &[
    ("dddd-dd-dd", "%Y-%m-%d", DayResolution::Strict),
    ("dddddddd", "%Y%m%d", DayResolution::ClampToMonthEnd),
    ("dd/dd/dddd", "%d/%m/%Y", DayResolution::ClampToMonthEnd),
];

/// Why a single row was rejected.
#[derive(Debug, Error)]
pub enum RowError {
    #[error("malformed {field} value '{raw}'")]
    MalformedDecimal { field: CanonicalField, raw: String },
}

/// Records parsed from one source plus how many rows were dropped.
#[derive(Debug, Clone, Default)]
pub struct ParsedFile {
    pub records: Vec<PriceRecord>,
    pub skipped_rows: usize,
}

/// Parse one source into records. Bad rows are dropped silently.
pub fn parse_reader<R: Read>(reader: R) -> Vec<PriceRecord> {
    parse_reader_detailed(reader).records
}

/// Parse one source, also counting rows that were dropped.
pub fn parse_reader_detailed<R: Read>(reader: R) -> ParsedFile {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .delimiter(b',')
        .from_reader(reader);

    let mut out = ParsedFile::default();
    let mut rows = rdr.records();

    let header = match rows.next() {
        None => return out,
        Some(Ok(header)) => header,
        Some(Err(e)) => {
            warn!(error = %e, "unreadable header row");
            return out;
        }
    };
    let columns = ColumnIndex::from_headers(header.iter());
    let missing = columns.missing();
    if !missing.is_empty() {
        debug!(?missing, "header lacks canonical columns");
    }

    for row in rows {
        match row {
            Ok(row) => {
                if is_blank(&row) {
                    continue;
                }
                match parse_row(&row, &columns) {
                    Ok(record) => out.records.push(record),
                    Err(e) => {
                        out.skipped_rows += 1;
                        debug!(line = ?row.position().map(|p| p.line()), error = %e, "skipping row");
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, kept = out.records.len(), "read error, stopping file");
                break;
            }
        }
    }

    out
}

/// Open and parse a file on disk.
pub fn parse_file(path: &Path) -> std::io::Result<ParsedFile> {
    let file = File::open(path)?;
    Ok(parse_reader_detailed(file))
}

fn is_blank(row: &StringRecord) -> bool {
    row.len() == 1 && row.get(0).is_some_and(|f| f.trim().is_empty())
}

/// Build one record. Only a malformed price fails the row.
pub fn parse_row(row: &StringRecord, columns: &ColumnIndex) -> Result<PriceRecord, RowError> {
    let field = |f: CanonicalField| columns.get(f).and_then(|i| row.get(i)).map(str::trim);

    Ok(PriceRecord::new(
        field(CanonicalField::Date).and_then(parse_date),
        field(CanonicalField::Ticker).map(String::from),
        parse_price(CanonicalField::Open, field(CanonicalField::Open))?,
        parse_price(CanonicalField::High, field(CanonicalField::High))?,
        parse_price(CanonicalField::Low, field(CanonicalField::Low))?,
        parse_price(CanonicalField::Close, field(CanonicalField::Close))?,
        parse_volume(field(CanonicalField::Volume)),
    ))
}

/// First layout in [`DATE_FORMATS`] that matches wins; otherwise `None`.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    DATE_FORMATS
        .iter()
        .filter(|(shape, _, _)| matches_shape(text, shape))
        .find_map(|(_, fmt, resolution)| {
            NaiveDate::parse_from_str(text, fmt)
                .ok()
                .or_else(|| match resolution {
                    DayResolution::Strict => None,
                    DayResolution::ClampToMonthEnd => {
                        split_ymd(text, fmt).and_then(|(y, m, d)| clamp_to_month_end(y, m, d))
                    }
                })
        })
}

/// Numeric year, month and day of text already known to match the shape of
/// `fmt`. Only `%Y`, `%m` and `%d` are understood.
fn split_ymd(text: &str, fmt: &str) -> Option<(i32, u32, u32)> {
    let (mut year, mut month, mut day) = (None, None, None);
    let mut pos = 0;
    let mut spec = fmt.chars();
    while let Some(c) = spec.next() {
        if c != '%' {
            pos += c.len_utf8();
            continue;
        }
        let (width, slot) = match spec.next()? {
            'Y' => (4, &mut year),
            'm' => (2, &mut month),
            'd' => (2, &mut day),
            _ => return None,
        };
        *slot = Some(text.get(pos..pos + width)?.parse::<u32>().ok()?);
        pos += width;
    }
    Some((i32::try_from(year?).ok()?, month?, day?))
}

fn clamp_to_month_end(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    if !(1..=31).contains(&day) {
        return None;
    }
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let last = first.checked_add_months(Months::new(1))?.pred_opt()?.day();
    NaiveDate::from_ymd_opt(year, month, day.min(last))
}

/// Plain decimal grammar: optional sign, digits with at most one point (at
/// least one digit overall), optional exponent with its own optional sign.
fn is_decimal_literal(text: &str) -> bool {
    fn unsigned(s: &str) -> &str {
        s.strip_prefix(|c| c == '+' || c == '-').unwrap_or(s)
    }
    fn digits(s: &str) -> bool {
        s.bytes().all(|b| b.is_ascii_digit())
    }

    let (mantissa, exponent) = match text.split_once(|c| c == 'e' || c == 'E') {
        Some((m, e)) => (m, Some(e)),
        None => (text, None),
    };
    let mantissa = unsigned(mantissa);
    let (int_part, frac_part) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    let mantissa_ok = !(int_part.is_empty() && frac_part.is_empty())
        && digits(int_part)
        && digits(frac_part);

    let exponent_ok = exponent.map_or(true, |e| {
        let e = unsigned(e);
        !e.is_empty() && digits(e)
    });

    mantissa_ok && exponent_ok
}

fn matches_shape(text: &str, shape: &str) -> bool {
    text.len() == shape.len()
        && text.bytes().zip(shape.bytes()).all(|(c, s)| match s {
            b'd' => c.is_ascii_digit(),
            lit => c == lit,
        })
}

/// Empty or missing text is `None`; anything else must be a decimal.
pub fn parse_price(field: CanonicalField, text: Option<&str>) -> Result<Option<Decimal>, RowError> {
    let text = match text.map(str::trim) {
        None | Some("") => return Ok(None),
        Some(t) => t,
    };
    let malformed = || RowError::MalformedDecimal {
        field,
        raw: text.to_string(),
    };
    if !is_decimal_literal(text) {
        return Err(malformed());
    }
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .map(Some)
        .map_err(|_| malformed())
}

/// Missing, empty, negative or otherwise unparseable volume reads as `0`.
pub fn parse_volume(text: Option<&str>) -> u64 {
    text.and_then(|t| t.trim().parse::<u64>().ok()).unwrap_or(0)
}
