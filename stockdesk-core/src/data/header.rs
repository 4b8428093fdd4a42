//! Header normalization: maps aliased column names onto the canonical set.
//!
//! Source files come from different exporters and spell their headers
//! differently (`PortDate` vs `date`, `Closing` vs `close`). The alias table
//! below is pure data: adding a spelling means adding a row, never a branch.

use std::collections::HashMap;
use std::fmt;

/// Input spellings (already trimmed and lower-cased) and the canonical name
/// they stand for.
pub const HEADER_ALIASES: &[(&str, &str)] = &[
    ("portdate", "date"),
    ("portid", "ticker"),
    ("opening", "open"),
    ("closing", "close"),
];

/// The seven canonical columns every input schema is normalized onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CanonicalField {
    Date,
    Ticker,
    Open,
    High,
    Low,
    Close,
    Volume,
}

impl CanonicalField {
    pub const ALL: [CanonicalField; 7] = [
        CanonicalField::Date,
        CanonicalField::Ticker,
        CanonicalField::Open,
        CanonicalField::High,
        CanonicalField::Low,
        CanonicalField::Close,
        CanonicalField::Volume,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CanonicalField::Date => "date",
            CanonicalField::Ticker => "ticker",
            CanonicalField::Open => "open",
            CanonicalField::High => "high",
            CanonicalField::Low => "low",
            CanonicalField::Close => "close",
            CanonicalField::Volume => "volume",
        }
    }
}

impl fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Normalize one header token: trim, lower-case, then resolve aliases.
/// Unknown tokens pass through unchanged. A leading byte-order mark (spreadsheet
/// exports) is dropped.
pub fn normalize_header(raw: &str) -> String {
    let token = raw.trim_start_matches('\u{feff}').trim().to_lowercase();
    HEADER_ALIASES
        .iter()
        .find(|(alias, _)| *alias == token)
        .map(|(_, canonical)| (*canonical).to_string())
        .unwrap_or(token)
}

/// Column positions keyed by normalized header name, built once per file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnIndex {
    positions: HashMap<String, usize>,
}

impl ColumnIndex {
    /// Build from a raw header row. When two headers normalize to the same
    /// name the later column wins.
    pub fn from_headers<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut positions = HashMap::new();
        for (i, raw) in headers.into_iter().enumerate() {
            positions.insert(normalize_header(raw.as_ref()), i);
        }
        Self { positions }
    }

    /// Zero-based column of a canonical field, if the file has one.
    pub fn get(&self, field: CanonicalField) -> Option<usize> {
        self.position(field.name())
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.positions.get(name).copied()
    }

    /// Canonical fields the header row does not provide.
    pub fn missing(&self) -> Vec<CanonicalField> {
        CanonicalField::ALL
            .into_iter()
            .filter(|f| self.get(*f).is_none())
            .collect()
    }
}
