//! Data ingestion: header normalization, row parsing, directory loading

pub mod header;
pub mod loader;
pub mod parser;

pub use header::{normalize_header, CanonicalField, ColumnIndex, HEADER_ALIASES};
pub use loader::{is_source_file, list_sources, load_all, scan_sources, SourceSummary};
pub use parser::{parse_file, parse_reader, parse_reader_detailed, ParsedFile, RowError};
