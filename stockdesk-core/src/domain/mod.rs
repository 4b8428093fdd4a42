//! Domain types for stockdesk

pub mod record;
pub mod series;

pub use record::{Dataset, PriceRecord};
pub use series::SeriesMatrix;

/// Ticker type alias
pub type Ticker = String;
