//! Pure parsers that turn free-form model output into domain records.
//!
//! Nothing in here performs I/O or fails on "no matches": degraded paths are
//! reported through [`ParseWarning`] values and `tracing` events.

pub mod allocation;
pub mod analysis;
pub mod financials;
pub mod insights;
pub mod json;
pub mod news;
pub mod portfolio;
pub mod sections;
pub mod stocks;

use crate::domain::warning::ParseWarning;

pub use analysis::parse_stock_analysis;
pub use financials::parse_financial_json;
pub use json::extract_json_payload;
pub use news::{parse_news_json, parse_news_json_with, NewsParseOptions};
pub use portfolio::parse_portfolio_text;
pub use sections::{split_sections, Section};

/// Records pulled out of one section body plus the warnings raised while
/// doing so.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction<T> {
    pub records: Vec<T>,
    pub warnings: Vec<ParseWarning>,
}

impl<T> Default for Extraction<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            warnings: Vec::new(),
        }
    }
}
