//! listing-scrape - product listing scraper for search-results pages.
//!
//! Builds a search URL, walks a fixed number of result pages through a
//! [`scrapers::PageFetcher`], extracts one [`models::ListingRecord`] per
//! listing, and writes the collected rows as CSV or TSV.

pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod output;
pub mod scrapers;

pub use config::{FetcherKind, ScrapeConfig, SiteConfig};
pub use error::{ConfigError, ExtractError, FetchError, ScrapeError};
pub use models::{ListingRecord, PageSummary, ResultSet, ScrapeReport};
pub use output::{write_records, write_records_to_path, OutputFormat};
pub use scrapers::{PageFetcher, SearchScraper};
