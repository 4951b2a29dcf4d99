//! Scraped listing records and run reports.

use serde::{Deserialize, Serialize};

/// Column headers of the output file, in record field order.
pub const HEADER: [&str; 5] = ["Description", "Price", "Rating", "ReviewCount", "Url"];

/// One product entry extracted from a search-results page.
///
/// `description` and `product_url` are never empty; the other fields are
/// empty strings when the listing markup did not carry them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingRecord {
    pub description: String,
    pub price: String,
    pub rating: String,
    pub review_count: String,
    pub product_url: String,
}

impl ListingRecord {
    /// Build a record, collapsing absent optional fields to empty strings.
    pub fn new(
        description: String,
        product_url: String,
        price: Option<String>,
        rating: Option<String>,
        review_count: Option<String>,
    ) -> Self {
        Self {
            description,
            price: price.unwrap_or_default(),
            rating: rating.unwrap_or_default(),
            review_count: review_count.unwrap_or_default(),
            product_url,
        }
    }

    /// Fields in output column order (see [`HEADER`]).
    pub fn to_row(&self) -> [&str; 5] {
        [
            &self.description,
            &self.price,
            &self.rating,
            &self.review_count,
            &self.product_url,
        ]
    }
}

/// Records accumulated over a run, in page order then DOM order.
pub type ResultSet = Vec<ListingRecord>;

/// What happened on a single page of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSummary {
    /// 1-based page index.
    pub page: u32,
    pub url: String,
    /// Listing containers found on the page.
    pub listings: usize,
    /// Listings dropped for missing required fields.
    pub skipped: usize,
}

impl PageSummary {
    pub fn extracted(&self) -> usize {
        self.listings - self.skipped
    }
}

/// Outcome of a completed run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScrapeReport {
    pub records: ResultSet,
    pub pages: Vec<PageSummary>,
}

impl ScrapeReport {
    /// Total listings skipped across all pages.
    pub fn skipped(&self) -> usize {
        self.pages.iter().map(|p| p.skipped).sum()
    }
}
