//! Listing extraction from search-results markup.
//!
//! A listing's description and link are required: a node without them is
//! rejected with an [`ExtractError`] and never produces a partial record.
//! Price, rating and review count are looked up independently and fall back
//! to empty strings.

use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use super::search_url::resolve_url;
use crate::config::SiteConfig;
use crate::error::{ExtractError, ScrapeError};
use crate::models::ListingRecord;

/// Compiled CSS selectors for one site layout.
#[derive(Debug, Clone)]
pub struct ListingSelectors {
    listing: Selector,
    heading: Selector,
    anchor: Selector,
    price: Selector,
    rating: Selector,
    review_count: Selector,
}

impl ListingSelectors {
    /// Compile the selectors named in `site`.
    pub fn from_site(site: &SiteConfig) -> Result<Self, ScrapeError> {
        Ok(Self {
            listing: compile("listing", &site.listing_selector)?,
            heading: compile("heading", &site.heading_selector)?,
            anchor: compile("anchor", &site.anchor_selector)?,
            price: compile("price", &site.price_selector)?,
            rating: compile("rating", &site.rating_selector)?,
            review_count: compile("review_count", &site.review_count_selector)?,
        })
    }
}

fn compile(field: &'static str, selector: &str) -> Result<Selector, ScrapeError> {
    Selector::parse(selector).map_err(|e| ScrapeError::Selector {
        field,
        selector: selector.to_string(),
        message: e.to_string(),
    })
}

/// Listings pulled from one page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageExtraction {
    /// Extracted records in document order.
    pub records: Vec<ListingRecord>,
    /// Listing containers matched on the page.
    pub listings: usize,
    /// Containers rejected for missing required fields.
    pub skipped: usize,
}

/// Parse a whole page and extract every listing container on it.
pub fn extract_page(html: &str, selectors: &ListingSelectors, origin: &str) -> PageExtraction {
    let document = Html::parse_document(html);
    let mut page = PageExtraction::default();

    for (index, node) in document.select(&selectors.listing).enumerate() {
        page.listings += 1;
        match extract_record(node, selectors, origin) {
            Ok(record) => page.records.push(record),
            Err(e) => {
                debug!("Skipping listing {}: {}", index, e);
                page.skipped += 1;
            }
        }
    }

    page
}

/// Map one listing container to a record.
pub fn extract_record(
    node: ElementRef<'_>,
    selectors: &ListingSelectors,
    origin: &str,
) -> Result<ListingRecord, ExtractError> {
    let (description, product_url) = heading_link(node, selectors, origin)?;

    Ok(ListingRecord::new(
        description,
        product_url,
        optional_text(node, &selectors.price),
        optional_text(node, &selectors.rating),
        optional_text(node, &selectors.review_count),
    ))
}

/// Description and absolute URL from the first heading's first link.
fn heading_link(
    node: ElementRef<'_>,
    selectors: &ListingSelectors,
    origin: &str,
) -> Result<(String, String), ExtractError> {
    let heading = node
        .select(&selectors.heading)
        .next()
        .ok_or(ExtractError::MissingHeading)?;

    let anchor = heading
        .select(&selectors.anchor)
        .next()
        .ok_or(ExtractError::MissingAnchor)?;

    let href = anchor
        .value()
        .attr("href")
        .map(str::trim)
        .filter(|href| !href.is_empty())
        .ok_or(ExtractError::MissingHref)?;

    let description = element_text(anchor).trim().to_string();
    if description.is_empty() {
        return Err(ExtractError::EmptyDescription);
    }

    Ok((description, resolve_url(origin, href)))
}

/// Text of the first match, untrimmed.
fn optional_text(node: ElementRef<'_>, selector: &Selector) -> Option<String> {
    node.select(selector).next().map(element_text)
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect()
}
