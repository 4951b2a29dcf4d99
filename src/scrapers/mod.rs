//! Search-results scraping: URL building, page fetching, listing extraction,
//! and the page loop that ties them together.

pub mod browser;
pub mod http_client;
pub mod listing;
pub mod pagination;
pub mod search_url;

use async_trait::async_trait;

use crate::error::FetchError;

pub use browser::{BrowserEngineConfig, BrowserFetcher};
pub use http_client::{HttpConfig, HttpFetcher};
pub use listing::{extract_page, extract_record, ListingSelectors, PageExtraction};
pub use pagination::SearchScraper;
pub use search_url::{build_page_template, page_url, resolve_url};

/// Something that turns a URL into the final HTML of the page.
///
/// Implementations own whatever resource does the rendering (a browser
/// process, an HTTP client); `close` releases it and must be safe to call
/// more than once.
#[async_trait]
pub trait PageFetcher: Send {
    /// Fetch `url` and return the rendered document.
    async fn fetch(&mut self, url: &str) -> Result<String, FetchError>;

    /// Release the underlying resource.
    async fn close(&mut self) {}
}

#[async_trait]
impl<F: PageFetcher + ?Sized> PageFetcher for Box<F> {
    async fn fetch(&mut self, url: &str) -> Result<String, FetchError> {
        (**self).fetch(url).await
    }

    async fn close(&mut self) {
        (**self).close().await
    }
}
