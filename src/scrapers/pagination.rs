//! Page loop over a search query.

use tracing::info;

use super::listing::{extract_page, ListingSelectors};
use super::search_url::{build_page_template, page_url};
use super::PageFetcher;
use crate::config::ScrapeConfig;
use crate::error::ScrapeError;
use crate::models::{PageSummary, ScrapeReport};

/// Walks pages `1..=page_count` of a search and collects every listing.
///
/// Pages are fetched one at a time, in order. A fetch failure on any page
/// aborts the run and discards what was collected so far; listings missing
/// required fields are dropped silently.
pub struct SearchScraper {
    config: ScrapeConfig,
    selectors: ListingSelectors,
}

impl SearchScraper {
    /// Create a scraper, compiling the configured selectors.
    pub fn new(config: ScrapeConfig) -> Result<Self, ScrapeError> {
        config.validate()?;
        let selectors = ListingSelectors::from_site(&config.site)?;
        Ok(Self { config, selectors })
    }

    pub fn config(&self) -> &ScrapeConfig {
        &self.config
    }

    /// Run the page loop, then close the fetcher whatever the outcome.
    pub async fn scrape<F: PageFetcher>(&self, mut fetcher: F) -> Result<ScrapeReport, ScrapeError> {
        let result = self.run(&mut fetcher).await;
        fetcher.close().await;
        result
    }

    /// Like [`SearchScraper::scrape`], reporting each finished page.
    pub async fn scrape_with_progress<F, P>(
        &self,
        mut fetcher: F,
        on_page: P,
    ) -> Result<ScrapeReport, ScrapeError>
    where
        F: PageFetcher,
        P: FnMut(&PageSummary),
    {
        let result = self.run_with_progress(&mut fetcher, on_page).await;
        fetcher.close().await;
        result
    }

    /// Fetch and extract every page. Leaves the fetcher open.
    pub async fn run<F: PageFetcher + ?Sized>(
        &self,
        fetcher: &mut F,
    ) -> Result<ScrapeReport, ScrapeError> {
        self.run_with_progress(fetcher, |_| {}).await
    }

    pub async fn run_with_progress<F, P>(
        &self,
        fetcher: &mut F,
        mut on_page: P,
    ) -> Result<ScrapeReport, ScrapeError>
    where
        F: PageFetcher + ?Sized,
        P: FnMut(&PageSummary),
    {
        let template = build_page_template(&self.config.site, &self.config.query);
        let mut report = ScrapeReport::default();

        for page in 1..=self.config.page_count {
            let url = page_url(&template, page);

            let html = fetcher
                .fetch(&url)
                .await
                .map_err(|source| ScrapeError::Fetch {
                    page,
                    url: url.clone(),
                    source,
                })?;

            let extraction = extract_page(&html, &self.selectors, &self.config.site.origin);
            let summary = PageSummary {
                page,
                url,
                listings: extraction.listings,
                skipped: extraction.skipped,
            };

            info!(
                "Page {}/{}: {} listings, {} skipped ({})",
                page, self.config.page_count, summary.listings, summary.skipped, summary.url
            );

            report.records.extend(extraction.records);
            on_page(&summary);
            report.pages.push(summary);
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use async_trait::async_trait;

    /// Serves a listing page whose descriptions encode the page number.
    struct FakeSite {
        per_page: usize,
        fail_on: Option<u32>,
        requested: Vec<String>,
        closed: usize,
    }

    impl FakeSite {
        fn new(per_page: usize) -> Self {
            Self {
                per_page,
                fail_on: None,
                requested: Vec::new(),
                closed: 0,
            }
        }
    }

    #[async_trait]
    impl PageFetcher for FakeSite {
        async fn fetch(&mut self, url: &str) -> Result<String, FetchError> {
            self.requested.push(url.to_string());
            let page: u32 = url.rsplit('=').next().unwrap().parse().unwrap();
            if self.fail_on == Some(page) {
                return Err(FetchError::Timeout(30));
            }

            let mut html = String::from("<html><body>");
            for i in 0..self.per_page {
                html.push_str(&format!(
                    r#"<div data-component-type="s-search-result"><h2><a href="/dp/{page}-{i}">item {page}.{i}</a></h2></div>"#
                ));
            }
            html.push_str("</body></html>");
            Ok(html)
        }

        async fn close(&mut self) {
            self.closed += 1;
        }
    }

    fn scraper(pages: u32) -> SearchScraper {
        SearchScraper::new(ScrapeConfig {
            page_count: pages,
            ..Default::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_collects_pages_in_order() {
        let mut site = FakeSite::new(2);
        let report = scraper(3).run(&mut site).await.unwrap();

        let descriptions: Vec<&str> = report.records.iter().map(|r| r.description.as_str()).collect();
        assert_eq!(
            descriptions,
            ["item 1.0", "item 1.1", "item 2.0", "item 2.1", "item 3.0", "item 3.1"]
        );
        assert_eq!(report.pages.len(), 3);
        assert_eq!(
            site.requested,
            [
                "https://www.amazon.in/s?k=iphone+14&ref=nb_sb_noss_1&page=1",
                "https://www.amazon.in/s?k=iphone+14&ref=nb_sb_noss_1&page=2",
                "https://www.amazon.in/s?k=iphone+14&ref=nb_sb_noss_1&page=3",
            ]
        );
        assert_eq!(site.closed, 0);
    }

    #[tokio::test]
    async fn test_fetch_failure_aborts_run() {
        let mut site = FakeSite::new(2);
        site.fail_on = Some(2);

        let err = scraper(4).run(&mut site).await.unwrap_err();
        match err {
            ScrapeError::Fetch { page, url, source } => {
                assert_eq!(page, 2);
                assert!(url.ends_with("&page=2"));
                assert!(matches!(source, FetchError::Timeout(30)));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        // no further pages are requested after the failure
        assert_eq!(site.requested.len(), 2);
    }

    #[tokio::test]
    async fn test_scrape_closes_fetcher_on_every_path() {
        struct Counted<'a>(&'a mut FakeSite);

        #[async_trait]
        impl PageFetcher for Counted<'_> {
            async fn fetch(&mut self, url: &str) -> Result<String, FetchError> {
                self.0.fetch(url).await
            }
            async fn close(&mut self) {
                self.0.close().await
            }
        }

        let mut ok_site = FakeSite::new(1);
        scraper(2).scrape(Counted(&mut ok_site)).await.unwrap();
        assert_eq!(ok_site.closed, 1);

        let mut failing_site = FakeSite::new(1);
        failing_site.fail_on = Some(1);
        assert!(scraper(2).scrape(Counted(&mut failing_site)).await.is_err());
        assert_eq!(failing_site.closed, 1);
    }

    #[tokio::test]
    async fn test_progress_callback_sees_each_page() {
        let mut seen = Vec::new();
        let mut site = FakeSite::new(3);
        scraper(2)
            .run_with_progress(&mut site, |summary| seen.push((summary.page, summary.extracted())))
            .await
            .unwrap();
        assert_eq!(seen, [(1, 3), (2, 3)]);
    }

    #[tokio::test]
    async fn test_repeated_runs_are_identical() {
        let scraper = scraper(2);
        let first = scraper.run(&mut FakeSite::new(2)).await.unwrap();
        let second = scraper.run(&mut FakeSite::new(2)).await.unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = ScrapeConfig {
            page_count: 0,
            ..Default::default()
        };
        assert!(matches!(
            SearchScraper::new(config),
            Err(ScrapeError::Config(_))
        ));
    }
}
