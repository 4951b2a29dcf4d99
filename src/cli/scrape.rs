//! The scrape command: run the page loop and write the output file.

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::config::{FetcherKind, ScrapeConfig};
use crate::models::{PageSummary, ScrapeReport};
use crate::output::write_records_to_path;
use crate::scrapers::{BrowserFetcher, HttpFetcher, PageFetcher, SearchScraper};

/// Run every page through `fetcher` and write the output file.
///
/// The file at `config.output` is only touched once all pages succeeded.
pub async fn scrape_to_file<F, P>(
    scraper: &SearchScraper,
    fetcher: F,
    on_page: P,
) -> anyhow::Result<ScrapeReport>
where
    F: PageFetcher,
    P: FnMut(&PageSummary),
{
    let report = scraper.scrape_with_progress(fetcher, on_page).await?;
    let config = scraper.config();
    write_records_to_path(&config.output, &report.records, config.format)?;
    Ok(report)
}

pub async fn cmd_scrape(config: ScrapeConfig, show_progress: bool) -> anyhow::Result<()> {
    let scraper = SearchScraper::new(config)?;
    let config = scraper.config();

    let fetcher: Box<dyn PageFetcher> = match config.fetcher {
        FetcherKind::Browser => Box::new(BrowserFetcher::new(config.browser.clone())),
        FetcherKind::Http => Box::new(HttpFetcher::new(&config.http)?),
    };

    let progress = if show_progress {
        let pb = ProgressBar::new(u64::from(config.page_count));
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        pb.set_message(format!("Searching \"{}\"", config.query));
        pb
    } else {
        ProgressBar::hidden()
    };

    let report = scrape_to_file(&scraper, fetcher, |summary: &PageSummary| {
        progress.inc(1);
        progress.set_message(format!(
            "page {}: {} listings",
            summary.page,
            summary.extracted()
        ));
    })
    .await;
    progress.finish_and_clear();
    let report = report?;

    println!(
        "{} {} records from {} pages ({} skipped) written to {}",
        style("✓").green(),
        report.records.len(),
        report.pages.len(),
        report.skipped(),
        config.output.display()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use async_trait::async_trait;
    use std::path::Path;
    use tempfile::tempdir;

    /// Serves one listing per page until `fail_on`.
    struct FlakySite {
        fail_on: Option<u32>,
    }

    #[async_trait]
    impl PageFetcher for FlakySite {
        async fn fetch(&mut self, url: &str) -> Result<String, FetchError> {
            let page: u32 = url.rsplit('=').next().unwrap().parse().unwrap();
            if self.fail_on == Some(page) {
                return Err(FetchError::Timeout(30));
            }
            Ok(format!(
                r#"<div data-component-type="s-search-result"><h2><a href="/dp/{page}">item {page}</a></h2></div>"#
            ))
        }
    }

    fn scraper(output: &Path, page_count: u32) -> SearchScraper {
        SearchScraper::new(ScrapeConfig {
            page_count,
            output: output.to_path_buf(),
            ..Default::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_writes_file_after_all_pages() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("result.csv");

        let report = scrape_to_file(&scraper(&path, 2), FlakySite { fail_on: None }, |_| {})
            .await
            .unwrap();

        assert_eq!(report.records.len(), 2);
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 3);
    }

    #[tokio::test]
    async fn test_fetch_failure_creates_no_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("result.csv");

        let mut pages = 0;
        let result = scrape_to_file(
            &scraper(&path, 3),
            FlakySite { fail_on: Some(2) },
            |_| pages += 1,
        )
        .await;

        assert!(result.is_err());
        assert_eq!(pages, 1);
        assert!(!path.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_fetch_failure_keeps_previous_output() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("result.csv");
        std::fs::write(&path, "from an earlier run\n").unwrap();

        let result = scrape_to_file(&scraper(&path, 3), FlakySite { fail_on: Some(2) }, |_| {})
            .await;

        assert!(result.is_err());
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "from an earlier run\n"
        );
    }
}
