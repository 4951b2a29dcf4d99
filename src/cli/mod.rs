//! Command-line interface.

mod scrape;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use crate::config::{FetcherKind, ScrapeConfig};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "listing-scrape")]
#[command(about = "Scrape product listings from search results into a CSV file")]
#[command(version)]
pub struct Cli {
    /// Search phrase (default: "iphone 14")
    query: Option<String>,

    /// Number of result pages to fetch (default: 20)
    #[arg(short, long)]
    pages: Option<u32>,

    /// Output file (default: result.csv)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Config file (TOML or JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// How pages are fetched
    #[arg(long, value_enum)]
    fetcher: Option<FetcherKind>,

    /// Remote Chrome DevTools URL to connect to instead of launching Chrome
    #[arg(long, env = "BROWSER_URL")]
    remote_url: Option<String>,

    /// Proxy server URL
    #[arg(long)]
    proxy: Option<String>,

    /// Show the browser window
    #[arg(long)]
    headful: bool,

    /// Page load timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// CSS selector to wait for before reading a page
    #[arg(long)]
    wait_for: Option<String>,

    /// User agent override
    #[arg(long)]
    user_agent: Option<String>,

    /// Disable the progress bar
    #[arg(long)]
    no_progress: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

impl Cli {
    /// Overlay command-line flags on a loaded configuration.
    fn apply(&self, config: &mut ScrapeConfig) {
        if let Some(ref query) = self.query {
            config.query = query.clone();
        }
        if let Some(pages) = self.pages {
            config.page_count = pages;
        }
        if let Some(ref output) = self.output {
            config.output = output.clone();
        }
        if let Some(format) = self.format {
            config.format = format;
        }
        if let Some(fetcher) = self.fetcher {
            config.fetcher = fetcher;
        }
        if let Some(ref url) = self.remote_url {
            config.browser.remote_url = Some(url.clone());
        }
        if let Some(ref proxy) = self.proxy {
            config.browser.proxy = Some(proxy.clone());
            config.http.proxy = Some(proxy.clone());
        }
        if self.headful {
            config.browser.headless = false;
        }
        if let Some(timeout) = self.timeout {
            config.browser.timeout = timeout;
            config.http.timeout = timeout;
        }
        if let Some(ref selector) = self.wait_for {
            config.browser.wait_for_selector = Some(selector.clone());
        }
        if let Some(ref user_agent) = self.user_agent {
            config.browser.user_agent = Some(user_agent.clone());
            config.http.user_agent = Some(user_agent.clone());
        }
    }
}

/// Run the CLI.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match cli.config {
        Some(ref path) => ScrapeConfig::load_from_path(path)
            .await
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => ScrapeConfig::default(),
    };
    cli.apply(&mut config);

    scrape::cmd_scrape(config, !cli.no_progress).await
}
