//! Run configuration.
//!
//! Every literal the scraper depends on (query, page count, output path, site
//! origin, CSS selectors) lives here with a default, so a run can be described
//! entirely by a TOML or JSON file plus CLI overrides.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::output::OutputFormat;
use crate::scrapers::browser::BrowserEngineConfig;
use crate::scrapers::http_client::HttpConfig;

/// Search phrase used when none is given.
pub const DEFAULT_QUERY: &str = "iphone 14";

/// Number of result pages fetched per run.
pub const DEFAULT_PAGE_COUNT: u32 = 20;

/// Output file written at the end of a run.
pub const DEFAULT_OUTPUT: &str = "result.csv";

/// Which page fetcher renders search pages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum FetcherKind {
    /// Headless Chrome over CDP (executes client-side scripts).
    #[default]
    Browser,
    /// Plain HTTP GET, no script execution.
    Http,
}

/// Search site layout: where to search and how listings are marked up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Scheme and host prepended to relative product links.
    #[serde(default = "default_origin")]
    pub origin: String,

    /// Search endpoint. `{origin}` is replaced by `origin`, `{}` by the
    /// joined search terms.
    #[serde(default = "default_search_template")]
    pub search_template: String,

    /// Listing container filter.
    #[serde(default = "default_listing_selector")]
    pub listing_selector: String,

    /// Heading inside a listing; only the first match is used.
    #[serde(default = "default_heading_selector")]
    pub heading_selector: String,

    /// Link inside the heading carrying description text and href.
    #[serde(default = "default_anchor_selector")]
    pub anchor_selector: String,

    #[serde(default = "default_price_selector")]
    pub price_selector: String,

    #[serde(default = "default_rating_selector")]
    pub rating_selector: String,

    /// Review count span. The compound class selector also matches spans
    /// carrying extra classes, unlike an exact `class` attribute match.
    #[serde(default = "default_review_count_selector")]
    pub review_count_selector: String,
}

fn default_origin() -> String {
    "https://www.amazon.in".to_string()
}

fn default_search_template() -> String {
    "{origin}/s?k={}&ref=nb_sb_noss_1".to_string()
}

fn default_listing_selector() -> String {
    r#"div[data-component-type="s-search-result"]"#.to_string()
}

fn default_heading_selector() -> String {
    "h2".to_string()
}

fn default_anchor_selector() -> String {
    "a".to_string()
}

fn default_price_selector() -> String {
    "span.a-offscreen".to_string()
}

fn default_rating_selector() -> String {
    "span.a-icon-alt".to_string()
}

fn default_review_count_selector() -> String {
    "span.a-size-base.s-underline-text".to_string()
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            origin: default_origin(),
            search_template: default_search_template(),
            listing_selector: default_listing_selector(),
            heading_selector: default_heading_selector(),
            anchor_selector: default_anchor_selector(),
            price_selector: default_price_selector(),
            rating_selector: default_rating_selector(),
            review_count_selector: default_review_count_selector(),
        }
    }
}

/// Complete description of one scrape run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeConfig {
    #[serde(default = "default_query")]
    pub query: String,

    /// Pages `1..=page_count` are fetched in order.
    #[serde(default = "default_page_count")]
    pub page_count: u32,

    #[serde(default = "default_output")]
    pub output: PathBuf,

    #[serde(default)]
    pub format: OutputFormat,

    #[serde(default)]
    pub fetcher: FetcherKind,

    #[serde(default)]
    pub site: SiteConfig,

    #[serde(default)]
    pub browser: BrowserEngineConfig,

    #[serde(default)]
    pub http: HttpConfig,
}

fn default_query() -> String {
    DEFAULT_QUERY.to_string()
}

fn default_page_count() -> u32 {
    DEFAULT_PAGE_COUNT
}

fn default_output() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT)
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            query: default_query(),
            page_count: default_page_count(),
            output: default_output(),
            format: OutputFormat::default(),
            fetcher: FetcherKind::default(),
            site: SiteConfig::default(),
            browser: BrowserEngineConfig::default(),
            http: HttpConfig::default(),
        }
    }
}

impl ScrapeConfig {
    /// Load configuration from a file. The format follows the extension:
    /// `.toml` is TOML, anything else is parsed as JSON.
    pub async fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = tokio::fs::read_to_string(path).await?;
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

        let config: ScrapeConfig = match ext {
            "toml" => toml::from_str(&contents).map_err(|e| ConfigError::Parse {
                format: "TOML",
                message: e.to_string(),
            })?,
            _ => serde_json::from_str(&contents).map_err(|e| ConfigError::Parse {
                format: "JSON",
                message: e.to_string(),
            })?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Reject configurations that cannot describe a run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.page_count == 0 {
            return Err(ConfigError::Invalid(
                "page_count must be at least 1".to_string(),
            ));
        }

        if self.site.origin.trim().is_empty() {
            return Err(ConfigError::Invalid("site.origin is empty".to_string()));
        }

        let template = self.site.search_template.replace("{origin}", &self.site.origin);
        let placeholders = template.matches("{}").count();
        if placeholders != 1 {
            return Err(ConfigError::Invalid(format!(
                "site.search_template must contain exactly one {{}} for the query, found {}",
                placeholders
            )));
        }

        Ok(())
    }
}
