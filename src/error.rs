//! Error types for scraping, fetching, and configuration.

use thiserror::Error;

/// A listing node is missing one of its required fields.
///
/// Recovered per listing: the driver skips the node and keeps going.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("listing has no heading element")]
    MissingHeading,

    #[error("listing heading has no anchor")]
    MissingAnchor,

    #[error("listing anchor has no href")]
    MissingHref,

    #[error("listing anchor has no visible text")]
    EmptyDescription,
}

/// Failure to obtain a rendered page. Fatal to the whole run.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to launch browser: {0}")]
    Launch(String),

    #[error("browser error: {0}")]
    Browser(String),

    #[error("timed out after {0}s waiting for page")]
    Timeout(u64),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server returned HTTP {status} for {url}")]
    Status { status: u16, url: String },

    #[error("browser support not compiled. Rebuild with: cargo build --features browser")]
    Unavailable,
}

/// Errors that abort a scrape run.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("invalid {field} selector {selector:?}: {message}")]
    Selector {
        field: &'static str,
        selector: String,
        message: String,
    },

    #[error("failed to fetch page {page} ({url}): {source}")]
    Fetch {
        page: u32,
        url: String,
        #[source]
        source: FetchError,
    },

    #[error("failed to write output: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to write output: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Errors loading or validating a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("failed to parse {format} config: {message}")]
    Parse {
        format: &'static str,
        message: String,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}
