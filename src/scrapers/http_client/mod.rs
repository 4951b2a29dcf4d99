//! Plain HTTP page fetcher for pages that need no client-side rendering.

mod user_agent;

pub use user_agent::{resolve_user_agent, USER_AGENT};

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::PageFetcher;
use crate::error::FetchError;

/// HTTP fetcher configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpConfig {
    /// User agent string. The crate's own is used when unset; search sites
    /// commonly reject it, so callers are expected to set one.
    #[serde(default)]
    pub user_agent: Option<String>,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Proxy URL applied to all requests.
    #[serde(default)]
    pub proxy: Option<String>,
}

fn default_timeout() -> u64 {
    30
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: None,
            timeout: default_timeout(),
            proxy: None,
        }
    }
}

/// Fetches pages with a single GET each.
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Create a new HTTP fetcher.
    pub fn new(config: &HttpConfig) -> Result<Self, FetchError> {
        let user_agent = resolve_user_agent(config.user_agent.as_deref());
        let mut builder = Client::builder()
            .user_agent(&user_agent)
            .timeout(Duration::from_secs(config.timeout))
            .gzip(true)
            .brotli(true);

        if let Some(ref proxy) = config.proxy {
            builder = builder.proxy(reqwest::Proxy::all(proxy)?);
        }

        debug!("HTTP fetcher using user agent {:?}", user_agent);
        Ok(Self {
            client: builder.build()?,
        })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&mut self, url: &str) -> Result<String, FetchError> {
        info!("GET {}", url);
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        Ok(response.text().await?)
    }
}
