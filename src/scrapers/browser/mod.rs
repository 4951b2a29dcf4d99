//! Browser-based fetcher for pages that render client-side.
//!
//! Uses chromiumoxide (CDP) against a locally launched or remote Chrome.
//! One browser is shared by all pages of a run; each page gets its own tab
//! which is closed after the content has been read.

mod config;

pub use config::BrowserEngineConfig;

use async_trait::async_trait;

use super::PageFetcher;
use crate::error::FetchError;

#[cfg(feature = "browser")]
use std::path::PathBuf;
#[cfg(feature = "browser")]
use std::sync::Arc;
#[cfg(feature = "browser")]
use std::time::Duration;

#[cfg(feature = "browser")]
use chromiumoxide::cdp::browser_protocol::network::SetUserAgentOverrideParams;
#[cfg(feature = "browser")]
use chromiumoxide::cdp::browser_protocol::page::NavigateParams;
#[cfg(feature = "browser")]
use chromiumoxide::{Browser, BrowserConfig, Page};
#[cfg(feature = "browser")]
use futures::StreamExt;
#[cfg(feature = "browser")]
use tokio::sync::Mutex;
#[cfg(feature = "browser")]
use tokio::task::JoinHandle;
#[cfg(feature = "browser")]
use tracing::{debug, info, warn};

/// Browser-based page fetcher.
#[cfg(feature = "browser")]
pub struct BrowserFetcher {
    config: BrowserEngineConfig,
    browser: Option<Arc<Mutex<Browser>>>,
    handler: Option<JoinHandle<()>>,
}

#[cfg(feature = "browser")]
fn browser_error(e: impl std::fmt::Display) -> FetchError {
    FetchError::Browser(e.to_string())
}

#[cfg(feature = "browser")]
impl BrowserFetcher {
    /// Common Chrome executable paths to check.
    const CHROME_PATHS: &'static [&'static str] = &[
        // Linux
        "/usr/bin/google-chrome",
        "/usr/bin/google-chrome-stable",
        "/usr/bin/chromium",
        "/usr/bin/chromium-browser",
        "/snap/bin/chromium",
        // macOS
        "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
        "/Applications/Chromium.app/Contents/MacOS/Chromium",
        // Common install locations
        "/opt/google/chrome/google-chrome",
    ];

    /// Create a new browser fetcher. Chrome is started on first fetch.
    pub fn new(config: BrowserEngineConfig) -> Self {
        Self {
            config,
            browser: None,
            handler: None,
        }
    }

    /// Find Chrome executable.
    fn find_chrome(&self) -> Result<PathBuf, FetchError> {
        if let Some(ref path) = self.config.chrome_path {
            if path.exists() {
                return Ok(path.clone());
            }
            return Err(FetchError::Launch(format!(
                "configured Chrome executable not found: {}",
                path.display()
            )));
        }

        for path in Self::CHROME_PATHS {
            let p = std::path::Path::new(path);
            if p.exists() {
                info!("Found Chrome at: {}", path);
                return Ok(p.to_path_buf());
            }
        }

        for cmd in [
            "google-chrome",
            "google-chrome-stable",
            "chromium",
            "chromium-browser",
        ] {
            if let Ok(path) = which::which(cmd) {
                info!("Found Chrome in PATH: {}", path.display());
                return Ok(path);
            }
        }

        Err(FetchError::Launch(
            "Chrome/Chromium not found. Please install it:\n\
             - Arch/Manjaro: sudo pacman -S chromium\n\
             - Ubuntu/Debian: sudo apt install chromium-browser\n\
             - Fedora: sudo dnf install chromium\n\
             - Or download from: https://www.google.com/chrome/"
                .to_string(),
        ))
    }

    /// Launch or connect to browser if not already running.
    pub async fn ensure_browser(&mut self) -> Result<(), FetchError> {
        if self.browser.is_some() {
            return Ok(());
        }

        if let Some(remote_url) = self.config.remote_url.clone() {
            return self.connect_remote(&remote_url).await;
        }

        info!("Launching browser (headless={})", self.config.headless);

        let chrome_path = self.find_chrome()?;
        let mut builder = BrowserConfig::builder()
            .chrome_executable(chrome_path)
            .request_timeout(Duration::from_secs(self.config.timeout));

        // with_head means NOT headless
        if !self.config.headless {
            builder = builder.with_head();
        }

        for arg in self.config.launch_args() {
            builder = builder.arg(arg);
        }

        let config = builder.build().map_err(FetchError::Launch)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| FetchError::Launch(e.to_string()))?;

        self.handler = Some(tokio::spawn(async move {
            while let Some(h) = handler.next().await {
                if h.is_err() {
                    break;
                }
            }
        }));
        self.browser = Some(Arc::new(Mutex::new(browser)));

        Ok(())
    }

    /// Connect to a remote Chrome instance.
    async fn connect_remote(&mut self, url: &str) -> Result<(), FetchError> {
        info!(
            "Connecting to remote browser at {} (timeout: {}s)",
            url, self.config.timeout
        );

        // Get WebSocket URL from the /json/version endpoint
        let http_url = url
            .replace("ws://", "http://")
            .replace("wss://", "https://");
        let version_url = format!("{}/json/version", http_url.trim_end_matches('/'));

        let resp: serde_json::Value = reqwest::Client::new()
            .get(&version_url)
            .timeout(Duration::from_secs(self.config.timeout))
            .send()
            .await?
            .json()
            .await?;

        let ws_url = resp
            .get("webSocketDebuggerUrl")
            .and_then(|v| v.as_str())
            .ok_or_else(|| FetchError::Launch("No webSocketDebuggerUrl in response".to_string()))?;

        info!("Connecting to WebSocket: {}", ws_url);

        let handler_config = chromiumoxide::handler::HandlerConfig {
            request_timeout: Duration::from_secs(self.config.timeout),
            ..Default::default()
        };

        let (browser, mut handler) = Browser::connect_with_config(ws_url, handler_config)
            .await
            .map_err(|e| FetchError::Launch(e.to_string()))?;

        self.handler = Some(tokio::spawn(async move {
            while let Some(h) = handler.next().await {
                if h.is_err() {
                    break;
                }
            }
        }));
        self.browser = Some(Arc::new(Mutex::new(browser)));

        Ok(())
    }

    /// Navigate a fresh tab to `url` and return the rendered HTML.
    async fn render(&self, page: &Page, url: &str) -> Result<String, FetchError> {
        if let Some(ref user_agent) = self.config.user_agent {
            page.execute(SetUserAgentOverrideParams::new(user_agent.clone()))
                .await
                .map_err(browser_error)?;
        }

        info!("Navigating to {}", url);
        let nav_params = NavigateParams::builder()
            .url(url)
            .build()
            .map_err(|e| FetchError::Browser(format!("Invalid URL: {}", e)))?;

        let timeout = Duration::from_secs(self.config.timeout);
        tokio::time::timeout(timeout, page.execute(nav_params))
            .await
            .map_err(|_| FetchError::Timeout(self.config.timeout))?
            .map_err(browser_error)?;

        // Wait for the document itself rather than a fixed delay
        let wait_for_ready_script = r#"
            new Promise((resolve) => {
                if (document.readyState === 'complete') {
                    resolve(document.readyState);
                } else {
                    window.addEventListener('load', () => resolve(document.readyState));
                    setTimeout(() => resolve('timeout'), 10000);
                }
            })
        "#;

        match tokio::time::timeout(timeout, page.evaluate(wait_for_ready_script.to_string())).await
        {
            Ok(Ok(result)) => {
                let state: String = result
                    .into_value()
                    .unwrap_or_else(|_| "unknown".to_string());
                debug!("Page ready state: {}", state);
            }
            Ok(Err(e)) => debug!("Could not check ready state: {}", e),
            Err(_) => warn!("Timeout waiting for page ready state"),
        }

        if let Some(ref selector) = self.config.wait_for_selector {
            debug!("Waiting for selector: {}", selector);
            match tokio::time::timeout(timeout, page.find_element(selector.as_str())).await {
                Ok(Ok(_)) => debug!("Selector found"),
                Ok(Err(e)) => warn!("Selector not found: {}", e),
                Err(_) => warn!("Timeout waiting for selector"),
            }
        }

        page.content().await.map_err(browser_error)
    }

    /// Shut down the browser. Safe to call more than once.
    pub async fn shutdown(&mut self) {
        if let Some(browser) = self.browser.take() {
            let mut browser = browser.lock().await;
            // A remote browser belongs to someone else; only drop the connection.
            if self.config.remote_url.is_none() {
                if let Err(e) = browser.close().await {
                    warn!("Failed to close browser: {}", e);
                }
                if let Err(e) = browser.wait().await {
                    warn!("Failed to wait for browser exit: {}", e);
                }
            }
            info!("Browser closed");
        }

        if let Some(handler) = self.handler.take() {
            handler.abort();
        }
    }
}

#[cfg(feature = "browser")]
impl Drop for BrowserFetcher {
    fn drop(&mut self) {
        // Dropping the Browser kills a launched child process.
        if let Some(handler) = self.handler.take() {
            handler.abort();
        }
    }
}

#[cfg(feature = "browser")]
#[async_trait]
impl PageFetcher for BrowserFetcher {
    async fn fetch(&mut self, url: &str) -> Result<String, FetchError> {
        self.ensure_browser().await?;

        let browser = self
            .browser
            .clone()
            .ok_or_else(|| FetchError::Browser("browser is not running".to_string()))?;
        let page = browser
            .lock()
            .await
            .new_page("about:blank")
            .await
            .map_err(browser_error)?;

        let result = self.render(&page, url).await;

        // Close the page to prevent tab accumulation
        if let Err(e) = page.close().await {
            debug!("Failed to close tab: {}", e);
        }

        result
    }

    async fn close(&mut self) {
        self.shutdown().await;
    }
}

// Stub for when browser feature is disabled
#[cfg(not(feature = "browser"))]
pub struct BrowserFetcher {
    #[allow(dead_code)]
    config: BrowserEngineConfig,
}

#[cfg(not(feature = "browser"))]
impl BrowserFetcher {
    pub fn new(config: BrowserEngineConfig) -> Self {
        Self { config }
    }
}

#[cfg(not(feature = "browser"))]
#[async_trait]
impl PageFetcher for BrowserFetcher {
    async fn fetch(&mut self, _url: &str) -> Result<String, FetchError> {
        Err(FetchError::Unavailable)
    }
}
