pub mod browser;
pub mod http;

use crate::config::FetchConfig;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

pub use browser::BrowserFetcher;
pub use http::HttpFetcher;

/// How a page's HTML is obtained
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchMode {
    /// Plain HTTP GET of the server response
    #[default]
    Static,
    /// DOM serialization from a headless browser after scripts have run
    Rendered,
}

/// Terminal failure while fetching a single page
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    #[error("timeout after {secs}s fetching {url}")]
    Timeout { url: String, secs: u64 },

    #[error("network error fetching {url}: {message}")]
    Network { url: String, message: String },

    #[error("HTTP {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("render timeout after {secs}s for {url}")]
    RenderTimeout { url: String, secs: u64 },

    #[error("browser render failed for {url}: {message}")]
    RenderCrash { url: String, message: String },
}

/// Source of raw HTML for a URL
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch a page once. No retries are attempted.
    async fn fetch(&self, url: &Url, mode: FetchMode) -> Result<String, FetchError>;
}

/// Fetcher that routes each request to the HTTP client or the browser by mode
pub struct PageFetcher {
    http: HttpFetcher,
    browser: BrowserFetcher,
}

impl PageFetcher {
    /// Build both backends from the fetch configuration
    pub fn new(config: &FetchConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            http: HttpFetcher::new(config)?,
            browser: BrowserFetcher::new(config),
        })
    }
}

#[async_trait]
impl Fetcher for PageFetcher {
    async fn fetch(&self, url: &Url, mode: FetchMode) -> Result<String, FetchError> {
        match mode {
            FetchMode::Static => self.http.get(url).await,
            FetchMode::Rendered => self.browser.render(url).await,
        }
    }
}
