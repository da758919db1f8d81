use crate::extractors::ExtractionStrategy;
use crate::extractors::denylist::Denylist;
use crate::extractors::readability::Limits;
use crate::fetchers::FetchMode;
use crate::filter::UrlFilterConfig;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use thiserror::Error;

/// Errors raised while loading a configuration file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Configuration for page fetching
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// User-Agent header sent with static requests and to the headless browser
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Timeout for a static HTTP request, in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Timeout for WebDriver session setup and navigation, in seconds
    #[serde(default = "default_navigation_timeout_secs")]
    pub navigation_timeout_secs: u64,

    /// Time to let deferred scripts run after navigation, in milliseconds
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,

    /// URL for the WebDriver instance
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,

    /// Ask the browser to run without a window
    #[serde(default = "default_headless")]
    pub headless: bool,
}

/// Configuration for content extraction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractConfig {
    /// Which extraction strategy to run on every page
    #[serde(default)]
    pub strategy: ExtractionStrategy,

    /// Tags and selectors that never count as content
    #[serde(default)]
    pub denylist: Denylist,

    /// Minimum tokens for a fragment to survive denylist filtering
    #[serde(default = "default_min_tokens")]
    pub min_tokens: usize,

    /// Minimum characters for a fragment to survive denylist filtering
    #[serde(default = "default_min_chars")]
    pub min_chars: usize,

    /// Also collect headings and list items in tag-scan mode
    #[serde(default)]
    pub include_headings: bool,

    /// Deepest element nesting the readability strategy will attempt
    #[serde(default = "default_readability_max_depth")]
    pub readability_max_depth: usize,

    /// Largest document, in bytes, the readability strategy will attempt
    #[serde(default = "default_readability_max_bytes")]
    pub readability_max_bytes: usize,
}

/// Top-level configuration for a batch run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarvestConfig {
    /// Maximum number of pages processed at once
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// How pages are fetched
    #[serde(default)]
    pub mode: FetchMode,

    #[serde(default)]
    pub fetch: FetchConfig,

    #[serde(default)]
    pub extract: ExtractConfig,

    #[serde(default)]
    pub filter: UrlFilterConfig,
}

impl HarvestConfig {
    /// Load configuration from a file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        Self::from_json(&contents)
    }

    /// Load configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Apply overrides from the environment.
    ///
    /// `WEBDRIVER_URL` replaces the configured WebDriver endpoint when set and non-empty.
    pub fn apply_env(&mut self) {
        if let Ok(webdriver_url) = std::env::var("WEBDRIVER_URL") {
            if !webdriver_url.is_empty() {
                self.fetch.webdriver_url = webdriver_url;
            }
        }
    }
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            max_concurrency: default_max_concurrency(),
            mode: FetchMode::default(),
            fetch: FetchConfig::default(),
            extract: ExtractConfig::default(),
            filter: UrlFilterConfig::default(),
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            request_timeout_secs: default_request_timeout_secs(),
            navigation_timeout_secs: default_navigation_timeout_secs(),
            settle_delay_ms: default_settle_delay_ms(),
            webdriver_url: default_webdriver_url(),
            headless: default_headless(),
        }
    }
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            strategy: ExtractionStrategy::default(),
            denylist: Denylist::default(),
            min_tokens: default_min_tokens(),
            min_chars: default_min_chars(),
            include_headings: false,
            readability_max_depth: default_readability_max_depth(),
            readability_max_bytes: default_readability_max_bytes(),
        }
    }
}

/// Default value for max_concurrency
fn default_max_concurrency() -> usize {
    5
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/124.0.0.0 Safari/537.36"
        .to_string()
}

fn default_request_timeout_secs() -> u64 {
    15
}

fn default_navigation_timeout_secs() -> u64 {
    30
}

fn default_settle_delay_ms() -> u64 {
    2000
}

/// Default value for webdriver_url
fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}

fn default_headless() -> bool {
    true
}

fn default_min_tokens() -> usize {
    5
}

fn default_min_chars() -> usize {
    30
}

fn default_readability_max_depth() -> usize {
    Limits::default().max_depth
}

fn default_readability_max_bytes() -> usize {
    Limits::default().max_bytes
}
