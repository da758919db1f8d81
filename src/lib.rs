pub mod batch;
pub mod config;
pub mod extractors;
pub mod fetchers;
pub mod filter;
pub mod output;
pub mod results;
pub mod utils;

// Re-export commonly used types for convenience
pub use batch::BatchProcessor;
pub use config::HarvestConfig;
pub use extractors::{ExtractionStrategy, Extractor};
pub use fetchers::{FetchMode, Fetcher};
pub use results::{BatchReport, PageResult, PageStatus};

use fetchers::PageFetcher;
use filter::UrlFilter;
use std::sync::Arc;

/// Main builder for a batch extraction run
#[derive(Debug, Clone, Default)]
pub struct Harvest {
    config: HarvestConfig,
}

impl Harvest {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole configuration
    pub fn with_config(mut self, config: HarvestConfig) -> Self {
        self.config = config;
        self
    }

    /// Load configuration from a file
    pub fn with_config_file(
        self,
        path: impl AsRef<std::path::Path>,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let config = HarvestConfig::from_file(path)?;
        Ok(self.with_config(config))
    }

    /// Load configuration from a string
    pub fn with_config_str(self, config_str: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let config = HarvestConfig::from_json(config_str)?;
        Ok(self.with_config(config))
    }

    /// Set the maximum number of pages processed at once
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.config.max_concurrency = max_concurrency;
        self
    }

    /// Set how pages are fetched
    pub fn with_mode(mut self, mode: FetchMode) -> Self {
        self.config.mode = mode;
        self
    }

    /// Set the extraction strategy
    pub fn with_strategy(mut self, strategy: ExtractionStrategy) -> Self {
        self.config.extract.strategy = strategy;
        self
    }

    pub fn config(&self) -> &HarvestConfig {
        &self.config
    }

    /// Build a processor with the real HTTP and WebDriver fetchers.
    ///
    /// The `WEBDRIVER_URL` environment variable overrides the configured endpoint.
    pub fn build(mut self) -> Result<BatchProcessor, Box<dyn std::error::Error>> {
        self.config.apply_env();
        let fetcher = PageFetcher::new(&self.config.fetch)?;
        self.build_with_fetcher(Arc::new(fetcher))
    }

    /// Build a processor around any fetcher
    pub fn build_with_fetcher(
        self,
        fetcher: Arc<dyn Fetcher>,
    ) -> Result<BatchProcessor, Box<dyn std::error::Error>> {
        let extractor = Extractor::new(&self.config.extract)?;
        let filter = UrlFilter::new(self.config.filter.clone())?;

        Ok(BatchProcessor::new(
            fetcher,
            extractor,
            filter,
            self.config.mode,
            self.config.max_concurrency,
        ))
    }

    /// Build a processor and run one batch
    pub async fn run(self, urls: &[String]) -> Result<BatchReport, Box<dyn std::error::Error>> {
        let processor = self.build()?;
        Ok(processor.process(urls).await)
    }
}
