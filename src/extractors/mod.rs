pub mod boilerplate;
pub mod denylist;
mod dom;
pub mod readability;
pub mod tag_scan;
pub mod text;


use crate::config::ExtractConfig;
use denylist::{NoiseFilter, Thresholds};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use thiserror::Error;

/// Strategy used to separate page content from boilerplate
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionStrategy {
    /// Text of paragraph tags
    TagScan,
    /// Paragraph, heading, div and list text outside denylisted regions
    #[default]
    DenylistFiltered,
    /// Main-content detection followed by flattening
    Readability,
    /// Per-block decision tree over word counts and link density
    BoilerplateClassifier,
}

impl ExtractionStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractionStrategy::TagScan => "tag_scan",
            ExtractionStrategy::DenylistFiltered => "denylist_filtered",
            ExtractionStrategy::Readability => "readability",
            ExtractionStrategy::BoilerplateClassifier => "boilerplate_classifier",
        }
    }
}

impl fmt::Display for ExtractionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised by the extractor
#[derive(Debug, Clone, Error)]
pub enum ExtractError {
    #[error("invalid denylist selector {selector:?}: {message}")]
    InvalidSelector { selector: String, message: String },

    #[error("document nesting depth {depth} exceeds the limit of {limit}")]
    DocumentTooDeep { depth: usize, limit: usize },

    #[error("document of {bytes} bytes exceeds the limit of {limit} bytes")]
    DocumentTooLarge { bytes: usize, limit: usize },

    #[error("internal extraction error: {0}")]
    Internal(String),
}

/// Extracted body text and its word count
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    pub body_text: String,
    pub word_count: usize,
}

impl Extraction {
    /// Wraps text, counting its words
    pub fn from_text(body_text: String) -> Self {
        let word_count = text::count_words(&body_text);
        Self {
            body_text,
            word_count,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.word_count == 0
    }
}

/// Turns raw HTML into body text with the configured strategy
#[derive(Debug)]
pub struct Extractor {
    strategy: ExtractionStrategy,
    noise: NoiseFilter,
    thresholds: Thresholds,
    include_headings: bool,
    limits: readability::Limits,
}

impl Extractor {
    pub fn new(config: &ExtractConfig) -> Result<Self, ExtractError> {
        Ok(Self {
            strategy: config.strategy,
            noise: NoiseFilter::from_denylist(&config.denylist)?,
            thresholds: Thresholds {
                min_tokens: config.min_tokens,
                min_chars: config.min_chars,
            },
            include_headings: config.include_headings,
            limits: readability::Limits {
                max_depth: config.readability_max_depth,
                max_bytes: config.readability_max_bytes,
            },
        })
    }

    /// Extractor for a strategy with default settings
    pub fn with_strategy(strategy: ExtractionStrategy) -> Result<Self, ExtractError> {
        Self::new(&ExtractConfig {
            strategy,
            ..ExtractConfig::default()
        })
    }

    pub fn strategy(&self) -> ExtractionStrategy {
        self.strategy
    }

    /// Extract body text from a document.
    ///
    /// A document with nothing to extract is an empty success, not an error.
    /// The readability strategy refuses documents outside its size and depth
    /// limits. A panic inside a strategy is caught and reported as
    /// [`ExtractError::Internal`].
    pub fn extract(&self, html: &str) -> Result<Extraction, ExtractError> {
        match panic::catch_unwind(AssertUnwindSafe(|| self.run(html))) {
            Ok(result) => result,
            Err(payload) => Err(ExtractError::Internal(panic_message(payload.as_ref()))),
        }
    }

    fn run(&self, html: &str) -> Result<Extraction, ExtractError> {
        let body_text = match self.strategy {
            ExtractionStrategy::TagScan => tag_scan::extract(html, self.include_headings),
            ExtractionStrategy::DenylistFiltered => {
                denylist::extract(html, &self.noise, self.thresholds)
            }
            ExtractionStrategy::Readability => {
                readability::extract(html, &self.noise, self.limits)?
            }
            ExtractionStrategy::BoilerplateClassifier => boilerplate::extract(html),
        };
        Ok(Extraction::from_text(body_text))
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "extraction panicked".to_string()
    }
}
