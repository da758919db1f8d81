use crate::extractors::Extraction;
use crate::filter::InvalidUrl;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of processing one URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageStatus {
    Success,
    Error,
}

impl fmt::Display for PageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageStatus::Success => f.write_str("success"),
            PageStatus::Error => f.write_str("error"),
        }
    }
}

/// Result for a single dispatched URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageResult {
    /// URL as it appeared in the input
    pub url: String,

    pub status: PageStatus,

    /// Whitespace-delimited tokens in `body_text`; always 0 for errors
    pub word_count: usize,

    /// Extracted text (possibly empty)
    pub body_text: String,

    /// Human-readable failure, present exactly when `status` is `Error`
    pub error_message: Option<String>,
}

impl PageResult {
    pub fn success(url: impl Into<String>, extraction: Extraction) -> Self {
        Self {
            url: url.into(),
            status: PageStatus::Success,
            word_count: extraction.word_count,
            body_text: extraction.body_text,
            error_message: None,
        }
    }

    pub fn failure(url: impl Into<String>, message: impl Into<String>) -> Self {
        let mut message = message.into();
        if message.trim().is_empty() {
            message = "unknown error".to_string();
        }
        Self {
            url: url.into(),
            status: PageStatus::Error,
            word_count: 0,
            body_text: String::new(),
            error_message: Some(message),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == PageStatus::Success
    }
}

/// Aggregates over one batch
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchStats {
    /// URLs dispatched to a fetcher
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Input lines rejected before dispatch
    pub invalid: usize,
    /// Sum of word counts over successful pages
    pub total_words: usize,
    /// Mean word count over successful pages
    pub average_words_per_page: f64,
    /// succeeded / attempted
    pub success_ratio: f64,
}

impl BatchStats {
    /// Compute statistics; failures never contribute to word totals or averages
    pub fn from_results(results: &[PageResult], invalid: usize) -> Self {
        let attempted = results.len();
        let (succeeded, total_words) = results
            .iter()
            .filter(|r| r.is_success())
            .fold((0, 0), |(n, words), r| (n + 1, words + r.word_count));

        let average_words_per_page = if succeeded == 0 {
            0.0
        } else {
            total_words as f64 / succeeded as f64
        };
        let success_ratio = if attempted == 0 {
            0.0
        } else {
            succeeded as f64 / attempted as f64
        };

        Self {
            attempted,
            succeeded,
            failed: attempted - succeeded,
            invalid,
            total_words,
            average_words_per_page,
            success_ratio,
        }
    }
}

/// Everything one batch run produced
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    /// One entry per dispatched URL, in input order
    pub results: Vec<PageResult>,
    /// Input lines that were never dispatched
    pub invalid: Vec<InvalidUrl>,
    pub stats: BatchStats,
    /// Wall-clock time of the batch in milliseconds
    pub elapsed_ms: u64,
}

impl BatchReport {
    pub fn new(results: Vec<PageResult>, invalid: Vec<InvalidUrl>, elapsed_ms: u64) -> Self {
        let stats = BatchStats::from_results(&results, invalid.len());
        Self {
            results,
            invalid,
            stats,
            elapsed_ms,
        }
    }
}
