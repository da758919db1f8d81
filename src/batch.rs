use crate::extractors::Extractor;
use crate::fetchers::{FetchMode, Fetcher};
use crate::filter::UrlFilter;
use crate::results::{BatchReport, PageResult};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use url::Url;

/// Runs fetch-then-extract for a list of URLs over a bounded pool of workers.
///
/// Each URL is handled by its own task holding one permit of a semaphore
/// sized to `max_concurrency`. Tasks share no mutable state: each one
/// returns its `PageResult` through its join handle and the batch is
/// assembled only after every handle has been joined.
pub struct BatchProcessor {
    fetcher: Arc<dyn Fetcher>,
    extractor: Arc<Extractor>,
    filter: UrlFilter,
    mode: FetchMode,
    max_concurrency: usize,
}

impl BatchProcessor {
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        extractor: Extractor,
        filter: UrlFilter,
        mode: FetchMode,
        max_concurrency: usize,
    ) -> Self {
        Self {
            fetcher,
            extractor: Arc::new(extractor),
            filter,
            mode,
            max_concurrency: max_concurrency.max(1),
        }
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    pub fn mode(&self) -> FetchMode {
        self.mode
    }

    /// Process a batch of URLs.
    ///
    /// Invalid lines are reported in `BatchReport::invalid` and never fetched.
    /// Every valid line yields exactly one `PageResult`, in input order; a
    /// failing URL never affects its siblings.
    pub async fn process(&self, urls: &[String]) -> BatchReport {
        let started = Instant::now();
        let (valid, invalid) = self.filter.partition(urls);

        ::log::info!(
            "Processing {} URLs ({} invalid) with {} workers in {:?} mode using {}",
            valid.len(),
            invalid.len(),
            self.max_concurrency,
            self.mode,
            self.extractor.strategy()
        );

        let semaphore = Arc::new(Semaphore::new(self.max_concurrency));
        let mut handles = Vec::with_capacity(valid.len());

        for (worker_id, (raw, url)) in valid.into_iter().enumerate() {
            let semaphore = Arc::clone(&semaphore);
            let fetcher = Arc::clone(&self.fetcher);
            let extractor = Arc::clone(&self.extractor);
            let mode = self.mode;
            let task_url = raw.clone();

            let handle = tokio::spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => return PageResult::failure(task_url, "worker pool closed"),
                };
                ::log::trace!("Worker {} acquired permit for: {}", worker_id, task_url);
                process_url(worker_id, fetcher, extractor, task_url, url, mode).await
            });
            handles.push((raw, handle));
        }

        let mut results = Vec::with_capacity(handles.len());
        for (raw, handle) in handles {
            match handle.await {
                Ok(result) => results.push(result),
                Err(e) => {
                    ::log::error!("Worker for {} did not complete: {}", raw, e);
                    results.push(PageResult::failure(raw, format!("worker task failed: {e}")));
                }
            }
        }

        let report = BatchReport::new(results, invalid, started.elapsed().as_millis() as u64);
        ::log::info!(
            "Batch complete - {} of {} pages succeeded, {} words in {:.2} seconds",
            report.stats.succeeded,
            report.stats.attempted,
            report.stats.total_words,
            report.elapsed_ms as f64 / 1000.0
        );
        report
    }
}

/// Fetches and extracts a single URL, converting every failure into an error result
async fn process_url(
    worker_id: usize,
    fetcher: Arc<dyn Fetcher>,
    extractor: Arc<Extractor>,
    raw: String,
    url: Url,
    mode: FetchMode,
) -> PageResult {
    let worker_start = Instant::now();

    let html = match fetcher.fetch(&url, mode).await {
        Ok(html) => html,
        Err(e) => {
            ::log::error!("Worker {} failed to fetch {}: {}", worker_id, raw, e);
            return PageResult::failure(raw, e.to_string());
        }
    };

    // Parsing is CPU-bound; keep it off the async workers
    let extracted = tokio::task::spawn_blocking(move || extractor.extract(&html)).await;

    let result = match extracted {
        Ok(Ok(extraction)) => {
            if extraction.is_empty() {
                ::log::warn!("Worker {} extracted no content from {}", worker_id, raw);
            }
            PageResult::success(raw, extraction)
        }
        Ok(Err(e)) => {
            ::log::error!("Worker {} failed to extract {}: {}", worker_id, raw, e);
            PageResult::failure(raw, e.to_string())
        }
        Err(e) => PageResult::failure(raw, format!("extraction task failed: {e}")),
    };

    ::log::debug!(
        "Worker {} processed {} ({} words) in {:.2} seconds",
        worker_id,
        result.url,
        result.word_count,
        worker_start.elapsed().as_secs_f64()
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::ExtractionStrategy;
    use crate::fetchers::FetchError;
    use crate::results::PageStatus;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    const STORE_HTML: &str = "<nav>Home</nav><p>Welcome to our store. Browse our collection today.</p><footer>© 2024</footer>";

    enum Script {
        Page(&'static str),
        Fail(FetchError),
    }

    /// Fetcher double that replays scripted outcomes after a delay
    struct ScriptedFetcher {
        scripts: HashMap<String, (Duration, Script)>,
        calls: Mutex<Vec<String>>,
        in_flight: AtomicUsize,
        peak_in_flight: AtomicUsize,
    }

    impl ScriptedFetcher {
        fn new() -> Self {
            Self {
                scripts: HashMap::new(),
                calls: Mutex::new(Vec::new()),
                in_flight: AtomicUsize::new(0),
                peak_in_flight: AtomicUsize::new(0),
            }
        }

        fn page(mut self, url: &str, delay_ms: u64, html: &'static str) -> Self {
            self.scripts
                .insert(url.to_string(), (Duration::from_millis(delay_ms), Script::Page(html)));
            self
        }

        fn fail(mut self, url: &str, delay_ms: u64, error: FetchError) -> Self {
            self.scripts
                .insert(url.to_string(), (Duration::from_millis(delay_ms), Script::Fail(error)));
            self
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Fetcher for ScriptedFetcher {
        async fn fetch(&self, url: &Url, _mode: FetchMode) -> Result<String, FetchError> {
            self.calls.lock().unwrap().push(url.to_string());
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak_in_flight.fetch_max(now, Ordering::SeqCst);

            let outcome = match self.scripts.get(url.as_str()) {
                Some((delay, script)) => {
                    tokio::time::sleep(*delay).await;
                    match script {
                        Script::Page(html) => Ok(html.to_string()),
                        Script::Fail(error) => Err(error.clone()),
                    }
                }
                None => Err(FetchError::HttpStatus {
                    url: url.to_string(),
                    status: 404,
                }),
            };

            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            outcome
        }
    }

    fn processor(fetcher: Arc<ScriptedFetcher>, max_concurrency: usize) -> BatchProcessor {
        BatchProcessor::new(
            fetcher,
            Extractor::with_strategy(ExtractionStrategy::DenylistFiltered).unwrap(),
            UrlFilter::default(),
            FetchMode::Static,
            max_concurrency,
        )
    }

    fn urls(list: &[&str]) -> Vec<String> {
        list.iter().map(|u| u.to_string()).collect()
    }

    #[tokio::test]
    async fn test_every_url_yields_one_result() {
        let fetcher = Arc::new(
            ScriptedFetcher::new()
                .page("https://a.example/", 30, STORE_HTML)
                .page("https://b.example/", 5, "<p></p>")
                .fail(
                    "https://c.example/",
                    10,
                    FetchError::Network {
                        url: "https://c.example/".to_string(),
                        message: "connection reset".to_string(),
                    },
                ),
        );
        let input = urls(&[
            "https://a.example/",
            "https://b.example/",
            "https://c.example/",
            "https://d.example/",
        ]);

        let report = processor(fetcher, 2).process(&input).await;

        assert_eq!(report.results.len(), input.len());
        let order: Vec<&str> = report.results.iter().map(|r| r.url.as_str()).collect();
        assert_eq!(order, input.iter().map(String::as_str).collect::<Vec<_>>());

        assert_eq!(report.results[0].status, PageStatus::Success);
        assert_eq!(
            report.results[0].body_text,
            "Welcome to our store. Browse our collection today."
        );
        assert_eq!(report.results[0].word_count, 8);

        // Empty content is a success with zero words
        assert_eq!(report.results[1].status, PageStatus::Success);
        assert_eq!(report.results[1].word_count, 0);

        assert_eq!(report.results[2].status, PageStatus::Error);
        assert!(report.results[2].error_message.as_deref().unwrap().contains("connection reset"));
        assert_eq!(
            report.results[3].error_message.as_deref(),
            Some("HTTP 404 for https://d.example/")
        );

        assert_eq!(report.stats.attempted, 4);
        assert_eq!(report.stats.succeeded, 2);
        assert_eq!(report.stats.total_words, 8);
        assert!((report.stats.average_words_per_page - 4.0).abs() < f64::EPSILON);
        assert!((report.stats.success_ratio - 0.5).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_invalid_urls_are_never_fetched() {
        let fetcher = Arc::new(ScriptedFetcher::new().page("https://a.example/", 0, STORE_HTML));
        let input = urls(&["not a url", "https://a.example/", "ftp://files.example/"]);

        let report = processor(Arc::clone(&fetcher), 5).process(&input).await;

        assert_eq!(fetcher.calls(), vec!["https://a.example/".to_string()]);
        assert_eq!(report.results.len(), 1);
        assert_eq!(report.invalid.len(), 2);
        assert_eq!(report.invalid[0].url, "not a url");
        assert_eq!(report.invalid[1].url, "ftp://files.example/");
        assert_eq!(report.stats.invalid, 2);
        assert_eq!(report.stats.attempted, 1);
    }

    #[tokio::test]
    async fn test_timeout_is_isolated() {
        let fetcher = Arc::new(
            ScriptedFetcher::new()
                .page("https://a.example/", 10, STORE_HTML)
                .fail(
                    "https://slow.example/",
                    20,
                    FetchError::Timeout {
                        url: "https://slow.example/".to_string(),
                        secs: 15,
                    },
                )
                .page("https://c.example/", 10, STORE_HTML),
        );
        let input = urls(&["https://a.example/", "https://slow.example/", "https://c.example/"]);

        let report = processor(fetcher, 5).process(&input).await;

        let timed_out = &report.results[1];
        assert_eq!(timed_out.status, PageStatus::Error);
        assert_eq!(timed_out.word_count, 0);
        assert!(timed_out.error_message.as_deref().unwrap().contains("timeout"));

        assert!(report.results[0].is_success());
        assert!(report.results[2].is_success());
        assert_eq!(report.results[2].word_count, 8);
    }

    #[tokio::test]
    async fn test_pool_runs_fetches_concurrently() {
        let mut fetcher = ScriptedFetcher::new();
        let mut input = Vec::new();
        for i in 0..5 {
            let url = format!("https://shop{i}.example/");
            fetcher = fetcher.page(&url, 300, STORE_HTML);
            input.push(url);
        }
        let fetcher = Arc::new(fetcher);

        let started = Instant::now();
        let report = processor(Arc::clone(&fetcher), 5).process(&input).await;
        let elapsed = started.elapsed();

        assert_eq!(report.stats.succeeded, 5);
        assert_eq!(fetcher.peak_in_flight.load(Ordering::SeqCst), 5);
        // Close to the slowest single fetch, far from the 1.5s sum
        assert!(elapsed < Duration::from_millis(1000), "took {elapsed:?}");
    }

    #[tokio::test]
    async fn test_pool_size_bounds_concurrency() {
        let mut fetcher = ScriptedFetcher::new();
        let mut input = Vec::new();
        for i in 0..6 {
            let url = format!("https://shop{i}.example/");
            fetcher = fetcher.page(&url, 50, STORE_HTML);
            input.push(url);
        }
        let fetcher = Arc::new(fetcher);

        let report = processor(Arc::clone(&fetcher), 2).process(&input).await;

        assert_eq!(report.results.len(), 6);
        assert!(fetcher.peak_in_flight.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn test_deeply_nested_page_does_not_take_down_the_batch() {
        let deep: &'static str = Box::leak(
            format!(
                "{}<p>Nested far below the fold, this paragraph still counts.</p>",
                "<div>".repeat(20_000)
            )
            .into_boxed_str(),
        );
        let fetcher = Arc::new(
            ScriptedFetcher::new()
                .page("https://deep.example/", 0, deep)
                .page("https://a.example/", 0, STORE_HTML),
        );
        let input = urls(&["https://deep.example/", "https://a.example/"]);

        let report = processor(fetcher, 2).process(&input).await;

        assert_eq!(report.results.len(), 2);
        assert_eq!(
            report.results[0].body_text,
            "Nested far below the fold, this paragraph still counts."
        );
        assert!(report.results[1].is_success());
    }

    #[tokio::test]
    async fn test_zero_concurrency_is_clamped() {
        let fetcher = Arc::new(ScriptedFetcher::new().page("https://a.example/", 0, STORE_HTML));
        let processor = processor(fetcher, 0);
        assert_eq!(processor.max_concurrency(), 1);

        let report = processor.process(&urls(&["https://a.example/"])).await;
        assert!(report.results[0].is_success());
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let fetcher = Arc::new(ScriptedFetcher::new());
        let report = processor(fetcher, 5).process(&[]).await;
        assert!(report.results.is_empty());
        assert!(report.invalid.is_empty());
        assert_eq!(report.stats.success_ratio, 0.0);
    }
}
