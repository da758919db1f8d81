use crate::config::FetchConfig;
use crate::fetchers::FetchError;
use reqwest::Client;
use reqwest::redirect::Policy;
use std::time::Duration;
use url::Url;

/// Static fetcher: one GET per page with a browser-like User-Agent
pub struct HttpFetcher {
    client: Client,
    timeout_secs: u64,
}

impl HttpFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .gzip(true)
            .redirect(Policy::limited(10))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            timeout_secs: config.request_timeout_secs,
        })
    }

    /// GET the page and return its body, failing on any non-2xx status
    pub async fn get(&self, url: &Url) -> Result<String, FetchError> {
        let started = std::time::Instant::now();
        ::log::debug!("GET {}", url);

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| self.classify(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|e| self.classify(url, e))?;

        ::log::debug!(
            "Fetched {} bytes from {} in {:.2} seconds",
            body.len(),
            url,
            started.elapsed().as_secs_f64()
        );
        Ok(body)
    }

    fn classify(&self, url: &Url, error: reqwest::Error) -> FetchError {
        if error.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
                secs: self.timeout_secs,
            }
        } else {
            FetchError::Network {
                url: url.to_string(),
                message: error.to_string(),
            }
        }
    }
}
