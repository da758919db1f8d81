use crate::config::FetchConfig;
use crate::fetchers::FetchError;
use async_trait::async_trait;
use fantoccini::{Client, ClientBuilder};
use serde_json::json;
use std::time::Duration;
use tokio::time::timeout;
use url::Url;

/// One browser session: a single page context that can be navigated,
/// serialized and torn down
#[async_trait]
pub trait Session: Send + Sync {
    async fn goto(&self, url: &str) -> Result<(), String>;

    async fn source(&self) -> Result<String, String>;

    async fn close(&self) -> Result<(), String>;
}

/// Opens a fresh browser session
#[async_trait]
pub trait SessionLauncher: Send + Sync {
    async fn launch(&self) -> Result<Box<dyn Session>, String>;
}

#[async_trait]
impl Session for Client {
    async fn goto(&self, url: &str) -> Result<(), String> {
        Client::goto(self, url).await.map_err(|e| e.to_string())
    }

    async fn source(&self) -> Result<String, String> {
        Client::source(self).await.map_err(|e| e.to_string())
    }

    async fn close(&self) -> Result<(), String> {
        Client::close(self.clone()).await.map_err(|e| e.to_string())
    }
}

/// Launches sessions on a WebDriver server
pub struct WebDriverLauncher {
    webdriver_url: String,
    user_agent: String,
    headless: bool,
}

impl WebDriverLauncher {
    pub fn new(config: &FetchConfig) -> Self {
        Self {
            webdriver_url: config.webdriver_url.clone(),
            user_agent: config.user_agent.clone(),
            headless: config.headless,
        }
    }

    fn capabilities(&self) -> serde_json::Map<String, serde_json::Value> {
        let mut chrome_args = vec![
            "--disable-gpu".to_string(),
            "--no-sandbox".to_string(),
            format!("--user-agent={}", self.user_agent),
        ];
        let mut firefox_args = Vec::new();
        if self.headless {
            chrome_args.push("--headless=new".to_string());
            firefox_args.push("-headless".to_string());
        }

        let mut caps = serde_json::Map::new();
        caps.insert("goog:chromeOptions".to_string(), json!({ "args": chrome_args }));
        caps.insert("moz:firefoxOptions".to_string(), json!({ "args": firefox_args }));
        caps
    }
}

#[async_trait]
impl SessionLauncher for WebDriverLauncher {
    /// Connects to the WebDriver instance with browser capabilities
    async fn launch(&self) -> Result<Box<dyn Session>, String> {
        let mut builder = ClientBuilder::native();
        builder.capabilities(self.capabilities());

        match builder.connect(&self.webdriver_url).await {
            Ok(client) => {
                ::log::debug!("Connected to WebDriver at {}", self.webdriver_url);
                Ok(Box::new(client))
            }
            Err(e) => {
                ::log::error!(
                    "Failed to connect to WebDriver at {}: {}",
                    self.webdriver_url,
                    e
                );
                ::log::error!(
                    "Make sure a WebDriver server is running or set the WEBDRIVER_URL environment variable"
                );
                Err(e.to_string())
            }
        }
    }
}

/// Rendered-mode fetcher.
///
/// Every page gets its own session: launch, navigate, wait for deferred
/// scripts, capture the DOM, and close the session whatever the outcome.
pub struct BrowserFetcher {
    launcher: Box<dyn SessionLauncher>,
    navigation_timeout: Duration,
    settle_delay: Duration,
}

impl BrowserFetcher {
    pub fn new(config: &FetchConfig) -> Self {
        Self::with_launcher(config, Box::new(WebDriverLauncher::new(config)))
    }

    /// Fetcher that opens sessions through any launcher
    pub fn with_launcher(config: &FetchConfig, launcher: Box<dyn SessionLauncher>) -> Self {
        Self {
            launcher,
            navigation_timeout: Duration::from_secs(config.navigation_timeout_secs),
            settle_delay: Duration::from_millis(config.settle_delay_ms),
        }
    }

    /// Render a page and return the serialized DOM
    pub async fn render(&self, url: &Url) -> Result<String, FetchError> {
        let started = std::time::Instant::now();
        let session = self.connect(url).await?;

        let result = self.capture(session.as_ref(), url).await;

        // The session is torn down on success and failure alike
        if let Err(e) = session.close().await {
            ::log::warn!("Failed to close browser session for {}: {}", url, e);
        }

        if result.is_ok() {
            ::log::debug!(
                "Rendered {} in {:.2} seconds",
                url,
                started.elapsed().as_secs_f64()
            );
        }
        result
    }

    async fn connect(&self, url: &Url) -> Result<Box<dyn Session>, FetchError> {
        match timeout(self.navigation_timeout, self.launcher.launch()).await {
            Ok(Ok(session)) => Ok(session),
            Ok(Err(message)) => Err(FetchError::RenderCrash {
                url: url.to_string(),
                message: format!("could not start browser session: {message}"),
            }),
            Err(_) => Err(self.render_timeout(url)),
        }
    }

    async fn capture(&self, session: &dyn Session, url: &Url) -> Result<String, FetchError> {
        match timeout(self.navigation_timeout, session.goto(url.as_str())).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(navigation_error(&e, "navigating to", url)),
            Err(_) => return Err(self.render_timeout(url)),
        }

        // Let deferred scripts populate the DOM
        tokio::time::sleep(self.settle_delay).await;

        session
            .source()
            .await
            .map_err(|e| navigation_error(&e, "getting source for", url))
    }

    fn render_timeout(&self, url: &Url) -> FetchError {
        FetchError::RenderTimeout {
            url: url.to_string(),
            secs: self.navigation_timeout.as_secs(),
        }
    }
}

/// Converts a failed browser command into a render error
fn navigation_error(error: &str, context: &str, url: &Url) -> FetchError {
    if error.contains("Unable to find session") {
        ::log::warn!("Lost browser session while {} {}", context, url);
    } else {
        ::log::error!("Failed {} {}: {}", context, url, error);
    }
    FetchError::RenderCrash {
        url: url.to_string(),
        message: format!("{context} page: {error}"),
    }
}
