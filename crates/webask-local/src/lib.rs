use std::time::Duration;
use webask_core::{Error, Result, DESKTOP_USER_AGENT, PAGE_FETCH_TIMEOUT_MS, TITLE_FETCH_TIMEOUT_MS};

pub mod answer;
pub mod context;
pub mod extract;
pub mod gemini;
pub mod ollama;
pub mod search;

/// Retrieves raw page bodies over HTTP.
///
/// Failures (transport errors, timeouts, non-2xx statuses) are ordinary
/// `Err` values; the pipeline absorbs them into degraded-empty content at
/// the call site rather than aborting the query.
#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: reqwest::Client,
}

impl PageFetcher {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(DESKTOP_USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(10))
            // Avoid "hang forever" on DNS/TLS stalls; per-request timeouts
            // below bound the rest.
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| Error::Fetch(e.to_string()))?;
        Ok(Self { client })
    }

    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// The underlying client, for backends that issue their own requests.
    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// GET a page body for content extraction.
    pub async fn fetch(&self, url: &str) -> Result<String> {
        self.get_text(url, Duration::from_millis(PAGE_FETCH_TIMEOUT_MS))
            .await
    }

    /// GET a page body for a title-only lookup (tighter budget).
    pub async fn fetch_for_title(&self, url: &str) -> Result<String> {
        self.get_text(url, Duration::from_millis(TITLE_FETCH_TIMEOUT_MS))
            .await
    }

    async fn get_text(&self, url: &str, timeout: Duration) -> Result<String> {
        let resp = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| Error::Fetch(e.to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Fetch(format!("GET {url} returned HTTP {status}")));
        }
        resp.text().await.map_err(|e| Error::Fetch(e.to_string()))
    }
}
