use serde::{Deserialize, Serialize};

/// Hard cap on extracted page text, in characters (not bytes; the cut may
/// land mid-word).
pub const MAX_CONTENT_CHARS: usize = 2000;

/// Pause applied after processing each search result, to keep the outbound
/// fetch rate polite toward target sites.
pub const RESULT_PAUSE_MS: u64 = 1000;

/// Timeout for title-only page lookups.
pub const TITLE_FETCH_TIMEOUT_MS: u64 = 5_000;

/// Timeout for full-content page fetches.
pub const PAGE_FETCH_TIMEOUT_MS: u64 = 10_000;

/// Timeout for one completion request.
pub const COMPLETION_TIMEOUT_MS: u64 = 30_000;

/// Desktop browser identity sent on page fetches. Plenty of sites refuse
/// obviously-scripted user agents outright.
pub const DESKTOP_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("fetch failed: {0}")]
    Fetch(String),
    #[error("search failed: {0}")]
    Search(String),
    #[error("completion failed: {0}")]
    Completion(String),
    #[error("not configured: {0}")]
    NotConfigured(String),
}

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchQuery {
    pub query: String,
    /// Upper bound on returned results; backends may return fewer.
    pub max_results: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub url: String,
    pub title: Option<String>,
    pub snippet: Option<String>,
    /// Name of the backend that produced this result.
    pub source: String,
}

/// Per-invocation pipeline options. The caller owns one of these per query;
/// nothing here is process-global, so overrides on one query never leak into
/// the next.
#[derive(Debug, Clone)]
pub struct QueryOptions {
    pub num_results: usize,
    pub show_context: bool,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            num_results: 3,
            show_context: false,
        }
    }
}

#[async_trait::async_trait]
pub trait SearchBackend: Send + Sync {
    fn name(&self) -> &'static str;
    async fn search(&self, q: &SearchQuery) -> Result<Vec<SearchResult>>;
}

#[async_trait::async_trait]
pub trait CompletionBackend: Send + Sync {
    fn name(&self) -> &'static str;
    async fn generate(&self, prompt: &str) -> Result<String>;
}
