use std::time::Duration;
use webask_core::{SearchBackend, SearchQuery, SearchResult, RESULT_PAUSE_MS};

use crate::extract;
use crate::PageFetcher;

/// Separator line closing every context block.
const BLOCK_SEPARATOR: &str = "==================================================";

/// Drives one query through search -> fetch -> extract and serializes the
/// results into a single context document for the completion backend.
pub struct ContextAssembler {
    search: Box<dyn SearchBackend>,
    fetcher: PageFetcher,
}

impl ContextAssembler {
    pub fn new(search: Box<dyn SearchBackend>, fetcher: PageFetcher) -> Self {
        Self { search, fetcher }
    }

    /// Build the context document for one query: one search call, then a
    /// strictly sequential fetch+extract per result. Partial failures
    /// degrade the document instead of aborting it; an empty string is a
    /// valid outcome.
    pub async fn assemble(&self, query: &str, num_results: usize) -> String {
        let q = SearchQuery {
            query: query.to_string(),
            max_results: num_results,
        };
        let results = match self.search.search(&q).await {
            Ok(results) => results,
            Err(e) => {
                tracing::warn!(backend = self.search.name(), error = %e, "web search failed, continuing without results");
                Vec::new()
            }
        };

        let mut blocks = Vec::new();
        for result in results.iter().take(num_results) {
            if result.url.trim().is_empty() {
                continue;
            }
            tracing::info!(url = %result.url, "fetching content");
            let content = match self.fetcher.fetch(&result.url).await {
                Ok(html) => extract::extract_content(&html),
                Err(e) => {
                    tracing::warn!(url = %result.url, error = %e, "page fetch failed, block will carry no content");
                    String::new()
                }
            };
            blocks.push(format_block(result, &content));

            // Politeness pause between outbound fetches.
            tokio::time::sleep(Duration::from_millis(RESULT_PAUSE_MS)).await;
        }

        blocks.join("\n")
    }
}

/// One search result's contribution to the context document.
///
/// The Summary line is omitted when the backend produced no snippet; the
/// Content section is omitted when extraction degraded to empty.
fn format_block(result: &SearchResult, content: &str) -> String {
    let title = result.title.as_deref().unwrap_or("");
    let snippet = result.snippet.as_deref().unwrap_or("");

    let mut block = String::new();
    block.push_str(&format!("Source: {title}\n"));
    block.push_str(&format!("URL: {}\n", result.url));
    if !snippet.is_empty() {
        block.push_str(&format!("Summary: {snippet}\n"));
    }
    if !content.is_empty() {
        block.push_str(&format!("\nContent:\n{content}\n"));
    }
    block.push_str(BLOCK_SEPARATOR);
    block.push('\n');
    block
}
