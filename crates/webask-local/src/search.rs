use html_scraper::{Html, Selector};
use webask_core::{Error, Result, SearchBackend, SearchQuery, SearchResult};

use crate::{extract, PageFetcher};

fn endpoint_from_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn norm_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Search backend scraping the DuckDuckGo HTML endpoint.
///
/// Returns full url/title/snippet triples, so downstream consumers never
/// need extra lookups per result.
#[derive(Debug, Clone)]
pub struct DuckDuckGoBackend {
    client: reqwest::Client,
}

impl DuckDuckGoBackend {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    fn endpoint() -> String {
        // Override point for tests; do not put secrets here.
        endpoint_from_env("WEBASK_DDG_ENDPOINT")
            .unwrap_or_else(|| "https://html.duckduckgo.com/html/".to_string())
    }
}

/// Resolve a result anchor href to a plain target URL.
///
/// DuckDuckGo wraps results in `/l/?uddg=<urlencoded>` redirects; plain
/// absolute links pass through, everything else (relative paths, javascript:
/// pseudo-links) is rejected.
fn clean_result_url(href: &str) -> Option<String> {
    let absolute = if let Some(rest) = href.strip_prefix("//") {
        format!("https://{rest}")
    } else if href.starts_with('/') {
        format!("https://duckduckgo.com{href}")
    } else {
        href.to_string()
    };
    let parsed = url::Url::parse(&absolute).ok()?;
    if parsed
        .domain()
        .is_some_and(|d| d == "duckduckgo.com" || d.ends_with(".duckduckgo.com"))
    {
        return parsed
            .query_pairs()
            .find(|(k, _)| k == "uddg")
            .map(|(_, v)| v.into_owned());
    }
    matches!(parsed.scheme(), "http" | "https").then_some(absolute)
}

fn parse_ddg_results(html: &str, max_results: usize) -> Vec<SearchResult> {
    let (Ok(result_sel), Ok(title_sel), Ok(snippet_sel)) = (
        Selector::parse(".result"),
        Selector::parse(".result__title a"),
        Selector::parse(".result__snippet"),
    ) else {
        return Vec::new();
    };

    let doc = Html::parse_document(html);
    let mut out = Vec::new();
    for result in doc.select(&result_sel) {
        if out.len() >= max_results {
            break;
        }
        let is_ad = result
            .value()
            .attr("class")
            .is_some_and(|c| c.split_whitespace().any(|c| c == "result--ad"));
        if is_ad {
            continue;
        }
        let Some(anchor) = result.select(&title_sel).next() else {
            continue;
        };
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let Some(url) = clean_result_url(href) else {
            continue;
        };
        let title = norm_ws(&anchor.text().collect::<Vec<_>>().join(" "));
        let snippet = result
            .select(&snippet_sel)
            .next()
            .map(|el| norm_ws(&el.text().collect::<Vec<_>>().join(" ")))
            .filter(|s| !s.is_empty());
        out.push(SearchResult {
            url,
            title: (!title.is_empty()).then_some(title),
            snippet,
            source: "duckduckgo".to_string(),
        });
    }
    out
}

#[async_trait::async_trait]
impl SearchBackend for DuckDuckGoBackend {
    fn name(&self) -> &'static str {
        "duckduckgo"
    }

    async fn search(&self, q: &SearchQuery) -> Result<Vec<SearchResult>> {
        let resp = self
            .client
            .get(Self::endpoint())
            .query(&[("q", q.query.as_str())])
            .send()
            .await
            .map_err(|e| Error::Search(e.to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Search(format!("duckduckgo search HTTP {status}")));
        }
        let body = resp.text().await.map_err(|e| Error::Search(e.to_string()))?;
        Ok(parse_ddg_results(&body, q.max_results))
    }
}

/// Search backend scraping Google result pages.
///
/// The result page only yields bare URLs, so a display title is resolved per
/// result by fetching the page itself under the tighter title timeout;
/// snippets are never available from this backend.
#[derive(Debug, Clone)]
pub struct GoogleBackend {
    fetcher: PageFetcher,
}

impl GoogleBackend {
    pub fn new(fetcher: PageFetcher) -> Self {
        Self { fetcher }
    }

    fn endpoint() -> String {
        endpoint_from_env("WEBASK_GOOGLE_ENDPOINT")
            .unwrap_or_else(|| "https://www.google.com/search".to_string())
    }

    async fn resolve_title(&self, url: &str) -> String {
        match self.fetcher.fetch_for_title(url).await {
            Ok(html) => extract::extract_title(&html).unwrap_or_else(|| url.to_string()),
            Err(e) => {
                tracing::debug!(url, error = %e, "title lookup failed, using url");
                url.to_string()
            }
        }
    }
}

/// Result links come back as `/url?q=<target>&sa=...` redirects; pull the
/// target out and drop google-internal destinations.
fn clean_google_href(href: &str) -> Option<String> {
    let rest = href.strip_prefix("/url?")?;
    let parsed = url::Url::parse(&format!("https://www.google.com/url?{rest}")).ok()?;
    let (_, target) = parsed.query_pairs().find(|(k, _)| k == "q")?;
    let target = target.into_owned();
    let target_url = url::Url::parse(&target).ok()?;
    if !matches!(target_url.scheme(), "http" | "https") {
        return None;
    }
    if target_url
        .domain()
        .is_some_and(|d| d == "google.com" || d.ends_with(".google.com"))
    {
        return None;
    }
    Some(target)
}

fn parse_google_result_urls(html: &str, max_results: usize) -> Vec<String> {
    let Ok(anchor_sel) = Selector::parse("a[href]") else {
        return Vec::new();
    };
    let doc = Html::parse_document(html);
    let mut out: Vec<String> = Vec::new();
    for a in doc.select(&anchor_sel) {
        if out.len() >= max_results {
            break;
        }
        let Some(href) = a.value().attr("href") else {
            continue;
        };
        let Some(url) = clean_google_href(href) else {
            continue;
        };
        if !out.contains(&url) {
            out.push(url);
        }
    }
    out
}

#[async_trait::async_trait]
impl SearchBackend for GoogleBackend {
    fn name(&self) -> &'static str {
        "google"
    }

    async fn search(&self, q: &SearchQuery) -> Result<Vec<SearchResult>> {
        let num = q.max_results.to_string();
        let resp = self
            .fetcher
            .client()
            .get(Self::endpoint())
            .query(&[("q", q.query.as_str()), ("num", num.as_str())])
            .send()
            .await
            .map_err(|e| Error::Search(e.to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Search(format!("google search HTTP {status}")));
        }
        let body = resp.text().await.map_err(|e| Error::Search(e.to_string()))?;

        let mut out = Vec::new();
        for url in parse_google_result_urls(&body, q.max_results) {
            // Title lookups stay sequential; they hit arbitrary third-party
            // sites, same as the content fetches later in the pipeline.
            let title = self.resolve_title(&url).await;
            out.push(SearchResult {
                url,
                title: Some(title),
                snippet: None,
                source: "google".to_string(),
            });
        }
        Ok(out)
    }
}
