//! Best-effort plain-text extraction from fetched HTML.
//!
//! Deterministic and bounded, not a readability engine: skip the
//! navigational chrome, prefer an obvious primary-content region, join the
//! remaining text runs with newlines and cut at a fixed character budget.

use html_scraper::{ElementRef, Selector};
use webask_core::MAX_CONTENT_CHARS;

/// Tags whose subtrees never contribute content text.
const CHROME_TAGS: [&str; 7] = [
    "script", "style", "nav", "header", "footer", "iframe", "noscript",
];

fn is_chrome_tag(name: &str) -> bool {
    CHROME_TAGS.iter().any(|t| name.eq_ignore_ascii_case(t))
}

fn has_chrome_ancestor(el: &ElementRef) -> bool {
    el.ancestors()
        .filter_map(ElementRef::wrap)
        .any(|a| is_chrome_tag(a.value().name()))
}

fn collect_text_runs(el: ElementRef<'_>, out: &mut Vec<String>) {
    if is_chrome_tag(el.value().name()) {
        return;
    }
    for child in el.children() {
        if let Some(child_el) = ElementRef::wrap(child) {
            collect_text_runs(child_el, out);
        } else if let Some(text) = child.value().as_text() {
            let text = text.trim();
            if !text.is_empty() {
                out.push(text.to_string());
            }
        }
    }
}

/// Extract readable text from an HTML document, capped at
/// [`MAX_CONTENT_CHARS`] characters.
///
/// Region preference: `<main>`, else `<article>`, else a `div` classed
/// `content`/`main`/`article`, else the whole document. Empty output is a
/// degraded-but-valid state, never an error.
pub fn extract_content(html: &str) -> String {
    let doc = html_scraper::Html::parse_document(html);

    let region = ["main", "article", "div.content, div.main, div.article"]
        .iter()
        .filter_map(|s| Selector::parse(s).ok())
        .find_map(|sel| doc.select(&sel).find(|el| !has_chrome_ancestor(el)));

    let mut runs = Vec::new();
    collect_text_runs(region.unwrap_or_else(|| doc.root_element()), &mut runs);

    // Sole normalization step: drop blank lines, rejoin. Runs may carry
    // internal newlines of their own, so this is not redundant with the
    // trimming above.
    let text = runs.join("\n");
    let cleaned = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n");

    truncate_chars(&cleaned, MAX_CONTENT_CHARS)
}

/// Extract the document `<title>` text, if any. Callers fall back to the
/// page URL when this returns `None`.
pub fn extract_title(html: &str) -> Option<String> {
    let doc = html_scraper::Html::parse_document(html);
    let sel = Selector::parse("title").ok()?;
    let el = doc.select(&sel).next()?;
    let t = el.text().collect::<Vec<_>>().join(" ");
    let t = t.trim().to_string();
    (!t.is_empty()).then_some(t)
}

fn truncate_chars(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}
