use axum::{http::header, routing::get, Router};
use std::net::SocketAddr;
use webask_core::{SearchBackend, SearchQuery};
use webask_local::search::{DuckDuckGoBackend, GoogleBackend};
use webask_local::PageFetcher;

async fn serve(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

#[tokio::test]
async fn duckduckgo_backend_parses_a_results_page() {
    let page = r#"
    <html><body>
      <div class="result">
        <h2 class="result__title">
          <a class="result__a" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.com%2Fone">One</a>
        </h2>
        <a class="result__snippet">first snippet</a>
      </div>
      <div class="result">
        <h2 class="result__title"><a class="result__a" href="https://example.org/two">Two</a></h2>
      </div>
    </body></html>
    "#;
    let app = Router::new().route(
        "/",
        get(move || async move { ([(header::CONTENT_TYPE, "text/html")], page) }),
    );
    let addr = serve(app).await;
    std::env::set_var("WEBASK_DDG_ENDPOINT", format!("http://{addr}/"));

    let backend = DuckDuckGoBackend::new(reqwest::Client::new());
    let results = backend
        .search(&SearchQuery {
            query: "anything".to_string(),
            max_results: 5,
        })
        .await
        .unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].url, "https://example.com/one");
    assert_eq!(results[0].title.as_deref(), Some("One"));
    assert_eq!(results[0].snippet.as_deref(), Some("first snippet"));
    assert_eq!(results[1].url, "https://example.org/two");
    assert_eq!(results[1].snippet, None);
}

#[tokio::test]
async fn google_backend_returns_urls_and_resolves_titles_from_the_pages() {
    // Content server: the pages the search results point at.
    let content_app = Router::new()
        .route(
            "/titled",
            get(|| async {
                (
                    [(header::CONTENT_TYPE, "text/html")],
                    "<html><head><title>Resolved Title</title></head><body>x</body></html>",
                )
            }),
        )
        .route(
            "/untitled",
            get(|| async {
                (
                    [(header::CONTENT_TYPE, "text/html")],
                    "<html><body>no title here</body></html>",
                )
            }),
        );
    let content_addr = serve(content_app).await;
    let titled = format!("http://{content_addr}/titled");
    let untitled = format!("http://{content_addr}/untitled");

    // Search server: a result page of /url?q= redirects.
    let serp = format!(
        r#"<html><body>
          <a href="/url?q={titled}&sa=U">hit one</a>
          <a href="/url?q={untitled}&sa=U">hit two</a>
          <a href="/search?q=next">next page</a>
        </body></html>"#
    );
    let serp_app = Router::new().route(
        "/search",
        get(move || {
            let body = serp.clone();
            async move { ([(header::CONTENT_TYPE, "text/html")], body) }
        }),
    );
    let serp_addr = serve(serp_app).await;
    std::env::set_var("WEBASK_GOOGLE_ENDPOINT", format!("http://{serp_addr}/search"));

    let backend = GoogleBackend::new(PageFetcher::new().unwrap());
    let results = backend
        .search(&SearchQuery {
            query: "anything".to_string(),
            max_results: 5,
        })
        .await
        .unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].url, titled);
    assert_eq!(results[0].title.as_deref(), Some("Resolved Title"));
    assert_eq!(results[0].snippet, None);
    // No <title> on the page: the url itself stands in.
    assert_eq!(results[1].url, untitled);
    assert_eq!(results[1].title.as_deref(), Some(untitled.as_str()));
}
