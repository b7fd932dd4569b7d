use axum::{routing::post, Json, Router};
use std::net::SocketAddr;
use webask_core::{CompletionBackend, Error};
use webask_local::gemini::{GeminiBackend, DEFAULT_GEMINI_MODEL};
use webask_local::ollama::OllamaBackend;

async fn serve(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

#[tokio::test]
async fn gemini_backend_round_trips_and_flags_bad_shapes() {
    // The generateContent path carries a `:` segment, so match any route.
    let good = Router::new().fallback(|| async {
        Json(serde_json::json!({
            "candidates": [
                { "content": { "parts": [ { "text": "stub answer" } ] } }
            ]
        }))
    });
    let addr = serve(good).await;
    std::env::set_var("WEBASK_GEMINI_ENDPOINT", format!("http://{addr}"));

    let backend = GeminiBackend::new(
        reqwest::Client::new(),
        "test-key".to_string(),
        DEFAULT_GEMINI_MODEL.to_string(),
    )
    .unwrap();
    assert_eq!(backend.generate("hi").await.unwrap(), "stub answer");

    // Well-formed JSON, wrong shape: surfaced as a completion error, not a
    // panic and not a silent empty answer.
    let bad = Router::new().fallback(|| async { Json(serde_json::json!({ "candidates": [] })) });
    let bad_addr = serve(bad).await;
    std::env::set_var("WEBASK_GEMINI_ENDPOINT", format!("http://{bad_addr}"));

    let err = backend.generate("hi").await.unwrap_err();
    assert!(matches!(err, Error::Completion(_)));
    assert!(err.to_string().contains("response shape"));
}

#[tokio::test]
async fn ollama_backend_round_trips_the_chat_api() {
    let app = Router::new().route(
        "/api/chat",
        post(|| async {
            Json(serde_json::json!({
                "model": "m",
                "message": { "role": "assistant", "content": "local hi" },
                "done": true
            }))
        }),
    );
    let addr = serve(app).await;

    let backend = OllamaBackend::new(
        reqwest::Client::new(),
        Some(format!("http://{addr}")),
        "m".to_string(),
    );
    assert_eq!(backend.generate("hi").await.unwrap(), "local hi");
}

#[tokio::test]
async fn ollama_http_errors_become_completion_errors() {
    let app = Router::new().route(
        "/api/chat",
        post(|| async { (axum::http::StatusCode::INTERNAL_SERVER_ERROR, "down") }),
    );
    let addr = serve(app).await;

    let backend = OllamaBackend::new(
        reqwest::Client::new(),
        Some(format!("http://{addr}")),
        "m".to_string(),
    );
    let err = backend.generate("hi").await.unwrap_err();
    assert!(matches!(err, Error::Completion(_)));
    assert!(err.to_string().contains("HTTP"));
}
