use serde::{Deserialize, Serialize};
use webask_core::{CompletionBackend, Error, Result, COMPLETION_TIMEOUT_MS};

pub const DEFAULT_OLLAMA_MODEL: &str = "granite3-moe:3b-instruct-q8_0";

/// Local completion backend addressed by model name over the Ollama chat
/// API. No credential required.
#[derive(Debug, Clone)]
pub struct OllamaBackend {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl OllamaBackend {
    pub fn new(client: reqwest::Client, base_url: Option<String>, model: String) -> Self {
        let base_url = base_url
            .or_else(|| {
                std::env::var("WEBASK_OLLAMA_BASE_URL")
                    .ok()
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
            })
            .unwrap_or_else(|| "http://127.0.0.1:11434".to_string());
        Self {
            client,
            base_url,
            model,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint_chat(&self) -> String {
        format!("{}/api/chat", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Clone, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stream: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatResponse {
    message: ChatMessage,
}

#[async_trait::async_trait]
impl CompletionBackend for OllamaBackend {
    fn name(&self) -> &'static str {
        "ollama"
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let req = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            stream: Some(false),
        };

        let resp = self
            .client
            .post(self.endpoint_chat())
            .timeout(std::time::Duration::from_millis(COMPLETION_TIMEOUT_MS))
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .json(&req)
            .send()
            .await
            .map_err(|e| Error::Completion(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Completion(format!("ollama chat HTTP {status}")));
        }

        let parsed: ChatResponse = resp
            .json()
            .await
            .map_err(|e| Error::Completion(e.to_string()))?;
        Ok(parsed.message.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_normalized_in_endpoint() {
        let b = OllamaBackend::new(
            reqwest::Client::new(),
            Some("http://127.0.0.1:11434/".to_string()),
            DEFAULT_OLLAMA_MODEL.to_string(),
        );
        assert_eq!(b.endpoint_chat(), "http://127.0.0.1:11434/api/chat");
    }

    #[test]
    fn parses_chat_response_shape() {
        let js = r#"{"model":"m","message":{"role":"assistant","content":"hi"},"done":true}"#;
        let parsed: ChatResponse = serde_json::from_str(js).unwrap();
        assert_eq!(parsed.message.content, "hi");
    }
}
