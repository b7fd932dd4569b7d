use serde::{Deserialize, Serialize};
use webask_core::{CompletionBackend, Error, Result, COMPLETION_TIMEOUT_MS};

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash-8b";

/// Hosted completion backend speaking the Generative Language
/// `generateContent` API. Requires an API key; missing credentials are a
/// construction-time error, not a per-request one.
#[derive(Debug, Clone)]
pub struct GeminiBackend {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

impl GeminiBackend {
    pub fn new(client: reqwest::Client, api_key: String, model: String) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(Error::NotConfigured(
                "gemini api_key is missing or empty".to_string(),
            ));
        }
        Ok(Self {
            client,
            api_key,
            model,
        })
    }

    fn endpoint_base() -> String {
        // Override point for tests; do not put secrets here.
        std::env::var("WEBASK_GEMINI_ENDPOINT")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "https://generativelanguage.googleapis.com".to_string())
    }

    fn endpoint_generate(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            Self::endpoint_base().trim_end_matches('/'),
            self.model
        )
    }
}

#[derive(Debug, Clone, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Clone, Serialize)]
struct GenerationConfig {
    temperature: f64,
    #[serde(rename = "topK")]
    top_k: u32,
    #[serde(rename = "topP")]
    top_p: f64,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_k: 40,
            top_p: 0.95,
            max_output_tokens: 2048,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

fn first_candidate_text(resp: GenerateContentResponse) -> Option<String> {
    resp.candidates
        .into_iter()
        .next()?
        .content?
        .parts
        .into_iter()
        .next()
        .map(|p| p.text)
}

#[async_trait::async_trait]
impl CompletionBackend for GeminiBackend {
    fn name(&self) -> &'static str {
        "gemini"
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let req = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig::default(),
        };

        let resp = self
            .client
            .post(self.endpoint_generate())
            .timeout(std::time::Duration::from_millis(COMPLETION_TIMEOUT_MS))
            .header("x-goog-api-key", &self.api_key)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .json(&req)
            .send()
            .await
            .map_err(|e| Error::Completion(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Completion(format!(
                "gemini generateContent HTTP {status}"
            )));
        }

        let parsed: GenerateContentResponse = resp
            .json()
            .await
            .map_err(|e| Error::Completion(e.to_string()))?;
        first_candidate_text(parsed).ok_or_else(|| {
            Error::Completion("unexpected generateContent response shape: no candidate text".to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_matches_the_wire_format() {
        let req = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: "hello".to_string(),
                }],
            }],
            generation_config: GenerationConfig::default(),
        };
        let js = serde_json::to_value(&req).unwrap();
        assert_eq!(js["contents"][0]["parts"][0]["text"], "hello");
        assert_eq!(js["generationConfig"]["temperature"], 0.7);
        assert_eq!(js["generationConfig"]["topK"], 40);
        assert_eq!(js["generationConfig"]["topP"], 0.95);
        assert_eq!(js["generationConfig"]["maxOutputTokens"], 2048);
    }

    #[test]
    fn parses_minimal_response_shape() {
        let js = r#"
        {
          "candidates": [
            { "content": { "parts": [ { "text": "Paris." } ] } }
          ]
        }
        "#;
        let parsed: GenerateContentResponse = serde_json::from_str(js).unwrap();
        assert_eq!(first_candidate_text(parsed).as_deref(), Some("Paris."));
    }

    #[test]
    fn missing_candidates_or_parts_yield_no_text() {
        let parsed: GenerateContentResponse = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(first_candidate_text(parsed), None);

        let parsed: GenerateContentResponse =
            serde_json::from_str(r#"{"candidates":[{"content":{"parts":[]}}]}"#).unwrap();
        assert_eq!(first_candidate_text(parsed), None);

        let parsed: GenerateContentResponse =
            serde_json::from_str(r#"{"candidates":[{}]}"#).unwrap();
        assert_eq!(first_candidate_text(parsed), None);
    }

    #[test]
    fn empty_api_key_is_a_configuration_error() {
        let err = GeminiBackend::new(
            reqwest::Client::new(),
            "   ".to_string(),
            DEFAULT_GEMINI_MODEL.to_string(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::NotConfigured(_)));
    }
}
