use anyhow::bail;
use webask_core::{CompletionBackend, SearchBackend};
use webask_local::answer::AnswerGenerator;
use webask_local::context::ContextAssembler;
use webask_local::gemini::{GeminiBackend, DEFAULT_GEMINI_MODEL};
use webask_local::ollama::{OllamaBackend, DEFAULT_OLLAMA_MODEL};
use webask_local::search::{DuckDuckGoBackend, GoogleBackend};
use webask_local::PageFetcher;

use crate::config::Config;

/// One fully-wired query pipeline: assembler in front, generator behind.
/// Construction validates configuration (a missing gemini credential fails
/// here, at startup, not mid-query).
pub struct Pipeline {
    assembler: ContextAssembler,
    generator: AnswerGenerator,
    model: String,
}

impl Pipeline {
    pub fn build(
        cfg: &Config,
        search_name: &str,
        backend_name: &str,
        model_override: Option<&str>,
    ) -> anyhow::Result<Self> {
        let fetcher = PageFetcher::new()?;

        let search: Box<dyn SearchBackend> = match search_name {
            "duckduckgo" | "ddg" => Box::new(DuckDuckGoBackend::new(fetcher.client().clone())),
            "google" => Box::new(GoogleBackend::new(fetcher.clone())),
            other => bail!("unknown search backend: {other} (expected duckduckgo or google)"),
        };

        let (backend, model): (Box<dyn CompletionBackend>, String) = match backend_name {
            "gemini" => {
                let api_key = match cfg.gemini_api_key() {
                    Some(k) => k,
                    None => bail!(
                        "gemini backend selected but no api_key configured \
                         (set [gemini] api_key in webask.toml)"
                    ),
                };
                let model = model_override
                    .map(str::to_string)
                    .or_else(|| cfg.gemini.model.clone())
                    .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string());
                (
                    Box::new(GeminiBackend::new(
                        fetcher.client().clone(),
                        api_key,
                        model.clone(),
                    )?),
                    model,
                )
            }
            "ollama" => {
                let model = model_override
                    .map(str::to_string)
                    .or_else(|| cfg.ollama.model.clone())
                    .unwrap_or_else(|| DEFAULT_OLLAMA_MODEL.to_string());
                (
                    Box::new(OllamaBackend::new(
                        fetcher.client().clone(),
                        cfg.ollama.base_url.clone(),
                        model.clone(),
                    )),
                    model,
                )
            }
            other => bail!("unknown completion backend: {other} (expected gemini or ollama)"),
        };

        Ok(Self {
            assembler: ContextAssembler::new(search, fetcher),
            generator: AnswerGenerator::new(backend),
            model,
        })
    }

    /// Model name this pipeline will address, after default resolution.
    pub fn model(&self) -> &str {
        &self.model
    }

    pub async fn assemble(&self, query: &str, num_results: usize) -> String {
        self.assembler.assemble(query, num_results).await
    }

    pub async fn answer(&self, query: &str, context: &str) -> String {
        self.generator.answer(query, context).await
    }
}
