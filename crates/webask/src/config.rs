use anyhow::Context;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// On-disk configuration, including the hosted-backend credential.
///
/// Looked up in the working directory first, then the user config dir. A
/// missing file is fine: only the gemini backend actually requires anything
/// from it.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub gemini: GeminiConfig,
    #[serde(default)]
    pub ollama: OllamaConfig,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub model: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct OllamaConfig {
    pub base_url: Option<String>,
    pub model: Option<String>,
}

pub const CONFIG_FILE_NAME: &str = "webask.toml";

impl Config {
    /// Load configuration once at startup. An explicit path must exist and
    /// parse; the default candidates are optional.
    pub fn load(explicit: Option<&Path>) -> anyhow::Result<Self> {
        if let Some(path) = explicit {
            return Self::read(path);
        }
        for candidate in Self::default_paths() {
            if candidate.exists() {
                tracing::debug!(path = %candidate.display(), "loading config file");
                return Self::read(&candidate);
            }
        }
        tracing::debug!("no config file found, using defaults");
        Ok(Self::default())
    }

    fn read(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("parsing config file {}", path.display()))
    }

    fn default_paths() -> Vec<PathBuf> {
        let mut out = vec![PathBuf::from(CONFIG_FILE_NAME)];
        if let Some(dir) = dirs::config_dir() {
            out.push(dir.join("webask").join(CONFIG_FILE_NAME));
        }
        out
    }

    /// The gemini credential; the environment wins over the file so tests
    /// and one-off runs don't need a config on disk.
    pub fn gemini_api_key(&self) -> Option<String> {
        std::env::var("WEBASK_GEMINI_API_KEY")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .or_else(|| {
                self.gemini
                    .api_key
                    .clone()
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_full_config_file() {
        let raw = r#"
        [gemini]
        api_key = "secret"
        model = "gemini-1.5-flash-8b"

        [ollama]
        base_url = "http://10.0.0.2:11434"
        model = "llama3"
        "#;
        let cfg: Config = toml::from_str(raw).unwrap();
        assert_eq!(cfg.gemini.api_key.as_deref(), Some("secret"));
        assert_eq!(cfg.ollama.base_url.as_deref(), Some("http://10.0.0.2:11434"));
        assert_eq!(cfg.ollama.model.as_deref(), Some("llama3"));
    }

    #[test]
    fn missing_sections_default_to_empty() {
        let cfg: Config = toml::from_str("").unwrap();
        assert!(cfg.gemini.api_key.is_none());
        assert!(cfg.ollama.base_url.is_none());
    }
}
