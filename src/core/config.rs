//! Configuration management
//!
//! Settings are layered: built-in defaults, then an optional config file,
//! then `SUMMARIZE_*` environment variables (`__` separates nested keys, e.g.
//! `SUMMARIZE_SERVER__PORT=9000`). Credentials are never read from here; they
//! arrive with each request.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// Default config file name, looked up in the working directory with any
/// extension the `config` crate understands
const DEFAULT_CONFIG_NAME: &str = "summarize-translate";

/// Environment variable prefix
const ENV_PREFIX: &str = "SUMMARIZE";

/// Which OpenAI-compatible endpoint to call for summaries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryApi {
    /// Legacy `/completions` with a plain prompt
    Completions,
    /// `/chat/completions` with the prompt as a single user message
    Chat,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

/// LLM provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummarizerConfig {
    pub api: SummaryApi,
    pub api_base: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Largest combined map output summarized in one reduce call
    pub reduce_max_chars: usize,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            api: SummaryApi::Completions,
            api_base: "https://api.openai.com/v1".to_string(),
            model: "gpt-3.5-turbo-instruct".to_string(),
            temperature: 0.0,
            max_tokens: 256,
            reduce_max_chars: 12_000,
        }
    }
}

impl SummarizerConfig {
    /// Full URL of the configured endpoint
    pub fn endpoint(&self) -> String {
        let base = self.api_base.trim_end_matches('/');
        match self.api {
            SummaryApi::Completions => format!("{}/completions", base),
            SummaryApi::Chat => format!("{}/chat/completions", base),
        }
    }
}

/// Translation provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslatorConfig {
    pub endpoint: String,
    /// Maximum characters per request to the provider
    pub window_chars: usize,
    /// Sent as `de=`; raises the provider's free daily quota
    pub contact_email: Option<String>,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.mymemory.translated.net/get".to_string(),
            window_chars: 500,
            contact_email: None,
        }
    }
}

/// Text splitting settings for summarization input
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    pub separator: String,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            separator: "\n\n".to_string(),
            chunk_size: 4000,
            chunk_overlap: 0,
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub summarizer: SummarizerConfig,
    pub translator: TranslatorConfig,
    pub chunking: ChunkingConfig,
    /// Every API key must start with this
    pub credential_prefix: String,
    pub timeout_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            summarizer: SummarizerConfig::default(),
            translator: TranslatorConfig::default(),
            chunking: ChunkingConfig::default(),
            credential_prefix: "sk-".to_string(),
            timeout_ms: 60_000,
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, a config file and the environment.
    /// `None` looks for the default file and tolerates its absence; an
    /// explicit path must exist.
    pub fn load_from(path: Option<&Path>) -> anyhow::Result<Self> {
        let file = match path {
            Some(path) => {
                info!("Loading configuration from {}", path.display());
                config::File::from(path).required(true)
            }
            None => config::File::with_name(DEFAULT_CONFIG_NAME).required(false),
        };

        let settings = config::Config::builder()
            .add_source(file)
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Self = settings.try_deserialize()?;
        config.validate()?;

        debug!(
            "Configuration: summarizer={} model={} translator={}",
            config.summarizer.endpoint(),
            config.summarizer.model,
            config.translator.endpoint
        );

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.summarizer.api_base.is_empty() {
            return Err(anyhow::anyhow!("summarizer.api_base is required"));
        }

        if self.summarizer.model.is_empty() {
            return Err(anyhow::anyhow!("summarizer.model is required"));
        }

        if self.summarizer.reduce_max_chars == 0 {
            return Err(anyhow::anyhow!(
                "summarizer.reduce_max_chars must be greater than 0"
            ));
        }

        if self.translator.endpoint.is_empty() {
            return Err(anyhow::anyhow!("translator.endpoint is required"));
        }

        if self.translator.window_chars == 0 {
            return Err(anyhow::anyhow!(
                "translator.window_chars must be greater than 0"
            ));
        }

        if self.chunking.chunk_size == 0 {
            return Err(anyhow::anyhow!("chunking.chunk_size must be greater than 0"));
        }

        if self.chunking.chunk_overlap >= self.chunking.chunk_size {
            return Err(anyhow::anyhow!(
                "chunking.chunk_overlap ({}) must be smaller than chunking.chunk_size ({})",
                self.chunking.chunk_overlap,
                self.chunking.chunk_size
            ));
        }

        if self.credential_prefix.is_empty() {
            return Err(anyhow::anyhow!("credential_prefix is required"));
        }

        if self.timeout_ms == 0 {
            return Err(anyhow::anyhow!("timeout_ms must be greater than 0"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.translator.window_chars, 500);
        assert_eq!(config.credential_prefix, "sk-");
    }

    #[test]
    fn test_config_validation_overlap() {
        let mut config = AppConfig::default();
        config.chunking.chunk_overlap = config.chunking.chunk_size;
        assert!(config.validate().is_err());

        config.chunking.chunk_overlap = 0;
        config.chunking.chunk_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_missing_endpoint() {
        let config = AppConfig {
            translator: TranslatorConfig {
                endpoint: "".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_endpoint_follows_api_style() {
        let mut summarizer = SummarizerConfig {
            api_base: "http://localhost:9999/v1/".to_string(),
            ..Default::default()
        };
        assert_eq!(summarizer.endpoint(), "http://localhost:9999/v1/completions");

        summarizer.api = SummaryApi::Chat;
        assert_eq!(
            summarizer.endpoint(),
            "http://localhost:9999/v1/chat/completions"
        );
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        writeln!(
            file,
            r#"
[summarizer]
api = "chat"
model = "gpt-4o-mini"

[chunking]
chunk_size = 1000
chunk_overlap = 100
"#
        )
        .unwrap();

        let config = AppConfig::load_from(Some(file.path())).unwrap();
        assert_eq!(config.summarizer.api, SummaryApi::Chat);
        assert_eq!(config.summarizer.model, "gpt-4o-mini");
        assert_eq!(config.chunking.chunk_size, 1000);
        assert_eq!(config.chunking.chunk_overlap, 100);
        // Untouched sections keep their defaults
        assert_eq!(config.chunking.separator, "\n\n");
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        writeln!(file, "[chunking]\nchunk_size = 10\nchunk_overlap = 10").unwrap();

        assert!(AppConfig::load_from(Some(file.path())).is_err());
    }

    #[test]
    fn test_load_missing_explicit_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(AppConfig::load_from(Some(&missing)).is_err());
    }
}
