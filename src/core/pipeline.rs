//! Request-scoped pipeline: validate, summarize, translate, return
//!
//! A `Pipeline` holds only immutable collaborators, so one instance serves
//! every request. All per-request data travels in `PipelineRequest`.

use std::sync::Arc;
use tracing::{info, warn};

use crate::core::chunker::TextSplitter;
use crate::core::client::{http_client, OpenAiClient};
use crate::core::config::AppConfig;
use crate::core::errors::{PipelineError, Result};
use crate::core::languages::LanguageCode;
use crate::core::models::{ApiKey, PipelineOutput, PipelineRequest, SummaryOutcome, TranslationOutcome};
use crate::core::summarizer::{MapReduceSummarizer, Summarizer};
use crate::core::translator::{MyMemoryClient, WindowedTranslator};

/// Orchestrates the summarize and translate stages
#[derive(Clone)]
pub struct Pipeline {
    splitter: TextSplitter,
    summarizer: Arc<dyn Summarizer>,
    translator: WindowedTranslator,
    credential_prefix: String,
}

impl Pipeline {
    pub fn new(
        splitter: TextSplitter,
        summarizer: Arc<dyn Summarizer>,
        translator: WindowedTranslator,
        credential_prefix: impl Into<String>,
    ) -> Self {
        Self {
            splitter,
            summarizer,
            translator,
            credential_prefix: credential_prefix.into(),
        }
    }

    /// Wire up the OpenAI and MyMemory adapters from configuration
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        config.validate().map_err(|e| PipelineError::Config {
            message: e.to_string(),
        })?;

        let client = http_client(config.timeout_ms)?;
        let model = OpenAiClient::new(client.clone(), config.summarizer.clone());
        info!("Summaries via {} ({})", model.endpoint(), config.summarizer.model);
        info!("Translations via {}", config.translator.endpoint);

        let summarizer = MapReduceSummarizer::new(model, config.summarizer.reduce_max_chars);
        let provider = MyMemoryClient::new(client, config.translator.clone());
        let translator = WindowedTranslator::new(Arc::new(provider), config.translator.window_chars);

        Ok(Self::new(
            TextSplitter::from_config(&config.chunking)?,
            Arc::new(summarizer),
            translator,
            config.credential_prefix.clone(),
        ))
    }

    pub fn credential_prefix(&self) -> &str {
        &self.credential_prefix
    }

    /// Check the credential prefix
    pub fn parse_api_key(&self, raw: &str) -> Result<ApiKey> {
        ApiKey::parse(raw, &self.credential_prefix)
    }

    /// Chunk `text` and summarize the segments
    pub async fn summarize(&self, text: &str, api_key: &ApiKey) -> Result<SummaryOutcome> {
        let segments = self.splitter.split(text)?;
        self.summarizer.summarize(&segments, api_key).await
    }

    /// Translate `text` window by window
    pub async fn translate(
        &self,
        text: &str,
        source: LanguageCode,
        target: LanguageCode,
    ) -> Result<TranslationOutcome> {
        if text.trim().is_empty() {
            return Err(PipelineError::InvalidInput);
        }
        self.translator.translate(text, source, target).await
    }

    /// Run one request to completion
    pub async fn run(&self, request: PipelineRequest) -> Result<PipelineOutput> {
        let PipelineRequest {
            text,
            api_key,
            action,
            source_language,
            target_language,
        } = request;

        if text.trim().is_empty() {
            return Err(PipelineError::InvalidInput);
        }
        let api_key = self.parse_api_key(&api_key)?;

        // Resolve languages before spending any tokens
        let languages = if action.translates() {
            let target_name = target_language.ok_or_else(|| PipelineError::MissingField {
                field: "target_language".to_string(),
            })?;
            Some(LanguageCode::resolve_pair(
                source_language.as_deref(),
                &target_name,
            )?)
        } else {
            None
        };

        info!("Running {} on {} chars", action, text.chars().count());

        let summary = if action.summarizes() {
            Some(self.summarize(&text, &api_key).await?)
        } else {
            None
        };

        let translation = match languages {
            Some((source, target)) => {
                // A blank summary falls back to the original text
                let input = match summary.as_ref().map(|s| s.summary.as_str()) {
                    Some(summary) if !summary.trim().is_empty() => summary,
                    Some(_) => {
                        warn!("Summary came back empty, translating the input text instead");
                        text.as_str()
                    }
                    None => text.as_str(),
                };
                Some(self.translate(input, source, target).await?)
            }
            None => None,
        };

        Ok(PipelineOutput {
            action,
            segments: summary.as_ref().map(|s| s.segments).unwrap_or(0),
            tokens_used: summary.as_ref().map(|s| s.tokens_used).unwrap_or(0),
            translation_chunks: translation.as_ref().map(|t| t.chunks).unwrap_or(0),
            summary: summary.map(|s| s.summary),
            translation: translation.map(|t| t.translation),
            completed_at: chrono::Utc::now(),
        })
    }
}
