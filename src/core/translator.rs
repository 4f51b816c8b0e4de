//! Window-by-window translation
//!
//! The translation provider accepts at most 500 characters per request, so
//! text is cut into fixed-length windows with no regard for word or sentence
//! boundaries. Each window is translated on its own and the results are
//! joined with a single space.

use async_trait::async_trait;
use std::fmt::Debug;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::core::chunker::char_windows;
use crate::core::config::TranslatorConfig;
use crate::core::errors::{PipelineError, Result, ServiceError};
use crate::core::languages::LanguageCode;
use crate::core::models::{TranslationChunk, TranslationOutcome};

/// Maximum characters the default provider accepts in one request
pub const DEFAULT_WINDOW_CHARS: usize = 500;

/// Separator between translated windows
const WINDOW_JOINER: &str = " ";

/// A translation capability for a single short text
#[async_trait]
pub trait TranslationProvider: Send + Sync + Debug {
    async fn translate_window(
        &self,
        text: &str,
        source: LanguageCode,
        target: LanguageCode,
    ) -> std::result::Result<String, ServiceError>;
}

/// Cut `text` into windows of at most `window_chars` characters
pub fn split_windows(text: &str, window_chars: usize) -> Vec<TranslationChunk> {
    char_windows(text, window_chars)
        .into_iter()
        .enumerate()
        .map(|(index, window)| TranslationChunk {
            index,
            text: window.to_string(),
        })
        .collect()
}

/// Translates arbitrarily long text through a window-limited provider
#[derive(Debug, Clone)]
pub struct WindowedTranslator {
    provider: Arc<dyn TranslationProvider>,
    window_chars: usize,
}

impl WindowedTranslator {
    pub fn new(provider: Arc<dyn TranslationProvider>, window_chars: usize) -> Self {
        Self {
            provider,
            window_chars: window_chars.max(1),
        }
    }

    /// Translate `text` from `source` to `target`
    pub async fn translate(
        &self,
        text: &str,
        source: LanguageCode,
        target: LanguageCode,
    ) -> Result<TranslationOutcome> {
        if source == target {
            debug!("Source and target are both {}, returning text unchanged", target);
            return Ok(TranslationOutcome {
                translation: text.to_string(),
                source,
                target,
                chunks: 0,
            });
        }

        let chunks = split_windows(text, self.window_chars);
        info!(
            "Translating {} chars {} -> {} in {} windows",
            text.chars().count(),
            source.code(),
            target.code(),
            chunks.len()
        );

        let mut translated = Vec::with_capacity(chunks.len());
        for chunk in &chunks {
            debug!(
                "Translating window {}/{} ({} chars)",
                chunk.index + 1,
                chunks.len(),
                chunk.char_len()
            );
            let result = self
                .provider
                .translate_window(&chunk.text, source, target)
                .await
                .map_err(|e| {
                    warn!("Window {} failed: {}", chunk.index, e);
                    PipelineError::translation(e)
                })?;
            translated.push(result);
        }

        Ok(TranslationOutcome {
            translation: translated.join(WINDOW_JOINER),
            source,
            target,
            chunks: chunks.len(),
        })
    }
}

/// Client for the MyMemory translation API
#[derive(Debug, Clone)]
pub struct MyMemoryClient {
    client: reqwest::Client,
    config: TranslatorConfig,
}

impl MyMemoryClient {
    pub fn new(client: reqwest::Client, config: TranslatorConfig) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl TranslationProvider for MyMemoryClient {
    async fn translate_window(
        &self,
        text: &str,
        source: LanguageCode,
        target: LanguageCode,
    ) -> std::result::Result<String, ServiceError> {
        let langpair = format!("{}|{}", source.code(), target.code());
        let mut query = vec![("q", text), ("langpair", langpair.as_str())];
        if let Some(email) = &self.config.contact_email {
            query.push(("de", email.as_str()));
        }

        let response = self
            .client
            .get(&self.config.endpoint)
            .query(&query)
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(ServiceError::RateLimited { retry_after: None });
        }
        if !status.is_success() {
            return Err(ServiceError::Api {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }

        let json: serde_json::Value =
            response
                .json()
                .await
                .map_err(|e| ServiceError::InvalidResponse {
                    message: e.to_string(),
                })?;

        parse_mymemory_response(&json)
    }
}

/// Extract the translation from a MyMemory response body
fn parse_mymemory_response(json: &serde_json::Value) -> std::result::Result<String, ServiceError> {
    if json["quotaFinished"].as_bool().unwrap_or(false) {
        return Err(ServiceError::QuotaExceeded);
    }

    // responseStatus is a number on success and sometimes a string on errors
    let status = json["responseStatus"]
        .as_u64()
        .or_else(|| json["responseStatus"].as_str().and_then(|s| s.parse().ok()))
        .unwrap_or(200);
    if status != 200 {
        let message = json["responseDetails"]
            .as_str()
            .unwrap_or("unknown error")
            .to_string();
        return Err(ServiceError::Api {
            status: u16::try_from(status).unwrap_or(502),
            message,
        });
    }

    let translated = json["responseData"]["translatedText"]
        .as_str()
        .unwrap_or_default();

    if translated.starts_with("MYMEMORY WARNING") {
        return Err(ServiceError::QuotaExceeded);
    }

    if !translated.is_empty() {
        return Ok(translated.to_string());
    }

    json["matches"]
        .get(0)
        .and_then(|m| m["translation"].as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| ServiceError::InvalidResponse {
            message: "No translation in response".to_string(),
        })
}
