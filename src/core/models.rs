//! Core data models for the pipeline

use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

use crate::core::errors::{PipelineError, Result};
use crate::core::languages::LanguageCode;

/// A piece of input text handed to the summarizer. Never blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment(String);

impl Segment {
    /// Build a segment, rejecting text that is empty after trimming
    pub fn new(text: impl Into<String>) -> Option<Self> {
        let text = text.into();
        if text.trim().is_empty() {
            None
        } else {
            Some(Self(text))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Length in characters
    pub fn char_len(&self) -> usize {
        self.0.chars().count()
    }

}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fixed-length window of text sent to the translation provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationChunk {
    pub index: usize,
    pub text: String,
}

impl TranslationChunk {
    /// Length in characters
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// Caller-supplied credential for the LLM provider.
///
/// Held for a single request only; `Debug` and `Display` never print the key.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Accept the key only if it starts with `prefix`
    pub fn parse(raw: &str, prefix: &str) -> Result<Self> {
        let raw = raw.trim();
        if raw.starts_with(prefix) && raw.len() > prefix.len() {
            Ok(Self(raw.to_string()))
        } else {
            Err(PipelineError::InvalidCredential {
                expected_prefix: prefix.to_string(),
            })
        }
    }

    /// The raw key, for the `Authorization` header
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ApiKey(***)")
    }
}

impl fmt::Display for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "***")
    }
}

/// What the user asked for
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    #[default]
    Summarize,
    Translate,
    SummarizeAndTranslate,
}

impl Action {
    pub const ALL: [Action; 3] = [
        Action::Summarize,
        Action::Translate,
        Action::SummarizeAndTranslate,
    ];

    pub fn summarizes(self) -> bool {
        matches!(self, Action::Summarize | Action::SummarizeAndTranslate)
    }

    pub fn translates(self) -> bool {
        matches!(self, Action::Translate | Action::SummarizeAndTranslate)
    }

    /// Label shown on the form
    pub fn label(self) -> &'static str {
        match self {
            Action::Summarize => "Summarize",
            Action::Translate => "Translate",
            Action::SummarizeAndTranslate => "Summarize and translate",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Summarize => write!(f, "summarize"),
            Action::Translate => write!(f, "translate"),
            Action::SummarizeAndTranslate => write!(f, "summarize_and_translate"),
        }
    }
}

/// Everything one pipeline run needs. Language fields hold display names.
#[derive(Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct PipelineRequest {
    pub text: String,
    pub api_key: String,
    #[serde(default)]
    pub action: Action,
    #[serde(default)]
    pub source_language: Option<String>,
    #[serde(default)]
    pub target_language: Option<String>,
}

impl PipelineRequest {
    pub fn new(text: impl Into<String>, api_key: impl Into<String>, action: Action) -> Self {
        Self {
            text: text.into(),
            api_key: api_key.into(),
            action,
            source_language: None,
            target_language: None,
        }
    }

    pub fn with_source_language(mut self, name: impl Into<String>) -> Self {
        self.source_language = Some(name.into());
        self
    }

    pub fn with_target_language(mut self, name: impl Into<String>) -> Self {
        self.target_language = Some(name.into());
        self
    }
}

impl fmt::Debug for PipelineRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineRequest")
            .field("text_chars", &self.text.chars().count())
            .field("api_key", &"***")
            .field("action", &self.action)
            .field("source_language", &self.source_language)
            .field("target_language", &self.target_language)
            .finish()
    }
}

/// Aggregated summary of all segments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryOutcome {
    pub summary: String,
    pub segments: usize,
    pub tokens_used: usize,
}

/// Result of translating a text window by window
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationOutcome {
    pub translation: String,
    pub source: LanguageCode,
    pub target: LanguageCode,
    pub chunks: usize,
}

/// A single completion returned by the LLM provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub text: String,
    pub tokens_used: usize,
}

/// Result of one pipeline run
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PipelineOutput {
    pub action: Action,
    pub summary: Option<String>,
    pub translation: Option<String>,
    pub segments: usize,
    pub translation_chunks: usize,
    pub tokens_used: usize,
    pub completed_at: chrono::DateTime<chrono::Utc>,
}

impl PipelineOutput {
    /// The text to show the user: the translation if one was made, else the summary
    pub fn final_text(&self) -> Option<&str> {
        self.translation.as_deref().or(self.summary.as_deref())
    }
}
