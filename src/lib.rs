//! Summarize & Translate - summarize pasted text with a hosted LLM and
//! translate it into one of a fixed set of languages
//!
//! The library exposes the chunking and pipeline logic, the HTTP adapters for
//! the external services, and the axum web surface.

#![forbid(unsafe_code)]

pub mod cli;
pub mod core;
pub mod server;

// Re-export key types for convenience
pub use core::{
    chunker::TextSplitter,
    config::AppConfig,
    errors::{PipelineError, ServiceError},
    languages::LanguageCode,
    models::{Action, ApiKey, PipelineOutput, PipelineRequest, Segment, TranslationChunk},
    pipeline::Pipeline,
    summarizer::{CompletionModel, MapReduceSummarizer, Summarizer},
    translator::{TranslationProvider, WindowedTranslator},
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
