//! Core pipeline: chunking, summarization, translation

pub mod chunker;
pub mod client;
pub mod config;
pub mod errors;
pub mod languages;
pub mod models;
pub mod pipeline;
pub mod summarizer;
pub mod translator;

#[cfg(test)]
pub(crate) mod test_support;
