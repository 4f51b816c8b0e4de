//! Map-reduce summarization over text segments
//!
//! Each segment is summarized on its own, then the partial summaries are
//! joined and summarized once more. When the joined partials are too long
//! for a single reduce call they are grouped and collapsed first.

use async_trait::async_trait;
use std::fmt::Debug;
use tracing::{debug, info};

use crate::core::errors::{PipelineError, Result, ServiceError};
use crate::core::models::{ApiKey, Completion, Segment, SummaryOutcome};

/// Separator placed between partial summaries
const PARTIAL_SEPARATOR: &str = "\n\n";

/// Upper bound on collapse rounds before the final reduce
const MAX_COLLAPSE_ROUNDS: usize = 3;

/// A text-completion capability (the hosted LLM)
#[async_trait]
pub trait CompletionModel: Send + Sync + Debug {
    /// Complete `prompt` using `api_key` for this call only
    async fn complete(
        &self,
        prompt: &str,
        api_key: &ApiKey,
    ) -> std::result::Result<Completion, ServiceError>;
}

/// Produces one summary from an ordered list of segments
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, segments: &[Segment], api_key: &ApiKey) -> Result<SummaryOutcome>;
}

/// Prompt used for both the map and the reduce step
pub fn summary_prompt(text: &str) -> String {
    format!(
        "Write a concise summary of the following:\n\n\n\"{}\"\n\n\nCONCISE SUMMARY:",
        text
    )
}

/// Summarize each segment, then summarize the combined partial summaries
#[derive(Debug, Clone)]
pub struct MapReduceSummarizer<M> {
    model: M,
    reduce_max_chars: usize,
}

impl<M: CompletionModel> MapReduceSummarizer<M> {
    pub fn new(model: M, reduce_max_chars: usize) -> Self {
        Self {
            model,
            reduce_max_chars: reduce_max_chars.max(1),
        }
    }

    async fn complete(&self, text: &str, api_key: &ApiKey, tokens: &mut usize) -> Result<String> {
        let Completion { text, tokens_used } = self
            .model
            .complete(&summary_prompt(text), api_key)
            .await
            .map_err(PipelineError::summarization)?;
        *tokens += tokens_used;
        Ok(text)
    }

    /// Re-summarize groups of partials until they fit in one reduce call
    async fn collapse(
        &self,
        mut partials: Vec<String>,
        api_key: &ApiKey,
        tokens: &mut usize,
    ) -> Result<Vec<String>> {
        let mut round = 0;

        while partials.len() > 1
            && joined_len(&partials) > self.reduce_max_chars
            && round < MAX_COLLAPSE_ROUNDS
        {
            round += 1;
            let groups = group_partials(&partials, self.reduce_max_chars);
            debug!(
                "Collapse round {}: {} partial summaries in {} groups",
                round,
                partials.len(),
                groups.len()
            );

            let mut collapsed = Vec::with_capacity(groups.len());
            for group in groups {
                collapsed.push(self.complete(&group, api_key, tokens).await?);
            }
            partials = collapsed;
        }

        Ok(partials)
    }
}

#[async_trait]
impl<M: CompletionModel> Summarizer for MapReduceSummarizer<M> {
    async fn summarize(&self, segments: &[Segment], api_key: &ApiKey) -> Result<SummaryOutcome> {
        if segments.is_empty() {
            return Err(PipelineError::NoValidSegments);
        }

        info!("Summarizing {} segments", segments.len());
        let mut tokens_used = 0;

        let mut partials = Vec::with_capacity(segments.len());
        for (i, segment) in segments.iter().enumerate() {
            debug!(
                "Map step {}/{} ({} chars)",
                i + 1,
                segments.len(),
                segment.char_len()
            );
            partials.push(self.complete(segment.as_str(), api_key, &mut tokens_used).await?);
        }

        let partials = self.collapse(partials, api_key, &mut tokens_used).await?;
        let summary = self
            .complete(&partials.join(PARTIAL_SEPARATOR), api_key, &mut tokens_used)
            .await?;

        info!(
            "Summary ready: {} chars, {} tokens used",
            summary.chars().count(),
            tokens_used
        );

        Ok(SummaryOutcome {
            summary,
            segments: segments.len(),
            tokens_used,
        })
    }
}

fn joined_len<S: AsRef<str>>(parts: &[S]) -> usize {
    let sep = PARTIAL_SEPARATOR.chars().count();
    parts.iter().map(|p| p.as_ref().chars().count()).sum::<usize>()
        + sep * parts.len().saturating_sub(1)
}

/// Group consecutive partials so each joined group fits in `max_chars`.
/// A partial longer than `max_chars` forms a group of its own.
fn group_partials(partials: &[String], max_chars: usize) -> Vec<String> {
    let mut groups = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for partial in partials {
        current.push(partial);
        if current.len() > 1 && joined_len(&current) > max_chars {
            current.pop();
            groups.push(current.join(PARTIAL_SEPARATOR));
            current = vec![partial.as_str()];
        }
    }

    if !current.is_empty() {
        groups.push(current.join(PARTIAL_SEPARATOR));
    }

    groups
}
