//! Splitting input text into bounded segments
//!
//! Text is cut on a separator (paragraph breaks by default), then consecutive
//! pieces are merged back together while they fit in `chunk_size` characters.
//! A piece that alone exceeds the limit is cut at fixed character offsets, so
//! no segment is ever longer than `chunk_size`.

use std::collections::VecDeque;
use tracing::debug;

use crate::core::config::ChunkingConfig;
use crate::core::errors::{PipelineError, Result};
use crate::core::models::Segment;

/// Splits text into segments for summarization
#[derive(Debug, Clone)]
pub struct TextSplitter {
    separator: String,
    chunk_size: usize,
    chunk_overlap: usize,
}

impl Default for TextSplitter {
    fn default() -> Self {
        let defaults = ChunkingConfig::default();
        Self {
            separator: defaults.separator,
            chunk_size: defaults.chunk_size,
            chunk_overlap: defaults.chunk_overlap,
        }
    }
}

impl TextSplitter {
    /// Create a splitter. An empty separator splits between every character.
    pub fn new(separator: impl Into<String>, chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(PipelineError::Config {
                message: "chunk_size must be greater than 0".to_string(),
            });
        }
        if chunk_overlap >= chunk_size {
            return Err(PipelineError::Config {
                message: format!(
                    "chunk_overlap ({}) must be smaller than chunk_size ({})",
                    chunk_overlap, chunk_size
                ),
            });
        }

        Ok(Self {
            separator: separator.into(),
            chunk_size,
            chunk_overlap,
        })
    }

    /// Create from configuration
    pub fn from_config(config: &ChunkingConfig) -> Result<Self> {
        Self::new(config.separator.clone(), config.chunk_size, config.chunk_overlap)
    }

    /// Split `text` into ordered, non-blank segments of at most `chunk_size` characters
    pub fn split(&self, text: &str) -> Result<Vec<Segment>> {
        if text.trim().is_empty() {
            return Err(PipelineError::InvalidInput);
        }

        let pieces = self.pieces(text);
        let merged = self.merge(pieces);
        let segments = validate_segments(merged)?;

        debug!(
            "Split {} chars into {} segments (chunk_size={}, overlap={})",
            text.chars().count(),
            segments.len(),
            self.chunk_size,
            self.chunk_overlap
        );

        Ok(segments)
    }

    /// Separator-delimited pieces, none longer than `chunk_size`
    fn pieces<'a>(&self, text: &'a str) -> Vec<&'a str> {
        let raw: Vec<&str> = if self.separator.is_empty() {
            char_windows(text, 1)
        } else {
            text.split(self.separator.as_str())
                .filter(|piece| !piece.is_empty())
                .collect()
        };

        raw.into_iter()
            .flat_map(|piece| {
                if piece.chars().count() > self.chunk_size {
                    char_windows(piece, self.chunk_size)
                } else {
                    vec![piece]
                }
            })
            .collect()
    }

    /// Greedily join pieces while they fit, keeping up to `chunk_overlap`
    /// characters of trailing pieces at the start of the next segment
    fn merge(&self, pieces: Vec<&str>) -> Vec<String> {
        let sep_len = self.separator.chars().count();

        let mut docs = Vec::new();
        let mut current: VecDeque<(&str, usize)> = VecDeque::new();
        let mut total = 0;

        for piece in pieces {
            let len = piece.chars().count();

            if total + len + joiner_len(&current, sep_len) > self.chunk_size && !current.is_empty() {
                self.push_doc(&current, &mut docs);

                while total > self.chunk_overlap
                    || (total > 0 && total + len + joiner_len(&current, sep_len) > self.chunk_size)
                {
                    let Some((_, first_len)) = current.pop_front() else {
                        break;
                    };
                    total -= first_len + joiner_len(&current, sep_len);
                }
            }

            total += len + joiner_len(&current, sep_len);
            current.push_back((piece, len));
        }

        if !current.is_empty() {
            self.push_doc(&current, &mut docs);
        }

        docs
    }

    fn push_doc(&self, current: &VecDeque<(&str, usize)>, docs: &mut Vec<String>) {
        let joined = current
            .iter()
            .map(|(piece, _)| *piece)
            .collect::<Vec<_>>()
            .join(&self.separator);
        let trimmed = joined.trim();
        if !trimmed.is_empty() {
            docs.push(trimmed.to_string());
        }
    }
}

/// Separator length added when appending to `current`
fn joiner_len<T>(current: &VecDeque<T>, sep_len: usize) -> usize {
    if current.is_empty() {
        0
    } else {
        sep_len
    }
}

/// Keep the non-blank pieces; fail if none are left
pub fn validate_segments<I>(pieces: I) -> Result<Vec<Segment>>
where
    I: IntoIterator,
    I::Item: Into<String>,
{
    let segments: Vec<Segment> = pieces.into_iter().filter_map(Segment::new).collect();

    if segments.is_empty() {
        return Err(PipelineError::NoValidSegments);
    }

    Ok(segments)
}

/// Cut `text` into consecutive windows of `width` characters; the last may be shorter.
/// Never splits inside a character. Empty text yields no windows.
pub fn char_windows(text: &str, width: usize) -> Vec<&str> {
    let width = width.max(1);
    let mut windows = Vec::new();
    let mut start = 0;
    let mut count = 0;

    for (idx, _) in text.char_indices() {
        if count == width {
            windows.push(&text[start..idx]);
            start = idx;
            count = 0;
        }
        count += 1;
    }

    if start < text.len() {
        windows.push(&text[start..]);
    }

    windows
}
