//! Context extraction at batch boundaries.
//!
//! After each batch is refined, a bounded digest of its raw material is
//! computed and handed to the next batch so the refiner keeps continuity
//! across segment boundaries. Two strategies exist: a deterministic trailing
//! excerpt and an abstractive summary delegated to an external call.

use crate::error::Result;
use crate::pipeline::types::ContextDigest;
use crate::refine::Summarizer;

/// Characters that terminate a sentence.
const SENTENCE_TERMINATORS: [char; 3] = ['.', '!', '?'];

/// Extract the last `count` sentences of `material`.
///
/// Sentences are delimited by terminal punctuation (`.`, `!`, `?`), which is
/// kept with its sentence. Text after the final terminator is ignored, and
/// material with no terminator at all yields the empty string.
pub fn trailing_sentences(material: &str, count: usize) -> String {
    if count == 0 {
        return String::new();
    }

    let mut sentences: Vec<&str> = Vec::new();
    let mut start = 0;
    for (i, ch) in material.char_indices() {
        if SENTENCE_TERMINATORS.contains(&ch) {
            let end = i + ch.len_utf8();
            let sentence = material[start..end].trim();
            if !sentence.is_empty() {
                sentences.push(sentence);
            }
            start = end;
        }
    }

    if sentences.is_empty() {
        return String::new();
    }

    let take = count.min(sentences.len());
    sentences[sentences.len() - take..].join(" ")
}

/// Computes the digest carried from one batch to the next.
///
/// The digest is always derived from the current batch's raw material alone,
/// never from the full history, so memory stays bounded regardless of
/// recording length.
pub enum ContextExtractor {
    /// Deterministic excerpt of the last N sentences. No external call.
    Trailing { sentences: usize },
    /// Abstractive summary via an external completion call.
    Summary { summarizer: Box<dyn Summarizer> },
}

impl ContextExtractor {
    pub fn trailing(sentences: usize) -> Self {
        Self::Trailing { sentences }
    }

    pub fn summary(summarizer: Box<dyn Summarizer>) -> Self {
        Self::Summary { summarizer }
    }

    /// Compute the next live digest from one batch's raw material.
    ///
    /// The trailing strategy cannot fail. The summary strategy propagates its
    /// service error to the caller, which resets the digest to empty rather
    /// than letting a stale one survive.
    pub async fn extract(&self, material: &str) -> Result<ContextDigest> {
        match self {
            Self::Trailing { sentences } => {
                Ok(ContextDigest::new(trailing_sentences(material, *sentences)))
            }
            Self::Summary { summarizer } => {
                let summary = summarizer.summarize(material).await?;
                Ok(ContextDigest::new(summary.trim().to_string()))
            }
        }
    }

    /// Name for logging/diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Trailing { .. } => "trailing",
            Self::Summary { .. } => "summary",
        }
    }
}
