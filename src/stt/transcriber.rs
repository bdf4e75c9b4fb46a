use crate::error::{Result, ScribaError};
use crate::pipeline::types::Segment;
use async_trait::async_trait;

/// Trait for speech-to-text transcription of one audio segment.
///
/// This trait allows swapping implementations (real API vs mock).
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe one segment to raw text.
    ///
    /// An empty string is a valid result: the service heard no speech.
    async fn transcribe(&self, segment: &Segment) -> Result<String>;

    /// Name of the backing service/model, for logging.
    fn name(&self) -> &str;
}

/// Mock transcriber for testing.
///
/// Responses are indexed by segment position; missing entries transcribe to
/// empty text (the "no speech" outcome).
#[derive(Debug, Clone, Default)]
pub struct MockTranscriber {
    responses: Vec<String>,
    fail_indices: Vec<usize>,
}

impl MockTranscriber {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the per-segment responses, in segment order.
    pub fn with_responses<I, S>(mut self, responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.responses = responses.into_iter().map(Into::into).collect();
        self
    }

    /// Make transcription fail for the segment at `index`.
    pub fn with_failure_on(mut self, index: usize) -> Self {
        self.fail_indices.push(index);
        self
    }
}

#[async_trait]
impl Transcriber for MockTranscriber {
    async fn transcribe(&self, segment: &Segment) -> Result<String> {
        if self.fail_indices.contains(&segment.index) {
            return Err(ScribaError::Transcription {
                message: format!("mock failure for segment {}", segment.index),
            });
        }
        Ok(self
            .responses
            .get(segment.index)
            .cloned()
            .unwrap_or_default())
    }

    fn name(&self) -> &str {
        "mock"
    }
}
