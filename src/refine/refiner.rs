use crate::error::{Result, ScribaError};
use crate::pipeline::types::ContextDigest;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// Trait for refining one batch of raw transcript text.
///
/// The batch text already carries the context digest as a prefix when one
/// is live; the digest is also passed separately so implementations can
/// fold it into their instruction.
#[async_trait]
pub trait Refiner: Send + Sync {
    /// Turn raw, error-prone transcript text into cleaned, formatted output.
    async fn refine(&self, batch_text: &str, context: &ContextDigest) -> Result<String>;

    /// Name of the backing service/model, for logging.
    fn name(&self) -> &str;
}

/// Trait for the abstractive context-digest strategy.
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Produce a bounded summary of one batch's raw material.
    async fn summarize(&self, material: &str) -> Result<String>;
}

/// One recorded call to `MockRefiner::refine`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefineCall {
    pub batch_text: String,
    pub context: String,
}

/// Mock refiner for testing.
///
/// Echoes the batch text back unchanged and records every call so tests can
/// assert on batch composition and context threading. Clones share the call
/// log.
#[derive(Clone, Default)]
pub struct MockRefiner {
    calls: Arc<Mutex<Vec<RefineCall>>>,
    fail_on_calls: Vec<usize>,
}

impl MockRefiner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the refinement fail on the given 0-based call ordinal.
    pub fn with_failure_on_call(mut self, call: usize) -> Self {
        self.fail_on_calls.push(call);
        self
    }

    /// All calls recorded so far, in order. Failed calls are included.
    pub fn calls(&self) -> Vec<RefineCall> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl Refiner for MockRefiner {
    async fn refine(&self, batch_text: &str, context: &ContextDigest) -> Result<String> {
        let mut calls = self.calls.lock().unwrap_or_else(|e| e.into_inner());
        let ordinal = calls.len();
        calls.push(RefineCall {
            batch_text: batch_text.to_string(),
            context: context.as_str().to_string(),
        });

        if self.fail_on_calls.contains(&ordinal) {
            return Err(ScribaError::Refinement {
                message: format!("mock failure for batch {}", ordinal),
            });
        }
        Ok(batch_text.to_string())
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// Mock summarizer for testing the abstractive context strategy.
#[derive(Debug, Clone)]
pub struct MockSummarizer {
    summary: String,
    should_fail: bool,
}

impl Default for MockSummarizer {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSummarizer {
    pub fn new() -> Self {
        Self {
            summary: "mock summary".to_string(),
            should_fail: false,
        }
    }

    pub fn with_summary(mut self, summary: &str) -> Self {
        self.summary = summary.to_string();
        self
    }

    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }
}

#[async_trait]
impl Summarizer for MockSummarizer {
    async fn summarize(&self, _material: &str) -> Result<String> {
        if self.should_fail {
            return Err(ScribaError::Summary {
                message: "mock summary failure".to_string(),
            });
        }
        Ok(self.summary.clone())
    }
}
