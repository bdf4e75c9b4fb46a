//! scriba - Batch transcription of long recordings with context carry-over
//!
//! Splits an audio file into fixed-duration segments, transcribes each one,
//! refines the raw text in batches, and threads a context digest from each
//! batch into the next so the output reads as one continuous transcript.

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod app;
pub mod audio;
pub mod cli;
pub mod config;
pub mod defaults;
pub mod error;
pub mod pipeline;
pub mod refine;
pub mod stt;

// Core traits (source → process → sink)
pub use audio::{AudioSplitter, CommandExecutor, SplitterConfig, SystemCommandExecutor};
pub use pipeline::sink::{CollectorSink, FileSink, TranscriptSink};
pub use refine::{MockRefiner, MockSummarizer, Refiner, Summarizer};
pub use stt::{MockTranscriber, Transcriber};

// Pipeline
pub use pipeline::{
    BatchCoordinator, ContextDigest, ContextExtractor, CoordinatorConfig, RunReport, Segment,
    segments_from_paths, trailing_sentences,
};

// Error handling
pub use error::{Result, ScribaError};

// Config
pub use config::{Config, ContextStrategy};

// Reporting (for advanced users)
pub use pipeline::report::{ErrorReporter, LogReporter, SilentReporter};

/// Build version string with optional git commit hash.
///
/// Returns `"0.3.1+abc1234"` when git hash is available, `"0.3.1"` otherwise.
pub fn version_string() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => format!("{}+{}", version, hash),
        _ => version.to_string(),
    }
}
