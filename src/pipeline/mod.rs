//! The context-carrying batched transcription pipeline.
//!
//! A single sequential loop pulls segments in order, transcribes them,
//! groups raw transcripts into fixed-size batches and refines each batch
//! with the previous batch's context digest before appending to the sink.

pub mod context;
pub mod coordinator;
pub mod report;
pub mod sink;
pub mod types;

pub use context::{ContextExtractor, trailing_sentences};
pub use coordinator::{BatchCoordinator, CoordinatorConfig};
pub use report::{ErrorReporter, LogReporter, SilentReporter};
pub use sink::{CollectorSink, FileSink, TranscriptSink};
pub use types::{ContextDigest, RawTranscript, RunReport, Segment, segments_from_paths};
