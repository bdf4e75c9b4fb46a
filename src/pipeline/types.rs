//! Data types for the batched transcription pipeline.

use std::path::{Path, PathBuf};

/// One fixed-duration slice of the source audio.
///
/// The index is derived from the segment's position in the split output and
/// is the segment's stable identity for the whole run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    /// 0-based position in the source file.
    pub index: usize,
    /// Path of the segment's audio file.
    pub path: PathBuf,
}

impl Segment {
    /// Creates a new segment.
    pub fn new(index: usize, path: impl Into<PathBuf>) -> Self {
        Self {
            index,
            path: path.into(),
        }
    }

    /// File name of the segment's audio, for upload and log messages.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| format!("segment_{:03}.mp3", self.index))
    }
}

/// Text produced for exactly one segment.
///
/// An empty text is a valid outcome: either the service heard nothing, or the
/// segment's transcription failed and was degraded to a placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTranscript {
    /// Index of the segment this text belongs to.
    pub segment_index: usize,
    /// The raw transcribed text, possibly empty.
    pub text: String,
}

impl RawTranscript {
    pub fn new(segment_index: usize, text: String) -> Self {
        Self {
            segment_index,
            text,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Bounded carry-forward text giving the refiner continuity across batches.
///
/// At most one digest is live at a time; the digest produced at the end of
/// batch *n* is the only context available to batch *n+1*.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ContextDigest(String);

impl ContextDigest {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// The empty digest, used at run start and after an extraction failure.
    pub fn empty() -> Self {
        Self(String::new())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

/// Outcome counters for one pipeline run.
///
/// Degraded failures are counted here rather than surfaced as errors; only
/// setup and sink failures abort a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Segments pulled from the source (after any `max_segments` truncation).
    pub segments_processed: usize,
    /// Batches refined and appended to the sink.
    pub batches_flushed: usize,
    /// Segments whose transcription degraded to empty text.
    pub transcription_failures: usize,
    /// Batches whose refinement degraded to an empty paragraph.
    pub refinement_failures: usize,
    /// Batch boundaries where the digest reset to empty after a failure.
    pub context_failures: usize,
}

impl RunReport {
    /// True when every external call in the run succeeded.
    pub fn is_clean(&self) -> bool {
        self.transcription_failures == 0
            && self.refinement_failures == 0
            && self.context_failures == 0
    }
}

/// Build a `Segment` list from ordered file paths, indexing by position.
pub fn segments_from_paths<I, P>(paths: I) -> Vec<Segment>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    paths
        .into_iter()
        .enumerate()
        .map(|(index, path)| Segment::new(index, path.as_ref().to_path_buf()))
        .collect()
}
