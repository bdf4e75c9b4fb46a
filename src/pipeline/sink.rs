//! Output sinks for refined transcript text.
//!
//! A sink is reset once at run start and receives one append per flushed
//! batch, in batch order. Append failures are fatal to the run: downstream
//! consumers rely on the file reflecting true batch order, so a partial
//! write must never be silently swallowed.

use crate::error::Result;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Separator written after each paragraph so batches read as paragraphs.
const PARAGRAPH_SEPARATOR: &str = "\n\n";

/// Pluggable output handler for refined batches.
pub trait TranscriptSink: Send {
    /// Truncate any prior output. Called once at run start.
    fn reset(&mut self) -> Result<()>;

    /// Append one batch's refined text plus a paragraph separator.
    fn append(&mut self, text: &str) -> Result<()>;

    /// Name for logging/debugging.
    fn name(&self) -> &'static str {
        "sink"
    }
}

/// Append-only file sink producing the final transcript.
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TranscriptSink for FileSink {
    fn reset(&mut self) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, "")?;
        Ok(())
    }

    fn append(&mut self, text: &str) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(text.as_bytes())?;
        file.write_all(PARAGRAPH_SEPARATOR.as_bytes())?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "file"
    }
}

/// Collects refined paragraphs in memory, for tests and library use.
#[derive(Debug, Default)]
pub struct CollectorSink {
    paragraphs: Vec<String>,
    resets: usize,
}

impl CollectorSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Paragraphs appended since the last reset, in order.
    pub fn paragraphs(&self) -> &[String] {
        &self.paragraphs
    }

    /// Number of times `reset` was called.
    pub fn resets(&self) -> usize {
        self.resets
    }
}

impl TranscriptSink for CollectorSink {
    fn reset(&mut self) -> Result<()> {
        self.paragraphs.clear();
        self.resets += 1;
        Ok(())
    }

    fn append(&mut self, text: &str) -> Result<()> {
        self.paragraphs.push(text.to_string());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "collector"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScribaError;
    use tempfile::TempDir;

    #[test]
    fn test_sink_is_object_safe() {
        let _sink: Box<dyn TranscriptSink> = Box::new(CollectorSink::new());
    }

    #[test]
    fn test_file_sink_reset_then_append() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("transcript.txt");

        // Pre-existing content from an earlier run
        fs::write(&path, "stale content from last run").unwrap();

        let mut sink = FileSink::new(&path);
        sink.reset().unwrap();
        sink.append("First paragraph.").unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "First paragraph.\n\n");
    }

    #[test]
    fn test_file_sink_reset_is_idempotent_over_prior_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("transcript.txt");

        for prior in ["", "short", "a much longer prior transcript body"] {
            fs::write(&path, prior).unwrap();
            let mut sink = FileSink::new(&path);
            sink.reset().unwrap();
            sink.append("X").unwrap();
            assert_eq!(fs::read_to_string(&path).unwrap(), "X\n\n");
        }
    }

    #[test]
    fn test_file_sink_appends_in_order() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("transcript.txt");

        let mut sink = FileSink::new(&path);
        sink.reset().unwrap();
        sink.append("one").unwrap();
        sink.append("two").unwrap();
        sink.append("three").unwrap();

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "one\n\ntwo\n\nthree\n\n"
        );
    }

    #[test]
    fn test_file_sink_creates_parent_directory_on_reset() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("out.txt");

        let mut sink = FileSink::new(&path);
        sink.reset().unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_file_sink_append_failure_is_an_error() {
        // Appending into a directory path must fail, not be swallowed.
        let dir = TempDir::new().unwrap();
        let mut sink = FileSink::new(dir.path());
        let result = sink.append("text");
        assert!(matches!(result, Err(ScribaError::Io(_))));
    }

    #[test]
    fn test_collector_sink_collects_in_order() {
        let mut sink = CollectorSink::new();
        sink.reset().unwrap();
        sink.append("a").unwrap();
        sink.append("b").unwrap();
        assert_eq!(sink.paragraphs(), &["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_collector_sink_reset_clears() {
        let mut sink = CollectorSink::new();
        sink.append("old").unwrap();
        sink.reset().unwrap();
        assert!(sink.paragraphs().is_empty());
        assert_eq!(sink.resets(), 1);
    }

    #[test]
    fn test_sink_names() {
        assert_eq!(FileSink::new("x").name(), "file");
        assert_eq!(CollectorSink::new().name(), "collector");
    }
}
