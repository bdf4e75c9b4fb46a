//! Batch coordinator: the single stateful, sequencing component.
//!
//! Pulls segments in source order, transcribes each one, accumulates raw
//! text into fixed-size batches, and at every batch boundary refines the
//! batch, appends the result to the sink and recomputes the context digest
//! for the next batch. Everything runs on one logical thread of control;
//! external calls are awaited suspension points, so no segment's
//! transcription overlaps another batch's refinement.

use crate::error::Result;
use crate::pipeline::context::ContextExtractor;
use crate::pipeline::report::{ErrorReporter, LogReporter};
use crate::pipeline::sink::TranscriptSink;
use crate::pipeline::types::{ContextDigest, RawTranscript, RunReport, Segment};
use crate::refine::Refiner;
use crate::stt::Transcriber;

/// Configuration for the batch coordinator.
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// Segments per batch. The final batch may be smaller.
    pub batch_size: usize,
    /// Stop after this many segments. Used for cheap dry runs; already
    /// flushed batches are unaffected by the truncation.
    pub max_segments: Option<usize>,
    /// Verbosity level (0=silent progress, 1=per-segment progress).
    pub verbosity: u8,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            batch_size: crate::defaults::BATCH_SIZE,
            max_segments: None,
            verbosity: 0,
        }
    }
}

/// Raw text accumulated for the batch currently being filled.
///
/// `refine_input` is what the refiner will see (context prefix plus
/// transcripts); `raw_material` is transcripts only and feeds the next
/// context digest, so a refinement failure can never poison the digest.
#[derive(Debug, Default)]
struct BatchAccumulator {
    refine_input: String,
    raw_material: String,
    segments: usize,
}

impl BatchAccumulator {
    fn is_empty(&self) -> bool {
        self.segments == 0
    }

    fn len(&self) -> usize {
        self.segments
    }

    fn push_context(&mut self, digest: &ContextDigest) {
        self.refine_input.push_str(digest.as_str());
        self.refine_input.push_str("\n\n");
    }

    fn push(&mut self, transcript: &RawTranscript) {
        if !transcript.is_empty() {
            let text = transcript.text.trim();
            self.refine_input.push_str(text);
            self.refine_input.push_str("\n\n");
            self.raw_material.push_str(text);
            self.raw_material.push_str("\n\n");
        }
        self.segments += 1;
    }

    fn refine_input(&self) -> &str {
        self.refine_input.trim_end()
    }

    fn raw_material(&self) -> &str {
        self.raw_material.trim_end()
    }

    fn clear(&mut self) {
        self.refine_input.clear();
        self.raw_material.clear();
        self.segments = 0;
    }
}

/// Per-run pipeline state, owned by `run` for the run's lifetime.
#[derive(Debug, Default)]
struct PipelineState {
    batch: BatchAccumulator,
    context: ContextDigest,
}

/// Drives the transcribe → batch → refine → append loop.
pub struct BatchCoordinator {
    transcriber: Box<dyn Transcriber>,
    refiner: Box<dyn Refiner>,
    extractor: ContextExtractor,
    reporter: Box<dyn ErrorReporter>,
    config: CoordinatorConfig,
}

impl BatchCoordinator {
    pub fn new(
        transcriber: Box<dyn Transcriber>,
        refiner: Box<dyn Refiner>,
        extractor: ContextExtractor,
        config: CoordinatorConfig,
    ) -> Self {
        Self {
            transcriber,
            refiner,
            extractor,
            reporter: Box::new(LogReporter),
            config,
        }
    }

    /// Replace the default stderr reporter.
    pub fn with_reporter(mut self, reporter: Box<dyn ErrorReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Run the pipeline over `segments`, writing refined batches to `sink`.
    ///
    /// Per-unit transcription and per-batch refinement failures degrade to
    /// empty text and are counted in the report; a sink failure aborts the
    /// run immediately.
    pub async fn run(
        &self,
        segments: &[Segment],
        sink: &mut dyn TranscriptSink,
    ) -> Result<RunReport> {
        sink.reset()?;

        let segments = match self.config.max_segments {
            Some(limit) => &segments[..limit.min(segments.len())],
            None => segments,
        };

        let mut report = RunReport::default();
        let mut state = PipelineState::default();

        for segment in segments {
            if self.config.verbosity >= 1 {
                eprintln!(
                    "scriba: transcribing {} ({}/{})",
                    segment.file_name(),
                    segment.index + 1,
                    segments.len()
                );
            }

            let text = match self.transcriber.transcribe(segment).await {
                Ok(text) => text,
                Err(e) => {
                    self.reporter.report("transcribe", &e);
                    report.transcription_failures += 1;
                    String::new()
                }
            };
            let transcript = RawTranscript::new(segment.index, text);

            // The first segment of a batch carries the previous batch's
            // digest as a prefix so the refiner sees continuity.
            if state.batch.is_empty() && !state.context.is_empty() {
                state.batch.push_context(&state.context);
            }
            state.batch.push(&transcript);
            report.segments_processed += 1;

            if state.batch.len() == self.config.batch_size {
                self.flush(&mut state, sink, &mut report).await?;
            }
        }

        // Final partial batch
        if !state.batch.is_empty() {
            self.flush(&mut state, sink, &mut report).await?;
        }

        Ok(report)
    }

    /// Refine the accumulated batch, append it, and rotate the digest.
    ///
    /// Ordering is load-bearing: the digest for the next batch is computed
    /// from this batch's raw material only after its output has been
    /// appended, and the refiner always sees the digest produced by the
    /// previous flush.
    async fn flush(
        &self,
        state: &mut PipelineState,
        sink: &mut dyn TranscriptSink,
        report: &mut RunReport,
    ) -> Result<()> {
        if self.config.verbosity >= 1 {
            eprintln!(
                "scriba: refining batch {} ({} segments)",
                report.batches_flushed + 1,
                state.batch.len()
            );
        }

        let refined = match self
            .refiner
            .refine(state.batch.refine_input(), &state.context)
            .await
        {
            Ok(text) => text,
            Err(e) => {
                self.reporter.report("refine", &e);
                report.refinement_failures += 1;
                String::new()
            }
        };

        sink.append(&refined)?;

        state.context = match self.extractor.extract(state.batch.raw_material()).await {
            Ok(digest) => digest,
            Err(e) => {
                self.reporter.report("context", &e);
                report.context_failures += 1;
                ContextDigest::empty()
            }
        };

        state.batch.clear();
        report.batches_flushed += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScribaError;
    use crate::pipeline::sink::CollectorSink;
    use crate::refine::{MockRefiner, MockSummarizer};
    use crate::stt::MockTranscriber;
    use std::sync::{Arc, Mutex};

    /// Reporter that collects events for assertions.
    #[derive(Clone, Default)]
    struct CollectingReporter {
        events: Arc<Mutex<Vec<String>>>,
    }

    impl CollectingReporter {
        fn events(&self) -> Vec<String> {
            self.events.lock().unwrap().clone()
        }
    }

    impl ErrorReporter for CollectingReporter {
        fn report(&self, stage: &str, error: &ScribaError) {
            self.events
                .lock()
                .unwrap()
                .push(format!("{}: {}", stage, error));
        }
    }

    /// Sink whose appends always fail, to verify fatal propagation.
    struct FailingSink;

    impl TranscriptSink for FailingSink {
        fn reset(&mut self) -> Result<()> {
            Ok(())
        }

        fn append(&mut self, _text: &str) -> Result<()> {
            Err(ScribaError::Io(std::io::Error::other("disk full")))
        }
    }

    fn segments(count: usize) -> Vec<Segment> {
        (0..count)
            .map(|i| Segment::new(i, format!("segment_{:03}.mp3", i)))
            .collect()
    }

    fn sentence_responses(count: usize) -> Vec<String> {
        (0..count).map(|i| format!("Sentence {}.", i)).collect()
    }

    fn coordinator(
        transcriber: MockTranscriber,
        refiner: MockRefiner,
        batch_size: usize,
    ) -> BatchCoordinator {
        BatchCoordinator::new(
            Box::new(transcriber),
            Box::new(refiner),
            ContextExtractor::trailing(1),
            CoordinatorConfig {
                batch_size,
                max_segments: None,
                verbosity: 0,
            },
        )
    }

    #[tokio::test]
    async fn test_seven_segments_batch_three_yields_three_batches() {
        let transcriber = MockTranscriber::new().with_responses(sentence_responses(7));
        let refiner = MockRefiner::new();
        let coordinator = coordinator(transcriber, refiner.clone(), 3);

        let mut sink = CollectorSink::new();
        let report = coordinator.run(&segments(7), &mut sink).await.unwrap();

        assert_eq!(report.segments_processed, 7);
        assert_eq!(report.batches_flushed, 3);
        assert!(report.is_clean());
        assert_eq!(sink.paragraphs().len(), 3);
        assert_eq!(sink.resets(), 1);

        // Batch sizes 3, 3, 1 — checked through the refiner's inputs.
        let calls = refiner.calls();
        assert_eq!(calls.len(), 3);
        assert!(calls[0].batch_text.contains("Sentence 0."));
        assert!(calls[0].batch_text.contains("Sentence 2."));
        assert!(!calls[0].batch_text.contains("Sentence 3."));
        assert!(calls[2].batch_text.contains("Sentence 6."));
        assert!(!calls[2].batch_text.contains("Sentence 5."));
    }

    #[tokio::test]
    async fn test_batch_count_is_ceil_of_segments_over_batch_size() {
        for (count, batch_size, expected) in [(6, 3, 2), (1, 3, 1), (3, 1, 3), (5, 2, 3)] {
            let transcriber = MockTranscriber::new().with_responses(sentence_responses(count));
            let coordinator = coordinator(transcriber, MockRefiner::new(), batch_size);

            let mut sink = CollectorSink::new();
            let report = coordinator.run(&segments(count), &mut sink).await.unwrap();
            assert_eq!(report.batches_flushed, expected, "count={count} B={batch_size}");
            assert_eq!(sink.paragraphs().len(), expected);
        }
    }

    #[tokio::test]
    async fn test_empty_input_flushes_nothing_but_resets_sink() {
        let coordinator = coordinator(MockTranscriber::new(), MockRefiner::new(), 3);

        let mut sink = CollectorSink::new();
        let report = coordinator.run(&[], &mut sink).await.unwrap();

        assert_eq!(report, RunReport::default());
        assert!(sink.paragraphs().is_empty());
        assert_eq!(sink.resets(), 1);
    }

    #[tokio::test]
    async fn test_refiner_receives_prior_batch_trailing_sentence_as_context() {
        let transcriber = MockTranscriber::new().with_responses(sentence_responses(7));
        let refiner = MockRefiner::new();
        let coordinator = coordinator(transcriber, refiner.clone(), 3);

        let mut sink = CollectorSink::new();
        coordinator.run(&segments(7), &mut sink).await.unwrap();

        let calls = refiner.calls();
        assert_eq!(calls[0].context, "");
        // Digest is the last sentence of the previous batch's raw material.
        assert_eq!(calls[1].context, "Sentence 2.");
        assert_eq!(calls[2].context, "Sentence 5.");
    }

    #[tokio::test]
    async fn test_context_prefix_precedes_batch_text() {
        let transcriber = MockTranscriber::new().with_responses(sentence_responses(4));
        let refiner = MockRefiner::new();
        let coordinator = coordinator(transcriber, refiner.clone(), 2);

        let mut sink = CollectorSink::new();
        coordinator.run(&segments(4), &mut sink).await.unwrap();

        let calls = refiner.calls();
        // First batch has no prefix.
        assert!(calls[0].batch_text.starts_with("Sentence 0."));
        // Second batch starts with the carried digest, then its own text.
        assert!(calls[1].batch_text.starts_with("Sentence 1."));
        assert!(calls[1].batch_text.contains("Sentence 2."));
    }

    #[tokio::test]
    async fn test_transcriber_failure_degrades_to_empty_text() {
        let transcriber = MockTranscriber::new()
            .with_responses(sentence_responses(5))
            .with_failure_on(2);
        let refiner = MockRefiner::new();
        let reporter = CollectingReporter::default();
        let coordinator = coordinator(transcriber, refiner.clone(), 3)
            .with_reporter(Box::new(reporter.clone()));

        let mut sink = CollectorSink::new();
        let report = coordinator.run(&segments(5), &mut sink).await.unwrap();

        assert_eq!(report.segments_processed, 5);
        assert_eq!(report.transcription_failures, 1);
        // Batching is unaffected in count: ceil(5/3) = 2.
        assert_eq!(report.batches_flushed, 2);

        // Output derives from segments {0,1,3,4}; segment 2 contributed nothing.
        let all_output = sink.paragraphs().join("\n");
        for present in [0, 1, 3, 4] {
            assert!(all_output.contains(&format!("Sentence {}.", present)));
        }
        assert!(!all_output.contains("Sentence 2."));

        let events = reporter.events();
        assert_eq!(events.len(), 1);
        assert!(events[0].starts_with("transcribe:"));
    }

    #[tokio::test]
    async fn test_refiner_failure_appends_empty_paragraph_and_continues() {
        let transcriber = MockTranscriber::new().with_responses(sentence_responses(6));
        let refiner = MockRefiner::new().with_failure_on_call(0);
        let reporter = CollectingReporter::default();
        let coordinator = coordinator(transcriber, refiner.clone(), 3)
            .with_reporter(Box::new(reporter.clone()));

        let mut sink = CollectorSink::new();
        let report = coordinator.run(&segments(6), &mut sink).await.unwrap();

        assert_eq!(report.batches_flushed, 2);
        assert_eq!(report.refinement_failures, 1);
        assert_eq!(sink.paragraphs().len(), 2);
        assert_eq!(sink.paragraphs()[0], "");
        assert!(sink.paragraphs()[1].contains("Sentence 5."));

        // The failed refinement must not poison the digest: batch 2 still
        // receives the trailing sentence of batch 1's raw material.
        let calls = refiner.calls();
        assert_eq!(calls[1].context, "Sentence 2.");
    }

    #[tokio::test]
    async fn test_sink_failure_aborts_the_run() {
        let transcriber = MockTranscriber::new().with_responses(sentence_responses(3));
        let coordinator = coordinator(transcriber, MockRefiner::new(), 3);

        let mut sink = FailingSink;
        let result = coordinator.run(&segments(3), &mut sink).await;
        assert!(matches!(result, Err(ScribaError::Io(_))));
    }

    #[tokio::test]
    async fn test_max_segments_truncates_early() {
        let transcriber = MockTranscriber::new().with_responses(sentence_responses(10));
        let refiner = MockRefiner::new();
        let coordinator = BatchCoordinator::new(
            Box::new(transcriber),
            Box::new(refiner.clone()),
            ContextExtractor::trailing(1),
            CoordinatorConfig {
                batch_size: 3,
                max_segments: Some(4),
                verbosity: 0,
            },
        );

        let mut sink = CollectorSink::new();
        let report = coordinator.run(&segments(10), &mut sink).await.unwrap();

        assert_eq!(report.segments_processed, 4);
        assert_eq!(report.batches_flushed, 2);
        let calls = refiner.calls();
        assert!(calls[1].batch_text.contains("Sentence 3."));
        assert!(!calls[1].batch_text.contains("Sentence 4."));
    }

    #[tokio::test]
    async fn test_max_segments_beyond_input_is_harmless() {
        let transcriber = MockTranscriber::new().with_responses(sentence_responses(2));
        let coordinator = BatchCoordinator::new(
            Box::new(transcriber),
            Box::new(MockRefiner::new()),
            ContextExtractor::trailing(1),
            CoordinatorConfig {
                batch_size: 3,
                max_segments: Some(100),
                verbosity: 0,
            },
        );

        let mut sink = CollectorSink::new();
        let report = coordinator.run(&segments(2), &mut sink).await.unwrap();
        assert_eq!(report.segments_processed, 2);
        assert_eq!(report.batches_flushed, 1);
    }

    #[tokio::test]
    async fn test_digest_unaffected_by_later_batches() {
        // Two runs that differ only in the final batch's material must feed
        // identical context into batch 2.
        let mut first = sentence_responses(7);
        let mut second = sentence_responses(7);
        second[6] = "Completely different ending.".to_string();

        let mut contexts = Vec::new();
        for responses in [std::mem::take(&mut first), std::mem::take(&mut second)] {
            let transcriber = MockTranscriber::new().with_responses(responses);
            let refiner = MockRefiner::new();
            let coordinator = coordinator(transcriber, refiner.clone(), 3);
            let mut sink = CollectorSink::new();
            coordinator.run(&segments(7), &mut sink).await.unwrap();
            contexts.push(refiner.calls()[1].context.clone());
        }
        assert_eq!(contexts[0], contexts[1]);
    }

    #[tokio::test]
    async fn test_all_empty_transcripts_produce_empty_digest() {
        // Service legitimately returns no text: not an error, digest empty.
        let transcriber = MockTranscriber::new();
        let refiner = MockRefiner::new();
        let coordinator = coordinator(transcriber, refiner.clone(), 2);

        let mut sink = CollectorSink::new();
        let report = coordinator.run(&segments(4), &mut sink).await.unwrap();

        assert!(report.is_clean());
        assert_eq!(report.batches_flushed, 2);
        let calls = refiner.calls();
        assert_eq!(calls[0].batch_text, "");
        assert_eq!(calls[1].context, "");
    }

    #[tokio::test]
    async fn test_summary_strategy_threads_summary_forward() {
        let transcriber = MockTranscriber::new().with_responses(sentence_responses(4));
        let refiner = MockRefiner::new();
        let coordinator = BatchCoordinator::new(
            Box::new(transcriber),
            Box::new(refiner.clone()),
            ContextExtractor::summary(Box::new(
                MockSummarizer::new().with_summary("key points so far"),
            )),
            CoordinatorConfig {
                batch_size: 2,
                max_segments: None,
                verbosity: 0,
            },
        );

        let mut sink = CollectorSink::new();
        coordinator.run(&segments(4), &mut sink).await.unwrap();

        let calls = refiner.calls();
        assert_eq!(calls[0].context, "");
        assert_eq!(calls[1].context, "key points so far");
        assert!(calls[1].batch_text.starts_with("key points so far"));
    }

    #[tokio::test]
    async fn test_summary_failure_resets_digest_to_empty() {
        let transcriber = MockTranscriber::new().with_responses(sentence_responses(4));
        let refiner = MockRefiner::new();
        let reporter = CollectingReporter::default();
        let coordinator = BatchCoordinator::new(
            Box::new(transcriber),
            Box::new(refiner.clone()),
            ContextExtractor::summary(Box::new(MockSummarizer::new().with_failure())),
            CoordinatorConfig {
                batch_size: 2,
                max_segments: None,
                verbosity: 0,
            },
        )
        .with_reporter(Box::new(reporter.clone()));

        let mut sink = CollectorSink::new();
        let report = coordinator.run(&segments(4), &mut sink).await.unwrap();

        assert_eq!(report.context_failures, 2);
        assert_eq!(report.batches_flushed, 2);
        // Digest reset to empty, never stale: batch 2 sees no context.
        assert_eq!(refiner.calls()[1].context, "");
        assert!(reporter.events().iter().all(|e| e.starts_with("context:")));
    }
}
