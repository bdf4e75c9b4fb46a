//! Transcription application entry point.
//!
//! Orchestrates the complete flow:
//! split → transcribe → refine → write

use crate::audio::{AudioSplitter, CommandExecutor, SplitterConfig, SystemCommandExecutor};
use crate::config::{Config, ContextStrategy};
use crate::error::{Result, ScribaError};
use crate::pipeline::{
    BatchCoordinator, ContextExtractor, CoordinatorConfig, FileSink, SilentReporter,
};
use crate::refine::{ApiRefiner, ApiSummarizer, ChatClient};
use crate::stt::ApiTranscriber;
use owo_colors::OwoColorize;
use std::path::PathBuf;

/// Run the transcribe command: split audio → transcribe → refine → write.
///
/// CLI overrides are applied on top of `config` before anything runs.
/// Returns an error only for setup failures (config, ffmpeg, API key) and
/// sink write failures; degraded per-unit failures are reported and counted.
#[allow(clippy::too_many_arguments)]
pub async fn run_transcribe_command(
    mut config: Config,
    audio: PathBuf,
    output: Option<PathBuf>,
    segment_duration: Option<u64>,
    batch_size: Option<usize>,
    language: Option<String>,
    model: Option<String>,
    context: Option<String>,
    context_sentences: Option<usize>,
    max_segments: Option<usize>,
    no_normalize: bool,
    quiet: bool,
    verbosity: u8,
) -> Result<()> {
    // Apply CLI overrides
    if let Some(path) = output {
        config.output.path = path;
    }
    if let Some(secs) = segment_duration {
        config.audio.segment_duration_secs = secs;
    }
    if let Some(size) = batch_size {
        config.pipeline.batch_size = size;
    }
    if let Some(lang) = language {
        config.stt.language = lang;
    }
    if let Some(m) = model {
        config.stt.model = m;
    }
    if let Some(strategy) = context {
        config.refine.context_strategy = strategy.parse()?;
    }
    if let Some(n) = context_sentences {
        config.refine.context_sentences = n;
    }
    if let Some(n) = max_segments {
        config.pipeline.max_segments = n;
    }
    if no_normalize {
        config.audio.normalize = false;
    }

    config.validate()?;
    let api_key = resolve_api_key(&config.api.key_env)?;

    if !quiet {
        eprintln!(
            "scriba: splitting {} into {}s segments",
            audio.display(),
            config.audio.segment_duration_secs
        );
    }

    let splitter = AudioSplitter::system(SplitterConfig {
        segment_duration_secs: config.audio.segment_duration_secs,
        normalize: config.audio.normalize,
        work_dir: config.audio.work_dir.clone(),
    });
    let segments = splitter.prepare(&audio)?;

    if !quiet {
        eprintln!("scriba: {} segments to transcribe", segments.len());
    }

    let transcriber = ApiTranscriber::new(&config.api.base, api_key.clone(), &config.stt)?;
    let refiner = ApiRefiner::new(
        ChatClient::new(&config.api.base, api_key.clone(), config.refine.model.clone())?,
        config.refine.instruction.clone(),
    );
    let extractor = match config.refine.context_strategy {
        ContextStrategy::Trailing => ContextExtractor::trailing(config.refine.context_sentences),
        ContextStrategy::Summary => ContextExtractor::summary(Box::new(ApiSummarizer::new(
            ChatClient::new(&config.api.base, api_key, config.refine.model.clone())?,
            config.refine.summary_instruction.clone(),
            config.refine.summary_max_tokens,
        ))),
    };

    let mut coordinator = BatchCoordinator::new(
        Box::new(transcriber),
        Box::new(refiner),
        extractor,
        CoordinatorConfig {
            batch_size: config.pipeline.batch_size,
            max_segments: config.max_segments(),
            verbosity,
        },
    );
    if quiet {
        coordinator = coordinator.with_reporter(Box::new(SilentReporter));
    }

    let mut sink = FileSink::new(config.output.path.clone());
    let report = coordinator.run(&segments, &mut sink).await?;

    if !quiet {
        eprintln!(
            "scriba: wrote {} paragraphs to {} ({} segments, {} transcription failures, {} refinement failures)",
            report.batches_flushed,
            config.output.path.display(),
            report.segments_processed,
            report.transcription_failures,
            report.refinement_failures,
        );
    }

    Ok(())
}

/// Check external dependencies and report what is missing.
///
/// Returns true when everything required to run is available.
pub fn run_check_command(config: &Config) -> bool {
    let mut ok = true;

    let executor = SystemCommandExecutor::new();
    match executor.execute("ffmpeg", &["-version"]) {
        Ok(output) => {
            let version = output.lines().next().unwrap_or("ffmpeg").trim();
            println!("{} {}", "ok".green(), version);
        }
        Err(e) => {
            println!("{} ffmpeg: {}", "missing".red(), e);
            println!("  Install: sudo apt install ffmpeg");
            ok = false;
        }
    }

    match std::env::var(&config.api.key_env) {
        Ok(key) if !key.trim().is_empty() => {
            println!("{} {} is set", "ok".green(), config.api.key_env);
        }
        _ => {
            println!("{} {} is not set", "missing".red(), config.api.key_env);
            println!("  Export your API key: export {}=sk-...", config.api.key_env);
            ok = false;
        }
    }

    ok
}

/// Read the API key from the configured environment variable.
fn resolve_api_key(var: &str) -> Result<String> {
    match std::env::var(var) {
        Ok(key) if !key.trim().is_empty() => Ok(key),
        _ => Err(ScribaError::ApiKeyMissing {
            var: var.to_string(),
        }),
    }
}
