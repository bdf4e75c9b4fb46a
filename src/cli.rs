//! Command-line interface for scriba
//!
//! Provides argument parsing using clap derive macros.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// Batch transcription of long recordings with context carry-over
#[derive(Parser, Debug)]
#[command(
    name = "scriba",
    version,
    about = "Batch transcription of long recordings with context carry-over",
    args_conflicts_with_subcommands = true
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Audio file to transcribe
    #[arg(value_name = "AUDIO_FILE")]
    pub audio: Option<PathBuf>,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Suppress status output (quiet mode)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose output (-v: per-segment progress)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Output transcript file (default: transcript.txt)
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Segment duration (default: 20s). Examples: 30s, 1m
    #[arg(long, short = 'd', value_name = "DURATION", value_parser = parse_duration_secs)]
    pub segment_duration: Option<u64>,

    /// Segments per refinement batch (default: 3)
    #[arg(long, short = 'b', value_name = "N")]
    pub batch_size: Option<usize>,

    /// Language code for transcription (default: auto-detect). Examples: auto, en, sv
    #[arg(long, value_name = "LANG")]
    pub language: Option<String>,

    /// Speech-to-text model (default: whisper-1)
    #[arg(long, value_name = "MODEL")]
    pub model: Option<String>,

    /// Context carried between batches: trailing or summary
    #[arg(long, value_name = "STRATEGY")]
    pub context: Option<String>,

    /// Sentences carried forward by the trailing strategy
    #[arg(long, value_name = "N")]
    pub context_sentences: Option<usize>,

    /// Stop after N segments (cheap dry runs)
    #[arg(long, value_name = "N")]
    pub max_segments: Option<usize>,

    /// Skip the loudness-normalization pre-pass
    #[arg(long)]
    pub no_normalize: bool,
}

/// Parse a duration string into whole seconds.
///
/// Supports any duration format accepted by `humantime`: bare numbers
/// (seconds), single-unit (`30s`, `5m`), and compound (`1h30m`).
fn parse_duration_secs(s: &str) -> Result<u64, String> {
    let s = s.trim();
    // Bare number → seconds
    if let Ok(secs) = s.parse::<u64>() {
        return Ok(secs);
    }
    humantime::parse_duration(s)
        .map(|d| d.as_secs())
        .map_err(|e| e.to_string())
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check external dependencies (ffmpeg, API key)
    Check,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}
