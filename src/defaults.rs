//! Default configuration constants for scriba.
//!
//! Shared between the config types and the CLI so defaults are defined once.

/// Default duration of one audio segment in seconds.
///
/// 20 seconds keeps each transcription request small enough that a single
/// service failure loses little material, while staying well above the
/// point where segments cut words mid-syllable too often to matter.
pub const SEGMENT_DURATION_SECS: u64 = 20;

/// Default number of segments refined together in one batch.
///
/// Three segments (~1 minute of audio) gives the refiner enough surrounding
/// text to fix transcription errors while keeping each request well inside
/// typical completion context windows.
pub const BATCH_SIZE: usize = 3;

/// Default number of trailing sentences carried into the next batch.
pub const CONTEXT_SENTENCES: usize = 2;

/// Default token cap for the abstractive summary digest.
pub const SUMMARY_MAX_TOKENS: u32 = 150;

/// Default base URL for the transcription and refinement APIs.
pub const API_BASE: &str = "https://api.openai.com/v1";

/// Environment variable read for the API key.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Default speech-to-text model name.
pub const STT_MODEL: &str = "whisper-1";

/// Default language code for transcription.
///
/// "auto" omits the language field and lets the service detect it.
/// Set a specific code (e.g., "en", "sv") to force a language.
pub const LANGUAGE: &str = "auto";

/// Default refinement model name.
pub const REFINE_MODEL: &str = "gpt-4o";

/// Default output transcript path.
pub const OUTPUT_FILE: &str = "transcript.txt";

/// Default working directory for normalized audio and segment files.
pub const WORK_DIR: &str = "segments";

/// Default instruction for the refinement call.
pub const REFINE_INSTRUCTION: &str = "You are an editor for raw speech-to-text output. \
Correct transcription errors, add punctuation and paragraph breaks, and keep the \
speaker's own wording. Reply with the cleaned text only.";

/// Default instruction for the abstractive summary digest.
pub const SUMMARY_INSTRUCTION: &str = "Summarize the following transcript section, \
focusing on key points and discarding unnecessary detail. Be concise.";

/// ffmpeg loudnorm filter applied by the normalization pre-pass.
pub const LOUDNORM_FILTER: &str = "loudnorm=I=-23:LRA=7:TP=-2.0";

/// Connect timeout for API requests in seconds.
pub const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Total request timeout for API requests in seconds.
///
/// Transcription uploads carry the audio payload, so this is generous.
pub const REQUEST_TIMEOUT_SECS: u64 = 120;
