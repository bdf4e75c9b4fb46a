use crate::defaults;
use crate::error::{Result, ScribaError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub audio: AudioConfig,
    pub stt: SttConfig,
    pub refine: RefineConfig,
    pub pipeline: PipelineConfig,
    pub output: OutputConfig,
}

/// Shared API endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the OpenAI-compatible API.
    pub base: String,
    /// Name of the environment variable holding the API key.
    pub key_env: String,
}

/// Audio preparation configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AudioConfig {
    pub segment_duration_secs: u64,
    pub normalize: bool,
    pub work_dir: PathBuf,
}

/// Speech-to-text configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SttConfig {
    pub model: String,
    pub language: String,
    /// Domain prompt passed to the transcription call (speaker names,
    /// vocabulary, filler words to ignore).
    pub prompt: String,
}

/// Refinement and context configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RefineConfig {
    pub model: String,
    pub instruction: String,
    pub context_strategy: ContextStrategy,
    /// Sentences carried forward by the trailing strategy.
    pub context_sentences: usize,
    /// Token cap for the summary strategy's digest.
    pub summary_max_tokens: u32,
    pub summary_instruction: String,
}

/// Context strategy enumeration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ContextStrategy {
    /// Deterministic trailing-sentence excerpt of the batch.
    Trailing,
    /// Abstractive summary via the completion API.
    Summary,
}

impl std::str::FromStr for ContextStrategy {
    type Err = ScribaError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "trailing" => Ok(Self::Trailing),
            "summary" => Ok(Self::Summary),
            other => Err(ScribaError::ConfigInvalidValue {
                key: "refine.context_strategy".to_string(),
                message: format!("expected 'trailing' or 'summary', got '{}'", other),
            }),
        }
    }
}

/// Batching configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PipelineConfig {
    /// Segments refined together in one batch.
    pub batch_size: usize,
    /// Stop after this many segments; 0 means unlimited.
    pub max_segments: usize,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    pub path: PathBuf,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base: defaults::API_BASE.to_string(),
            key_env: defaults::API_KEY_ENV.to_string(),
        }
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            segment_duration_secs: defaults::SEGMENT_DURATION_SECS,
            normalize: true,
            work_dir: PathBuf::from(defaults::WORK_DIR),
        }
    }
}

impl Default for SttConfig {
    fn default() -> Self {
        Self {
            model: defaults::STT_MODEL.to_string(),
            language: defaults::LANGUAGE.to_string(),
            prompt: String::new(),
        }
    }
}

impl Default for RefineConfig {
    fn default() -> Self {
        Self {
            model: defaults::REFINE_MODEL.to_string(),
            instruction: defaults::REFINE_INSTRUCTION.to_string(),
            context_strategy: ContextStrategy::Trailing,
            context_sentences: defaults::CONTEXT_SENTENCES,
            summary_max_tokens: defaults::SUMMARY_MAX_TOKENS,
            summary_instruction: defaults::SUMMARY_INSTRUCTION.to_string(),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            batch_size: defaults::BATCH_SIZE,
            max_segments: 0,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(defaults::OUTPUT_FILE),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Returns an error if the file is missing or contains invalid TOML.
    /// Missing fields use default values.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ScribaError::ConfigFileNotFound {
                    path: path.display().to_string(),
                }
            } else {
                ScribaError::Io(e)
            }
        })?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from a file or return defaults if it doesn't exist
    ///
    /// Only falls back to defaults when the file is missing; invalid TOML is
    /// still an error.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        match Self::load(path) {
            Ok(config) => Ok(config),
            Err(ScribaError::ConfigFileNotFound { .. }) => Ok(Self::default()),
            Err(e) => Err(e),
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - SCRIBA_API_BASE → api.base
    /// - SCRIBA_MODEL → stt.model
    /// - SCRIBA_LANGUAGE → stt.language
    /// - SCRIBA_REFINE_MODEL → refine.model
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(base) = std::env::var("SCRIBA_API_BASE")
            && !base.is_empty()
        {
            self.api.base = base;
        }

        if let Ok(model) = std::env::var("SCRIBA_MODEL")
            && !model.is_empty()
        {
            self.stt.model = model;
        }

        if let Ok(language) = std::env::var("SCRIBA_LANGUAGE")
            && !language.is_empty()
        {
            self.stt.language = language;
        }

        if let Ok(model) = std::env::var("SCRIBA_REFINE_MODEL")
            && !model.is_empty()
        {
            self.refine.model = model;
        }

        self
    }

    /// Check cross-field constraints the type system cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.pipeline.batch_size == 0 {
            return Err(ScribaError::ConfigInvalidValue {
                key: "pipeline.batch_size".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.audio.segment_duration_secs == 0 {
            return Err(ScribaError::ConfigInvalidValue {
                key: "audio.segment_duration_secs".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Optional max-segment count for the coordinator; 0 means unlimited.
    pub fn max_segments(&self) -> Option<usize> {
        if self.pipeline.max_segments == 0 {
            None
        } else {
            Some(self.pipeline.max_segments)
        }
    }

    /// Get the default configuration file path
    ///
    /// Returns ~/.config/scriba/config.toml on Linux
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("scriba")
            .join("config.toml")
    }
}
