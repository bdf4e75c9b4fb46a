//! Error types for scriba.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScribaError {
    // Configuration errors
    #[error("Configuration file not found at {path}")]
    ConfigFileNotFound { path: String },

    #[error("Invalid configuration value for {key}: {message}")]
    ConfigInvalidValue { key: String, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    // Audio preparation errors (fatal: no segments to process)
    #[error("Audio tool not found: {tool}")]
    AudioToolNotFound { tool: String },

    #[error("{command} failed with status {status}: {stderr}")]
    CommandFailed {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("Audio split produced no segments in {dir}")]
    NoSegments { dir: String },

    // API collaborator errors (degraded per unit, never fatal)
    #[error("API key environment variable {var} is not set")]
    ApiKeyMissing { var: String },

    #[error("Transcription request failed: {message}")]
    Transcription { message: String },

    #[error("Refinement request failed: {message}")]
    Refinement { message: String },

    #[error("Summary request failed: {message}")]
    Summary { message: String },

    // General I/O errors (fatal when raised by the sink)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Generic error for cases not covered above
    #[error("{0}")]
    Other(String),
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, ScribaError>;
