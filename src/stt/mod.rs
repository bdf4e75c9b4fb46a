//! Speech-to-text collaborators.

pub mod api;
pub mod transcriber;

pub use api::ApiTranscriber;
pub use transcriber::{MockTranscriber, Transcriber};
