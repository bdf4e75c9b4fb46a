//! Text refinement and summarization collaborators.

pub mod api;
pub mod refiner;

pub use api::{ApiRefiner, ApiSummarizer, ChatClient};
pub use refiner::{MockRefiner, MockSummarizer, RefineCall, Refiner, Summarizer};
