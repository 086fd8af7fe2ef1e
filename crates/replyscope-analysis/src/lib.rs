//! Reply analysis through a language model.
//!
//! Renders canonical comments into an instruction prompt, sends it to the
//! completion endpoint, and recovers a typed [`replyscope_core::AnalysisResult`]
//! from whatever text comes back.

pub mod completion;
pub mod error;
pub mod extract;
pub mod pipeline;
pub mod prompt;

pub use completion::CompletionClient;
pub use error::AnalysisError;
pub use extract::{extract_json, Extraction, ParseOutcome};
pub use pipeline::{analyze_comments, AnalysisSettings};
pub use prompt::{build_prompt, MAX_PROMPT_COMMENTS};
