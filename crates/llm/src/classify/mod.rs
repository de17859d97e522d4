//! Chunk classification: prompt construction, the model call, reading the
//! structured reply and validating it into a [`ProcessedEntry`].
//!
//! [`ProcessedEntry`]: studybase_core::ProcessedEntry

mod assemble;
mod orchestrator;
mod parser;
mod prompt;

pub use assemble::assemble;
pub use orchestrator::{Classifier, ClassifyError, ClassifyOptions};
pub use parser::{parse_model_output, ParseOutcome};
pub use prompt::{PromptError, PromptProvider, TemplatePrompts, CHUNK_PLACEHOLDER};
