pub mod classify;
pub mod provider;
pub mod providers;

pub use classify::{
    assemble, parse_model_output, ClassifyError, ClassifyOptions, Classifier, ParseOutcome,
    PromptError, PromptProvider, TemplatePrompts,
};
pub use provider::{LlmError, LlmProvider, Message, Role};
