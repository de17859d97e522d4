use std::path::{Path, PathBuf};

use thiserror::Error;

/// Placeholder in the user template that gets replaced with the chunk text.
pub const CHUNK_PLACEHOLDER: &str = "<<<chunk>>>";

const SYSTEM_FILE: &str = "classifier-system.md";
const USER_FILE: &str = "classifier-user.md";

const BUNDLED_SYSTEM: &str = include_str!("../../prompts/classifier-system.md");
const BUNDLED_USER: &str = include_str!("../../prompts/classifier-user.md");

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("failed to read prompt template at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("user prompt template must contain exactly one '<<<chunk>>>' placeholder, found {0}")]
    Placeholder(usize),
}

/// Supplies the instruction text for a classification call: the taxonomy,
/// tie-break and confidence rules (system) and the per-type schema with the
/// chunk merged in (user).
pub trait PromptProvider: Send + Sync {
    fn system_prompt(&self) -> &str;
    fn user_prompt(&self, chunk: &str) -> String;
}

/// Prompt pair backed by a system text and a user template.
#[derive(Debug, Clone)]
pub struct TemplatePrompts {
    system: String,
    user_template: String,
}

impl TemplatePrompts {
    pub fn new(system: impl Into<String>, user_template: impl Into<String>) -> Result<Self, PromptError> {
        let user_template = user_template.into();
        let count = user_template.matches(CHUNK_PLACEHOLDER).count();
        if count != 1 {
            return Err(PromptError::Placeholder(count));
        }
        Ok(Self {
            system: system.into(),
            user_template,
        })
    }

    /// The templates compiled into the binary.
    pub fn bundled() -> Self {
        Self {
            system: BUNDLED_SYSTEM.to_string(),
            user_template: BUNDLED_USER.to_string(),
        }
    }

    /// Load `classifier-system.md` and `classifier-user.md` from `dir`,
    /// failing eagerly with a clear message.
    pub fn from_dir(dir: &Path) -> Result<Self, PromptError> {
        let read = |name: &str| {
            let path = dir.join(name);
            std::fs::read_to_string(&path).map_err(|source| PromptError::Read { path, source })
        };
        Self::new(read(SYSTEM_FILE)?, read(USER_FILE)?)
    }
}

impl PromptProvider for TemplatePrompts {
    fn system_prompt(&self) -> &str {
        &self.system
    }

    fn user_prompt(&self, chunk: &str) -> String {
        self.user_template.replace(CHUNK_PLACEHOLDER, chunk)
    }
}
