use std::sync::Arc;
use std::time::Instant;

use futures::future::join_all;
use studybase_core::{AllowedTypes, Config, ProcessedEntry, TextChunk};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::assemble::assemble;
use super::parser::{parse_model_output, ParseOutcome};
use super::prompt::{PromptError, PromptProvider, TemplatePrompts};
use crate::provider::{LlmError, LlmProvider, Message};
use crate::providers::create_provider;

/// Errors raised while building a [`Classifier`]. Classification itself
/// never fails; per-chunk problems become fallback entries.
#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error(transparent)]
    Llm(#[from] LlmError),
    #[error(transparent)]
    Prompt(#[from] PromptError),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassifyOptions {
    /// Chunks sent concurrently per wave. Zero is treated as one.
    pub batch_size: usize,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for ClassifyOptions {
    fn default() -> Self {
        Self {
            batch_size: 25,
            temperature: 0.3,
            max_tokens: 1024,
        }
    }
}

/// Terminal state of one chunk's classification call.
enum ChunkOutcome {
    Parsed(ProcessedEntry),
    ParseFailed { reason: String },
    ServiceError(LlmError),
}

/// Sends chunks to the language model in fixed-size waves and validates
/// what comes back.
pub struct Classifier {
    provider: Arc<dyn LlmProvider>,
    prompts: Arc<dyn PromptProvider>,
    allowed: AllowedTypes,
    options: ClassifyOptions,
}

impl Classifier {
    pub fn new(provider: Arc<dyn LlmProvider>, prompts: Arc<dyn PromptProvider>) -> Self {
        Self {
            provider,
            prompts,
            allowed: AllowedTypes::default(),
            options: ClassifyOptions::default(),
        }
    }

    pub fn with_allowed_types(mut self, allowed: AllowedTypes) -> Self {
        self.allowed = allowed;
        self
    }

    pub fn with_options(mut self, options: ClassifyOptions) -> Self {
        self.options = options;
        self
    }

    /// Build the provider, prompts and allowed types from configuration.
    pub fn from_config(config: &Config) -> Result<Self, ClassifyError> {
        let provider = create_provider(&config.llm, &config.ollama)?;

        let prompts: Arc<dyn PromptProvider> = match &config.pipeline.prompt_dir {
            Some(dir) => Arc::new(TemplatePrompts::from_dir(dir)?),
            None => Arc::new(TemplatePrompts::bundled()),
        };

        let allowed = config
            .pipeline
            .allowed_entry_types
            .as_ref()
            .map(AllowedTypes::new)
            .unwrap_or_default();

        info!(
            provider = provider.name(),
            batch_size = config.pipeline.batch_size,
            allowed_types = allowed.len(),
            "classifier ready"
        );

        Ok(Self::new(provider, prompts)
            .with_allowed_types(allowed)
            .with_options(ClassifyOptions {
                batch_size: config.pipeline.batch_size,
                temperature: config.llm.temperature,
                max_tokens: config.llm.max_tokens,
            }))
    }

    pub fn options(&self) -> &ClassifyOptions {
        &self.options
    }

    pub fn allowed_types(&self) -> &AllowedTypes {
        &self.allowed
    }

    /// Classify a single chunk. Always returns an entry: service and parse
    /// failures produce [`ProcessedEntry::fallback`].
    pub async fn classify_chunk(&self, chunk: &TextChunk) -> ProcessedEntry {
        match self.call(chunk).await {
            ChunkOutcome::Parsed(entry) => {
                debug!(entry_type = %entry.entry_type, confidence = entry.confidence, "chunk classified");
                entry
            }
            ChunkOutcome::ParseFailed { reason } => {
                warn!(chars = chunk.char_len, reason = %reason, "model output did not parse");
                ProcessedEntry::fallback(chunk)
            }
            ChunkOutcome::ServiceError(e) => {
                warn!(chars = chunk.char_len, error = %e, "classification call failed");
                ProcessedEntry::fallback(chunk)
            }
        }
    }

    async fn call(&self, chunk: &TextChunk) -> ChunkOutcome {
        let messages = vec![
            Message::system(self.prompts.system_prompt()),
            Message::user(self.prompts.user_prompt(&chunk.clean)),
        ];

        let raw = match self
            .provider
            .complete(messages, self.options.temperature, self.options.max_tokens)
            .await
        {
            Ok(raw) => raw,
            Err(e) => return ChunkOutcome::ServiceError(e),
        };

        match parse_model_output(&raw) {
            ParseOutcome::Parsed(entry) => ChunkOutcome::Parsed(assemble(chunk, entry, &self.allowed)),
            ParseOutcome::Failed { reason } => ChunkOutcome::ParseFailed { reason },
        }
    }

    /// Classify every chunk, one wave of `batch_size` concurrent calls at a
    /// time. Output has the same length and order as `chunks`.
    pub async fn classify_all(&self, chunks: &[TextChunk]) -> Vec<ProcessedEntry> {
        let start = Instant::now();
        let batch_size = self.options.batch_size.max(1);
        let waves = chunks.len().div_ceil(batch_size);

        info!(
            provider = self.provider.name(),
            chunks = chunks.len(),
            batch_size,
            waves,
            "starting classification"
        );

        let mut results = Vec::with_capacity(chunks.len());
        for (wave, batch) in chunks.chunks(batch_size).enumerate() {
            let futures: Vec<_> = batch.iter().map(|chunk| self.classify_chunk(chunk)).collect();
            let entries = join_all(futures).await;

            let failed = entries.iter().filter(|e| e.parse_error).count();
            debug!(wave = wave + 1, waves, size = batch.len(), failed, "wave complete");
            results.extend(entries);
        }

        let failed = results.iter().filter(|e| e.parse_error).count();
        let elapsed_ms = start.elapsed().as_millis() as u64;
        info!(entries = results.len(), failed, elapsed_ms, "classification complete");

        results
    }
}
