use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

fn profiled_env_or(profile: &str, key: &str, default: &str) -> String {
    profiled_env_opt(profile, key).unwrap_or_else(|| default.to_string())
}

fn profiled_env_u32(profile: &str, key: &str, default: u32) -> u32 {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn profiled_env_usize(profile: &str, key: &str, default: usize) -> usize {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Split a list-valued env var on `sep`, dropping blank items.
fn split_list(raw: &str, sep: &str) -> Vec<String> {
    raw.split(sep)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    pub llm: LlmConfig,
    pub ollama: OllamaConfig,
    pub pipeline: PipelineConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `STUDYBASE_PROFILE` env var. When set (e.g. `PROD`),
    /// every key is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Self {
        let profile = env_or("STUDYBASE_PROFILE", "").to_uppercase();
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Self {
        let p = profile.to_uppercase();
        let p = p.as_str();
        Self {
            profile: p.to_string(),
            llm: LlmConfig::from_env_profiled(p),
            ollama: OllamaConfig::from_env_profiled(p),
            pipeline: PipelineConfig::from_env_profiled(p),
        }
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Print a redacted summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!("  llm:         provider={}, configured={}", self.llm.provider, self.llm.is_configured());
        tracing::info!("  ollama:      url={}, model={}", self.ollama.url, self.ollama.model);
        tracing::info!(
            "  pipeline:    batch_size={}, min_chunk_chars={}, merge_min_chars={}",
            self.pipeline.batch_size,
            self.pipeline.min_chunk_chars,
            self.pipeline.merge_min_chars
        );
    }

    /// Return a redacted view safe for printing (no secrets).
    pub fn redacted_summary(&self) -> serde_json::Value {
        serde_json::json!({
            "profile": self.profile_label(),
            "llm": {
                "provider": self.llm.provider,
                "configured": self.llm.is_configured(),
                "temperature": self.llm.temperature,
                "max_tokens": self.llm.max_tokens,
            },
            "ollama": { "url": self.ollama.url, "model": self.ollama.model },
            "pipeline": {
                "batch_size": self.pipeline.batch_size,
                "min_chunk_chars": self.pipeline.min_chunk_chars,
                "merge_min_chars": self.pipeline.merge_min_chars,
                "allowed_entry_types": self.pipeline.allowed_entry_types,
                "header_patterns": self.pipeline.header_patterns,
                "prompt_dir": self.pipeline.prompt_dir,
            },
        })
    }
}

// ── LLM (OpenAI / Anthropic / Gemini) ────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// "openai", "anthropic", "gemini", "ollama"
    pub provider: String,
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub openai_base_url: Option<String>,
    pub anthropic_api_key: Option<String>,
    pub anthropic_model: String,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Per-request HTTP timeout; 0 disables it.
    pub timeout_secs: u32,
}

impl LlmConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            provider: profiled_env_or(p, "LLM_PROVIDER", "openai"),
            openai_api_key: profiled_env_opt(p, "OPENAI_API_KEY"),
            openai_model: profiled_env_or(p, "OPENAI_MODEL", "gpt-4o"),
            openai_base_url: profiled_env_opt(p, "OPENAI_BASE_URL"),
            anthropic_api_key: profiled_env_opt(p, "ANTHROPIC_API_KEY"),
            anthropic_model: profiled_env_or(p, "ANTHROPIC_MODEL", "claude-sonnet-4-5-20250929"),
            gemini_api_key: profiled_env_opt(p, "GEMINI_API_KEY"),
            gemini_model: profiled_env_or(p, "GEMINI_MODEL", "gemini-2.0-flash"),
            temperature: profiled_env_or(p, "LLM_TEMPERATURE", "0.3")
                .parse()
                .unwrap_or(0.3),
            max_tokens: profiled_env_u32(p, "LLM_MAX_TOKENS", 1024),
            timeout_secs: profiled_env_u32(p, "LLM_TIMEOUT_SECS", 60),
        }
    }

    pub fn is_configured(&self) -> bool {
        match self.provider.as_str() {
            "openai" => self.openai_api_key.is_some(),
            "anthropic" | "claude" => self.anthropic_api_key.is_some(),
            "gemini" => self.gemini_api_key.is_some(),
            "ollama" => true,
            _ => false,
        }
    }
}

// ── Ollama (local models) ─────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    pub url: String,
    pub model: String,
}

impl OllamaConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            url: profiled_env_or(p, "OLLAMA_URL", "http://localhost:11434"),
            model: profiled_env_or(p, "OLLAMA_MODEL", "llama3.2"),
        }
    }
}

// ── Segmentation + classification pipeline ───────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Chunks classified concurrently per wave.
    pub batch_size: usize,
    /// Blocks shorter than this (in characters) are discarded.
    pub min_chunk_chars: usize,
    /// Blocks shorter than this are folded into a neighbour.
    pub merge_min_chars: usize,
    /// Overrides the built-in entry taxonomy when set.
    pub allowed_entry_types: Option<Vec<String>>,
    /// Overrides the built-in structural-header regexes when set.
    pub header_patterns: Option<Vec<String>>,
    /// Directory holding `classifier-system.md` / `classifier-user.md`.
    pub prompt_dir: Option<PathBuf>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            batch_size: 25,
            min_chunk_chars: 40,
            merge_min_chars: 120,
            allowed_entry_types: None,
            header_patterns: None,
            prompt_dir: None,
        }
    }
}

impl PipelineConfig {
    fn from_env_profiled(p: &str) -> Self {
        let defaults = Self::default();
        Self {
            batch_size: profiled_env_usize(p, "CLASSIFY_BATCH_SIZE", defaults.batch_size),
            min_chunk_chars: profiled_env_usize(p, "MIN_CHUNK_CHARS", defaults.min_chunk_chars),
            merge_min_chars: profiled_env_usize(p, "MERGE_MIN_CHARS", defaults.merge_min_chars),
            allowed_entry_types: profiled_env_opt(p, "ALLOWED_ENTRY_TYPES")
                .map(|v| split_list(&v, ","))
                .filter(|v| !v.is_empty()),
            header_patterns: profiled_env_opt(p, "HEADER_PATTERNS")
                .map(|v| split_list(&v, "||"))
                .filter(|v| !v.is_empty()),
            prompt_dir: profiled_env_opt(p, "PROMPT_DIR").map(PathBuf::from),
        }
    }
}
