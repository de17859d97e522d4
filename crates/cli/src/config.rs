use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use studybase_core::Config;
use tracing::debug;

/// Optional overrides read from `pipeline.toml`.
///
/// Priority: command-line flag > environment > this file > built-in default.
/// Only keys present in the file are applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineFile {
    #[serde(default)]
    pub llm: LlmSection,
    #[serde(default)]
    pub pipeline: PipelineSection,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LlmSection {
    pub provider: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub timeout_secs: Option<u32>,
    pub ollama_url: Option<String>,
    pub ollama_model: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineSection {
    pub batch_size: Option<usize>,
    pub min_chunk_chars: Option<usize>,
    pub merge_min_chars: Option<usize>,
    pub allowed_entry_types: Option<Vec<String>>,
    pub header_patterns: Option<Vec<String>>,
    pub prompt_dir: Option<PathBuf>,
}

impl PipelineFile {
    /// Return the default config directory path: ~/.config/studybase/
    pub fn default_config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("could not determine user config directory")?
            .join("studybase");
        Ok(config_dir)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        Ok(Self::default_config_dir()?.join("pipeline.toml"))
    }

    /// Load the given file, or the default path when `path` is `None`.
    ///
    /// A missing default file yields an empty overlay; a missing explicit
    /// file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (config_path, explicit) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => match Self::default_config_path() {
                Ok(p) => (p, false),
                Err(_) => return Ok(Self::default()),
            },
        };

        if !config_path.exists() {
            if explicit {
                bail!("config file not found: {}", config_path.display());
            }
            debug!(?config_path, "No pipeline config file, using environment only");
            return Ok(Self::default());
        }

        debug!(?config_path, "Loading pipeline config");
        let content = std::fs::read_to_string(&config_path)
            .with_context(|| format!("failed to read config: {}", config_path.display()))?;
        Self::parse(&content).with_context(|| format!("failed to parse config: {}", config_path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Fill `config` from the file wherever the matching environment
    /// variable was not set.
    pub fn apply(&self, config: &mut Config) {
        let p = config.profile.clone();
        let llm = &self.llm;
        let pipe = &self.pipeline;

        overlay(&p, "LLM_PROVIDER", &mut config.llm.provider, llm.provider.clone());
        overlay_parsed(&p, "LLM_TEMPERATURE", &mut config.llm.temperature, llm.temperature);
        overlay_parsed(&p, "LLM_MAX_TOKENS", &mut config.llm.max_tokens, llm.max_tokens);
        overlay_parsed(&p, "LLM_TIMEOUT_SECS", &mut config.llm.timeout_secs, llm.timeout_secs);
        overlay(&p, "OLLAMA_URL", &mut config.ollama.url, llm.ollama_url.clone());
        overlay(&p, "OLLAMA_MODEL", &mut config.ollama.model, llm.ollama_model.clone());

        overlay_parsed(&p, "CLASSIFY_BATCH_SIZE", &mut config.pipeline.batch_size, pipe.batch_size);
        overlay_parsed(&p, "MIN_CHUNK_CHARS", &mut config.pipeline.min_chunk_chars, pipe.min_chunk_chars);
        overlay_parsed(&p, "MERGE_MIN_CHARS", &mut config.pipeline.merge_min_chars, pipe.merge_min_chars);
        overlay(
            &p,
            "ALLOWED_ENTRY_TYPES",
            &mut config.pipeline.allowed_entry_types,
            pipe.allowed_entry_types.clone().map(Some),
        );
        overlay(
            &p,
            "HEADER_PATTERNS",
            &mut config.pipeline.header_patterns,
            pipe.header_patterns.clone().map(Some),
        );
        overlay(&p, "PROMPT_DIR", &mut config.pipeline.prompt_dir, pipe.prompt_dir.clone().map(Some));
    }
}

fn overlay<T>(profile: &str, key: &str, slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        if env_value(profile, key).is_none() {
            *slot = value;
        }
    }
}

/// Like [`overlay`], but an environment value that does not parse as `T`
/// fell back to the default and so does not outrank the file.
fn overlay_parsed<T: FromStr>(profile: &str, key: &str, slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        if !env_value(profile, key).is_some_and(|v| v.parse::<T>().is_ok()) {
            *slot = value;
        }
    }
}

/// The non-empty value `Config` would read for `key`: `{PROFILE}_{KEY}`
/// first, then `{KEY}`.
fn env_value(profile: &str, key: &str) -> Option<String> {
    let get = |k: &str| std::env::var(k).ok().filter(|v| !v.is_empty());
    if !profile.is_empty() {
        if let Some(v) = get(&format!("{profile}_{key}")) {
            return Some(v);
        }
    }
    get(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[llm]
temperature = 0.1
ollama_model = "studybase-test-model"

[pipeline]
batch_size = 8
allowed_entry_types = ["concept", "quote"]
header_patterns = ["^Page \\d+$"]
"#;

    #[test]
    fn parse_partial_file() {
        let file = PipelineFile::parse(SAMPLE).unwrap();
        assert_eq!(file.llm.temperature, Some(0.1));
        assert_eq!(file.pipeline.batch_size, Some(8));
        assert_eq!(file.pipeline.header_patterns.as_deref(), Some(&[r"^Page \d+$".to_string()][..]));
        assert!(file.pipeline.min_chunk_chars.is_none());
        assert!(file.llm.provider.is_none());
    }

    #[test]
    fn empty_file_is_empty_overlay() {
        assert_eq!(PipelineFile::parse("").unwrap(), PipelineFile::default());
    }

    #[test]
    fn unknown_types_are_rejected() {
        assert!(PipelineFile::parse("[pipeline]\nbatch_size = \"many\"").is_err());
    }

    #[test]
    fn apply_fills_unset_keys() {
        // The environment wins, so only assert for keys it leaves unset.
        let mut config = Config::for_profile("STUDYBASE_CLI_TEST");
        let before = config.clone();
        let mut file = PipelineFile::default();
        file.pipeline.allowed_entry_types = Some(vec!["note".into()]);
        file.pipeline.prompt_dir = Some(PathBuf::from("/tmp/prompts"));

        file.apply(&mut config);

        if env_value("STUDYBASE_CLI_TEST", "ALLOWED_ENTRY_TYPES").is_none() {
            assert_eq!(config.pipeline.allowed_entry_types, Some(vec!["note".to_string()]));
        }
        if env_value("STUDYBASE_CLI_TEST", "PROMPT_DIR").is_none() {
            assert_eq!(config.pipeline.prompt_dir, Some(PathBuf::from("/tmp/prompts")));
        }
        assert_eq!(config.pipeline.batch_size, before.pipeline.batch_size);
        assert_eq!(config.llm.provider, before.llm.provider);
    }

    #[test]
    fn set_env_blocks_overlay() {
        let mut slot = 1usize;
        // PATH is always set, so a value keyed on it never applies.
        overlay("", "PATH", &mut slot, Some(9));
        assert_eq!(slot, 1);
        overlay("", "STUDYBASE_SURELY_UNSET_KEY", &mut slot, Some(9));
        assert_eq!(slot, 9);
    }

    #[test]
    fn unparseable_env_does_not_block_overlay() {
        // Keys unique to this test, so no other test observes them.
        std::env::set_var("STUDYBASE_CLI_TEST_BAD_BATCH", "abc");
        std::env::set_var("STUDYBASE_CLI_TEST_GOOD_BATCH", "4");

        let mut slot = 25usize;
        overlay_parsed("", "STUDYBASE_CLI_TEST_BAD_BATCH", &mut slot, Some(8));
        assert_eq!(slot, 8);
        overlay_parsed("", "STUDYBASE_CLI_TEST_GOOD_BATCH", &mut slot, Some(16));
        assert_eq!(slot, 8);
    }

    #[test]
    fn profiled_env_is_checked_first() {
        // The profiled value shadows the plain one even when it is unusable.
        std::env::set_var("ALT_STUDYBASE_CLI_TEST_MERGE", "not-a-number");
        std::env::set_var("STUDYBASE_CLI_TEST_MERGE", "7");

        let mut slot = 120usize;
        overlay_parsed("ALT", "STUDYBASE_CLI_TEST_MERGE", &mut slot, Some(60));
        assert_eq!(slot, 60);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pipeline.toml");
        assert!(PipelineFile::load(Some(&path)).is_err());
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pipeline.toml");
        std::fs::write(&path, SAMPLE).unwrap();
        let file = PipelineFile::load(Some(&path)).unwrap();
        assert_eq!(file.pipeline.batch_size, Some(8));
    }
}
