//! Segmentation configuration and errors.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use studybase_core::config::PipelineConfig;

use super::filter::HeaderFilter;

#[derive(Debug, Error)]
pub enum SegmentError {
    #[error("invalid header pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

// ── Split rules ─────────────────────────────────────────────────────────────

/// Term definition: "Profundity — noun ..."
static TERM_DASH_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Z][a-z]+\s*—").unwrap());
/// Attributed quote: "\"The unexamined life...\" — Socrates"
static QUOTE_DASH_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"^"[^"]+"\s*—"#).unwrap());
/// Section header: a category word or a markdown heading mark.
static SECTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(Vocabulary|Quotes|Phrases|Thought Frameworks|#\s)").unwrap()
});

/// Heuristics for repairing a document that arrives as one oversized block.
#[derive(Debug, Clone)]
pub struct SplitRules {
    /// A lone block longer than this (in characters) is re-split by line.
    pub repair_threshold: usize,
    /// A trimmed line matching any of these starts a new block during repair.
    pub entry_starts: Vec<Regex>,
}

impl Default for SplitRules {
    fn default() -> Self {
        Self {
            repair_threshold: 500,
            entry_starts: vec![
                TERM_DASH_RE.clone(),
                QUOTE_DASH_RE.clone(),
                SECTION_RE.clone(),
            ],
        }
    }
}

impl SplitRules {
    pub(crate) fn starts_entry(&self, line: &str) -> bool {
        self.entry_starts.iter().any(|re| re.is_match(line))
    }
}

// ── Segment config ──────────────────────────────────────────────────────────

/// Everything `segment_text` needs, passed in rather than baked into the
/// pipeline.
#[derive(Debug, Clone)]
pub struct SegmentConfig {
    /// Blocks shorter than this are folded into a neighbour (default: 120).
    pub merge_min_chars: usize,
    pub split: SplitRules,
    pub filter: HeaderFilter,
}

impl Default for SegmentConfig {
    fn default() -> Self {
        Self {
            merge_min_chars: 120,
            split: SplitRules::default(),
            filter: HeaderFilter::default(),
        }
    }
}

impl SegmentConfig {
    /// Build from the env-driven pipeline config; custom header patterns
    /// replace the built-in set.
    pub fn from_pipeline(config: &PipelineConfig) -> Result<Self, SegmentError> {
        let filter = match &config.header_patterns {
            Some(patterns) => HeaderFilter::from_patterns(config.min_chunk_chars, patterns)?,
            None => HeaderFilter {
                min_chunk_chars: config.min_chunk_chars,
                ..HeaderFilter::default()
            },
        };
        Ok(Self {
            merge_min_chars: config.merge_min_chars,
            split: SplitRules::default(),
            filter,
        })
    }
}
