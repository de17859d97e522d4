use std::sync::LazyLock;

use regex::Regex;

use studybase_core::TextChunk;

use super::normalize::normalize;
use super::types::SegmentError;

/// Built-in structural headers: bare category labels and boilerplate intros.
pub const DEFAULT_HEADER_PATTERNS: &[&str] = &[
    r"(?i)^#?\s*(vocabulary|quotes|phrases|thought frameworks|expressions)",
    r"(?i)^example\s+notes",
    r"(?i)^this document is an example",
];

static DEFAULT_HEADERS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    DEFAULT_HEADER_PATTERNS
        .iter()
        .map(|p| Regex::new(p).unwrap())
        .collect()
});

/// Drops blocks that are too short or are pure document structure.
///
/// Deliberately conservative: only length and the injected header matchers
/// are consulted. Template-versus-content calls belong to the classifier.
#[derive(Debug, Clone)]
pub struct HeaderFilter {
    /// Minimum length of a kept chunk, in characters (default: 40).
    pub min_chunk_chars: usize,
    /// Ordered matchers tested against the first line of each block.
    pub patterns: Vec<Regex>,
}

impl Default for HeaderFilter {
    fn default() -> Self {
        Self {
            min_chunk_chars: 40,
            patterns: DEFAULT_HEADERS.clone(),
        }
    }
}

impl HeaderFilter {
    /// Compile user-supplied patterns, in order.
    pub fn from_patterns<S: AsRef<str>>(
        min_chunk_chars: usize,
        patterns: &[S],
    ) -> Result<Self, SegmentError> {
        let patterns = patterns
            .iter()
            .map(|p| {
                let p = p.as_ref();
                Regex::new(p).map_err(|source| SegmentError::InvalidPattern {
                    pattern: p.to_string(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            min_chunk_chars,
            patterns,
        })
    }

    pub fn is_header(&self, clean: &str) -> bool {
        self.patterns.iter().any(|re| re.is_match(clean))
    }

    /// Turn surviving blocks into chunks; `char_len` is measured after
    /// normalization.
    ///
    /// Leading header lines are stripped and the remainder is length-checked
    /// on its own; a block made only of headers is dropped.
    pub fn filter(&self, blocks: Vec<String>) -> Vec<TextChunk> {
        let mut chunks = Vec::with_capacity(blocks.len());
        for block in blocks {
            let Some(raw) = self.strip_headers(&block) else {
                tracing::trace!(len = block.chars().count(), "dropping structural header");
                continue;
            };
            let clean = normalize(raw);
            let len = clean.chars().count();
            if len < self.min_chunk_chars {
                tracing::trace!(len, "dropping short block");
                continue;
            }
            chunks.push(TextChunk {
                raw: raw.to_string(),
                clean,
                char_len: len,
            });
        }
        chunks
    }

    /// The block without its leading header lines, or `None` when nothing
    /// else is left.
    fn strip_headers<'a>(&self, block: &'a str) -> Option<&'a str> {
        let mut rest = block;
        loop {
            let (first, tail) = rest.split_once('\n').unwrap_or((rest, ""));
            if !self.is_header(&normalize(first)) {
                return Some(rest);
            }
            let tail = tail.trim_start_matches(['\r', '\n']);
            if tail.trim().is_empty() {
                return None;
            }
            tracing::debug!(header = first.trim(), "stripping header line");
            rest = tail;
        }
    }
}
