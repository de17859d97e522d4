//! Segmentation of extracted document text into classifiable chunks.
//!
//! Pipeline: normalize → split into blocks → merge small blocks → drop short
//! blocks and structural headers. Every stage is pure and synchronous.

mod filter;
mod merge;
mod normalize;
mod split;
mod types;

pub use filter::{HeaderFilter, DEFAULT_HEADER_PATTERNS};
pub use merge::merge_small;
pub use normalize::normalize;
pub use split::split_blocks;
pub use types::{SegmentConfig, SegmentError, SplitRules};

use studybase_core::TextChunk;

/// Run the full segmentation pipeline over raw document text.
///
/// Empty or all-noise input yields an empty vector; whether that is an error
/// is up to the caller.
pub fn segment_text(text: &str, config: &SegmentConfig) -> Vec<TextChunk> {
    let cleaned = normalize(text);
    let blocks = split_blocks(&cleaned, &config.split);
    let split_count = blocks.len();
    let blocks = merge_small(blocks, config.merge_min_chars);
    let merged_count = blocks.len();
    let chunks = config.filter.filter(blocks);

    tracing::debug!(
        input_chars = cleaned.chars().count(),
        split = split_count,
        merged = merged_count,
        chunks = chunks.len(),
        "segmented text"
    );
    chunks
}
