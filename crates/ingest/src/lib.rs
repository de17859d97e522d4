//! Text ingestion for studybase: document text extraction and the
//! segmentation pipeline that turns raw text into classifiable chunks.

pub mod document;
pub mod segment;

pub use document::{extract_text, ExtractedDocument, ExtractionError};
pub use segment::{segment_text, HeaderFilter, SegmentConfig, SegmentError, SplitRules};
