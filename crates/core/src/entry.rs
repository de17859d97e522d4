use std::collections::BTreeMap;

use chrono::Utc;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::entry_type::UNKNOWN_TYPE;

/// Free-form metadata object attached to an entry.
pub type Metadata = Map<String, Value>;

/// A contiguous span of normalized text treated as one classification unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextChunk {
    /// Block text as it came out of the splitter (bullets, punctuation intact).
    pub raw: String,
    /// Normalized text sent to the classifier.
    pub clean: String,
    /// Character count of `clean`.
    pub char_len: usize,
}

impl TextChunk {
    pub fn new(raw: impl Into<String>, clean: impl Into<String>) -> Self {
        let clean = clean.into();
        Self {
            raw: raw.into(),
            char_len: clean.chars().count(),
            clean,
        }
    }
}

// ── Model output ────────────────────────────────────────────────────

/// Classification as returned by the language model, before validation.
///
/// Every field is optional: models drop keys, emit `null`, or put numbers
/// where strings belong. Wrong-typed scalars are treated as absent instead of
/// failing the whole object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedEntry {
    #[serde(rename = "type", default, deserialize_with = "lenient_string")]
    pub entry_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub content: Option<String>,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "lenient_object")]
    pub metadata: Option<Metadata>,
    #[serde(default, deserialize_with = "lenient_meta")]
    pub meta: Option<EntryMeta>,
}

/// The nested `meta` object of a model response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntryMeta {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub confidence: Option<f64>,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub detected_sections: Vec<String>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub is_template: Option<bool>,
}

fn lenient_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::String(s) => Some(s),
        _ => None,
    })
}

fn lenient_strings<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|v| match v {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    })
}

fn lenient_object<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Metadata>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Object(map) => Some(map),
        _ => None,
    })
}

fn lenient_meta<'de, D: Deserializer<'de>>(d: D) -> Result<Option<EntryMeta>, D::Error> {
    match Value::deserialize(d)? {
        v @ Value::Object(_) => Ok(serde_json::from_value(v).ok()),
        _ => Ok(None),
    }
}

fn lenient_f64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    Ok(Value::deserialize(d)?.as_f64())
}

fn lenient_bool<'de, D: Deserializer<'de>>(d: D) -> Result<Option<bool>, D::Error> {
    Ok(Value::deserialize(d)?.as_bool())
}

// ── Pipeline output ─────────────────────────────────────────────────

/// A validated entry, one per input chunk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedEntry {
    pub chunk_raw: String,
    pub chunk_clean: String,
    #[serde(rename = "type")]
    pub entry_type: String,
    pub title: Option<String>,
    pub content: Option<String>,
    pub tags: Vec<String>,
    pub metadata: Option<Metadata>,
    pub confidence: f32,
    pub is_template: bool,
    pub parse_error: bool,
}

impl ProcessedEntry {
    /// The canonical "classification failed" shape for `chunk`.
    pub fn fallback(chunk: &TextChunk) -> Self {
        Self {
            chunk_raw: chunk.raw.clone(),
            chunk_clean: chunk.clean.clone(),
            entry_type: UNKNOWN_TYPE.to_string(),
            title: None,
            content: None,
            tags: Vec::new(),
            metadata: None,
            confidence: 0.0,
            is_template: false,
            parse_error: true,
        }
    }
}

// ── Upload summary ──────────────────────────────────────────────────

/// Counts reported back to the caller once a run has been persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadSummary {
    pub upload_id: String,
    pub doc_name: String,
    pub total_chunks: usize,
    pub persisted: usize,
    pub templates_dropped: usize,
    pub parse_errors: usize,
    pub by_type: BTreeMap<String, usize>,
}

impl UploadSummary {
    /// Summarize a run. Template entries are counted as dropped and excluded
    /// from `persisted` and `by_type`.
    pub fn from_entries(
        upload_id: impl Into<String>,
        doc_name: impl Into<String>,
        total_chunks: usize,
        entries: &[ProcessedEntry],
    ) -> Self {
        let mut by_type = BTreeMap::new();
        let mut templates_dropped = 0;
        let mut parse_errors = 0;

        for entry in entries {
            if entry.parse_error {
                parse_errors += 1;
            }
            if entry.is_template {
                templates_dropped += 1;
                continue;
            }
            *by_type.entry(entry.entry_type.clone()).or_insert(0) += 1;
        }

        Self {
            upload_id: upload_id.into(),
            doc_name: doc_name.into(),
            total_chunks,
            persisted: entries.len() - templates_dropped,
            templates_dropped,
            parse_errors,
            by_type,
        }
    }
}

/// Generate an identifier for one upload run: `upl_<unix millis>_<random>`.
pub fn upload_id() -> String {
    let salt = Uuid::new_v4().as_u128() % 1_000_000_000;
    format!("upl_{}_{}", Utc::now().timestamp_millis(), salt)
}
