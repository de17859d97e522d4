use serde_json::Value;
use studybase_core::{AllowedTypes, ClassifiedEntry, Metadata, ProcessedEntry, TextChunk, UNKNOWN_TYPE};
use tracing::warn;

/// Turn a parsed model response into a validated [`ProcessedEntry`].
pub fn assemble(chunk: &TextChunk, entry: ClassifiedEntry, allowed: &AllowedTypes) -> ProcessedEntry {
    let entry_type = resolve_type(entry.entry_type.as_deref(), allowed);
    let meta = entry.meta.unwrap_or_default();

    ProcessedEntry {
        chunk_raw: chunk.raw.clone(),
        chunk_clean: chunk.clean.clone(),
        entry_type,
        title: non_blank(entry.title),
        content: non_blank(entry.content),
        tags: entry.tags,
        metadata: entry.metadata.filter(has_metadata),
        confidence: meta
            .confidence
            .filter(|c| c.is_finite())
            .map_or(0.0, |c| c.clamp(0.0, 1.0) as f32),
        is_template: meta.is_template.unwrap_or(false),
        parse_error: false,
    }
}

fn resolve_type(raw: Option<&str>, allowed: &AllowedTypes) -> String {
    let Some(raw) = raw.filter(|t| !t.trim().is_empty()) else {
        return UNKNOWN_TYPE.to_string();
    };
    match allowed.resolve(raw) {
        Some(label) => label.to_string(),
        None => {
            warn!(label = raw, "model returned a type outside the allowed set");
            UNKNOWN_TYPE.to_string()
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

/// True when at least one field holds a non-blank string or a non-empty array.
fn has_metadata(metadata: &Metadata) -> bool {
    metadata.values().any(|v| match v {
        Value::String(s) => !s.trim().is_empty(),
        Value::Array(items) => !items.is_empty(),
        _ => false,
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use studybase_core::EntryMeta;

    use super::*;

    fn chunk() -> TextChunk {
        TextChunk::new(
            "Mitochondria are the powerhouse of the cell.",
            "Mitochondria are the powerhouse of the cell.",
        )
    }

    fn metadata(v: Value) -> Option<Metadata> {
        match v {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    #[test]
    fn full_entry() {
        let entry = ClassifiedEntry {
            entry_type: Some("concept".into()),
            title: Some("Mitochondria".into()),
            content: Some("Organelle that produces ATP.".into()),
            tags: vec!["biology".into()],
            metadata: metadata(json!({ "term": "Mitochondria" })),
            meta: Some(EntryMeta {
                confidence: Some(0.95),
                detected_sections: Vec::new(),
                is_template: Some(false),
            }),
        };

        let e = assemble(&chunk(), entry, &AllowedTypes::default());
        assert_eq!(e.entry_type, "concept");
        assert_eq!(e.title.as_deref(), Some("Mitochondria"));
        assert!((e.confidence - 0.95).abs() < 1e-6);
        assert!(!e.is_template);
        assert!(!e.parse_error);
        assert_eq!(e.metadata.unwrap()["term"], "Mitochondria");
        assert_eq!(e.chunk_clean, chunk().clean);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let e = assemble(&chunk(), ClassifiedEntry::default(), &AllowedTypes::default());
        assert_eq!(e.entry_type, UNKNOWN_TYPE);
        assert!(e.title.is_none());
        assert!(e.content.is_none());
        assert!(e.tags.is_empty());
        assert!(e.metadata.is_none());
        assert_eq!(e.confidence, 0.0);
        assert!(!e.is_template);
        assert!(!e.parse_error);
    }

    #[test]
    fn type_outside_allowed_set_becomes_unknown() {
        let allowed = AllowedTypes::new(["concept", "quote"]);
        let entry = |t: &str| ClassifiedEntry {
            entry_type: Some(t.into()),
            ..Default::default()
        };

        assert_eq!(assemble(&chunk(), entry("Quote "), &allowed).entry_type, "quote");
        assert_eq!(assemble(&chunk(), entry("procedure"), &allowed).entry_type, UNKNOWN_TYPE);
        assert_eq!(assemble(&chunk(), entry("flashcard"), &allowed).entry_type, UNKNOWN_TYPE);
        assert_eq!(assemble(&chunk(), entry("  "), &allowed).entry_type, UNKNOWN_TYPE);
    }

    #[test]
    fn empty_title_and_content_are_absent() {
        let entry = ClassifiedEntry {
            entry_type: Some("note".into()),
            title: Some(String::new()),
            content: Some("   ".into()),
            ..Default::default()
        };
        let e = assemble(&chunk(), entry, &AllowedTypes::default());
        assert!(e.title.is_none());
        assert!(e.content.is_none());
    }

    #[test]
    fn placeholder_metadata_is_suppressed() {
        let entry = ClassifiedEntry {
            entry_type: Some("quote".into()),
            metadata: metadata(json!({ "author": "", "source": "  ", "themes": [], "year": null })),
            ..Default::default()
        };
        let e = assemble(&chunk(), entry, &AllowedTypes::default());
        assert!(e.metadata.is_none());
    }

    #[test]
    fn one_meaningful_field_keeps_whole_metadata() {
        let entry = ClassifiedEntry {
            entry_type: Some("quote".into()),
            metadata: metadata(json!({ "author": "", "themes": ["stoicism"] })),
            ..Default::default()
        };
        let metadata = assemble(&chunk(), entry, &AllowedTypes::default()).metadata.unwrap();
        assert_eq!(metadata.len(), 2);
        assert_eq!(metadata["author"], "");
    }

    #[test]
    fn numeric_only_metadata_is_suppressed() {
        let entry = ClassifiedEntry {
            metadata: metadata(json!({ "page": 12, "verified": true })),
            ..Default::default()
        };
        assert!(assemble(&chunk(), entry, &AllowedTypes::default()).metadata.is_none());
    }

    #[test]
    fn confidence_is_clamped() {
        let with_confidence = |c: f64| ClassifiedEntry {
            meta: Some(EntryMeta {
                confidence: Some(c),
                ..Default::default()
            }),
            ..Default::default()
        };
        let allowed = AllowedTypes::default();
        assert_eq!(assemble(&chunk(), with_confidence(1.7), &allowed).confidence, 1.0);
        assert_eq!(assemble(&chunk(), with_confidence(-0.2), &allowed).confidence, 0.0);
    }

    #[test]
    fn template_flag_is_copied() {
        let entry = ClassifiedEntry {
            entry_type: Some("template".into()),
            meta: Some(EntryMeta {
                is_template: Some(true),
                ..Default::default()
            }),
            ..Default::default()
        };
        let e = assemble(&chunk(), entry, &AllowedTypes::default());
        assert!(e.is_template);
        assert_eq!(e.entry_type, "template");
    }
}
