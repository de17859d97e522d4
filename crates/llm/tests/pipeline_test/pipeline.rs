use std::sync::Arc;

use studybase_core::{upload_id, AllowedTypes, UploadSummary};
use studybase_ingest::{extract_text, segment_text, SegmentConfig};
use studybase_llm::{ClassifyOptions, Classifier, TemplatePrompts};

use crate::helpers::{study_document, KeywordProvider};

#[tokio::test]
async fn test_document_to_entries() {
    let doc = extract_text(study_document().as_bytes(), "biology-notes.txt").unwrap();
    let chunks = segment_text(&doc.full_text(), &SegmentConfig::default());
    // "Page 1" folds into the first paragraph; six chunks remain.
    assert_eq!(chunks.len(), 6, "{chunks:#?}");

    let provider = Arc::new(KeywordProvider::default());
    let classifier = Classifier::new(provider.clone(), Arc::new(TemplatePrompts::bundled())).with_options(
        ClassifyOptions {
            batch_size: 4,
            ..Default::default()
        },
    );
    let entries = classifier.classify_all(&chunks).await;

    assert_eq!(provider.calls(), 6);
    assert_eq!(entries.len(), chunks.len());
    for (chunk, entry) in chunks.iter().zip(&entries) {
        assert_eq!(entry.chunk_clean, chunk.clean);
    }

    let types: Vec<&str> = entries.iter().map(|e| e.entry_type.as_str()).collect();
    assert_eq!(
        types,
        vec!["concept", "quote", "procedure", "template", "unknown", "unknown"]
    );

    // Placeholder-only metadata is dropped, real metadata kept.
    assert!(entries[0].metadata.is_none());
    assert_eq!(entries[1].metadata.as_ref().unwrap()["author"], "Marcus Aurelius");
    assert!(entries[2].metadata.is_some());

    assert!(entries[3].is_template);
    assert!(entries[4].parse_error);
    assert!(entries[5].parse_error);
    assert!(entries[4].title.is_none() && entries[5].content.is_none());

    let summary = UploadSummary::from_entries(upload_id(), &doc.filename, chunks.len(), &entries);
    assert_eq!(summary.total_chunks, 6);
    assert_eq!(summary.persisted, 5);
    assert_eq!(summary.templates_dropped, 1);
    assert_eq!(summary.parse_errors, 2);
    assert_eq!(summary.by_type.get("unknown"), Some(&2));
}

#[tokio::test]
async fn test_restricted_taxonomy() {
    let chunks = segment_text(&study_document(), &SegmentConfig::default());
    let classifier = Classifier::new(
        Arc::new(KeywordProvider::default()),
        Arc::new(TemplatePrompts::bundled()),
    )
    .with_allowed_types(AllowedTypes::new(["concept"]));

    let entries = classifier.classify_all(&chunks).await;
    assert_eq!(entries[0].entry_type, "concept");
    assert_eq!(entries[1].entry_type, "unknown");
    assert!(!entries[1].parse_error);
}

#[tokio::test]
async fn test_noise_only_document_never_calls_the_model() {
    let chunks = segment_text("Page 1\n\nPage 2\n\n\n\nChapter 3", &SegmentConfig::default());
    assert!(chunks.is_empty());

    let provider = Arc::new(KeywordProvider::default());
    let classifier = Classifier::new(provider.clone(), Arc::new(TemplatePrompts::bundled()));
    assert!(classifier.classify_all(&chunks).await.is_empty());
    assert_eq!(provider.calls(), 0);
}
