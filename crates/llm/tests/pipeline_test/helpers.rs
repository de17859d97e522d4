use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::json;

use studybase_llm::{LlmError, LlmProvider, Message};

/// Picks a type from keywords in the chunk, the way a cooperative model
/// would. Chunks mentioning "UNREACHABLE" fail at the transport level and
/// chunks mentioning "RAMBLE" get a prose-only reply.
#[derive(Default)]
pub struct KeywordProvider {
    pub calls: AtomicUsize,
}

impl KeywordProvider {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LlmProvider for KeywordProvider {
    async fn complete(&self, messages: Vec<Message>, _: f32, _: u32) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let prompt = messages.last().map(|m| m.content.as_str()).unwrap_or_default();

        if prompt.contains("UNREACHABLE") {
            return Err(LlmError::ApiError {
                status: 503,
                body: "upstream unavailable".into(),
            });
        }
        if prompt.contains("RAMBLE") {
            return Ok("This passage is interesting but I would rather not label it.".into());
        }

        let (kind, metadata, is_template) = if prompt.contains("Fill in:") {
            ("template", json!({}), true)
        } else if prompt.contains("Marcus Aurelius") {
            ("quote", json!({ "author": "Marcus Aurelius", "source": "" }), false)
        } else if prompt.contains("Step 1") {
            ("procedure", json!({ "steps": ["wash", "rinse"] }), false)
        } else {
            ("concept", json!({ "term": "", "related": [] }), false)
        };

        let body = json!({
            "type": kind,
            "title": format!("{kind} entry"),
            "content": "summarised content",
            "tags": [kind],
            "metadata": metadata,
            "meta": { "confidence": 0.8, "detected_sections": [], "is_template": is_template }
        });
        // Fenced, the way chatty models reply.
        Ok(format!("```json\n{body}\n```"))
    }

    fn name(&self) -> &str {
        "keyword"
    }
}

/// A study document with one chunk per paragraph once segmented.
pub fn study_document() -> String {
    [
        "Page 1",
        "Mitochondria are membrane-bound organelles that generate most of the chemical energy needed to power the cell's biochemical reactions.",
        "\"You have power over your mind, not outside events. Realize this, and you will find strength.\" Marcus Aurelius, writing in his private journal.",
        "Step 1: wash the glassware with detergent. Step 2: rinse three times with distilled water. Step 3: dry it upside down on the rack.",
        "Fill in: Term ____________ Definition ____________ Example sentence ____________ Source ____________ Date reviewed ____________",
        "UNREACHABLE The Krebs cycle oxidises acetyl-CoA to carbon dioxide, producing NADH and FADH2 that feed the electron transport chain.",
        "RAMBLE Osmosis is the diffusion of water across a semi-permeable membrane from a region of low solute concentration to a high one.",
    ]
    .join("\n\n")
}
