use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use studybase_core::ClassifiedEntry;

static OPEN_FENCE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^```[A-Za-z0-9_-]*[ \t]*\n?").unwrap());
static CLOSE_FENCE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n?[ \t]*```\s*$").unwrap());

/// Result of reading one model completion.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome {
    Parsed(ClassifiedEntry),
    Failed { reason: String },
}

impl ParseOutcome {
    pub fn is_parsed(&self) -> bool {
        matches!(self, ParseOutcome::Parsed(_))
    }
}

/// Read a [`ClassifiedEntry`] out of raw completion text.
///
/// Two tiers: the whole (fence-stripped) text is parsed first; when that
/// fails, the span from the first `{` to the last `}` is tried. Anything that
/// does not decode to a JSON object is a failure. Never panics.
pub fn parse_model_output(raw: &str) -> ParseOutcome {
    let text = strip_fences(raw);
    if text.is_empty() {
        return ParseOutcome::Failed {
            reason: "empty response".to_string(),
        };
    }

    let direct_err = match decode_object(text) {
        Ok(entry) => return ParseOutcome::Parsed(entry),
        Err(e) => e,
    };

    match embedded_object(text) {
        Some(span) => match decode_object(span) {
            Ok(entry) => ParseOutcome::Parsed(entry),
            Err(e) => ParseOutcome::Failed {
                reason: format!("embedded object did not parse: {e}"),
            },
        },
        None => ParseOutcome::Failed {
            reason: format!("no JSON object found: {direct_err}"),
        },
    }
}

fn strip_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    if !trimmed.starts_with("```") {
        return trimmed;
    }
    let start = OPEN_FENCE_RE.find(trimmed).map_or(0, |m| m.end());
    let inner = &trimmed[start..];
    let end = CLOSE_FENCE_RE.find(inner).map_or(inner.len(), |m| m.start());
    inner[..end].trim()
}

fn embedded_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

fn decode_object(text: &str) -> Result<ClassifiedEntry, String> {
    match serde_json::from_str::<Value>(text) {
        Ok(v @ Value::Object(_)) => serde_json::from_value(v).map_err(|e| e.to_string()),
        Ok(other) => Err(format!("expected a JSON object, got {}", json_kind(&other))),
        Err(e) => Err(e.to_string()),
    }
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MITO: &str = r#"{"type":"concept","title":"Mitochondria","content":"Organelle that produces ATP.","tags":["biology"],"metadata":{"term":"Mitochondria"},"meta":{"confidence":0.95,"is_template":false}}"#;

    fn parsed(raw: &str) -> ClassifiedEntry {
        match parse_model_output(raw) {
            ParseOutcome::Parsed(e) => e,
            ParseOutcome::Failed { reason } => panic!("expected a parse, got failure: {reason}"),
        }
    }

    #[test]
    fn plain_json() {
        let e = parsed(MITO);
        assert_eq!(e.entry_type.as_deref(), Some("concept"));
        assert_eq!(e.title.as_deref(), Some("Mitochondria"));
        assert_eq!(e.tags, vec!["biology"]);
        let meta = e.meta.unwrap();
        assert_eq!(meta.confidence, Some(0.95));
        assert_eq!(meta.is_template, Some(false));
    }

    #[test]
    fn fenced_json_matches_unwrapped() {
        let fenced = format!("```json\n{MITO}\n```");
        assert_eq!(parsed(&fenced), parsed(MITO));

        let bare_fence = format!("```\n{MITO}\n```\n");
        assert_eq!(parsed(&bare_fence), parsed(MITO));
    }

    #[test]
    fn prose_around_object() {
        let raw = format!(
            "Sure! Here is the classification you asked for:\n{MITO}\nLet me know if you need anything else."
        );
        assert_eq!(parsed(&raw), parsed(MITO));
    }

    #[test]
    fn garbage_fails() {
        assert!(!parse_model_output("I could not classify this chunk.").is_parsed());
        assert!(!parse_model_output("").is_parsed());
        assert!(!parse_model_output("   \n ").is_parsed());
        assert!(!parse_model_output("{ this is not json }").is_parsed());
        assert!(!parse_model_output("} backwards {").is_parsed());
    }

    #[test]
    fn non_object_json_fails() {
        assert!(!parse_model_output("[1, 2, 3]").is_parsed());
        assert!(!parse_model_output("\"concept\"").is_parsed());
        assert!(!parse_model_output("null").is_parsed());
    }

    #[test]
    fn greedy_span_covers_nested_objects() {
        let raw = r#"Result: {"type":"note","metadata":{"source":{"page":3}}} done"#;
        let e = parsed(raw);
        assert_eq!(e.entry_type.as_deref(), Some("note"));
        assert!(e.metadata.unwrap().contains_key("source"));
    }

    #[test]
    fn two_objects_in_prose_fail() {
        let raw = r#"first {"type":"note"} and second {"type":"quote"}"#;
        assert!(!parse_model_output(raw).is_parsed());
    }
}
