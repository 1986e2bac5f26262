//! Normalization of heterogeneous generation-backend responses.
//!
//! A backend may answer with a mapping carrying `summary_text` or
//! `generated_text`, with a sequence whose first element is such a mapping
//! or a plain string, or with a bare string. Extraction follows that order
//! case by case and falls back to string coercion, so it never fails.

use serde_json::Value;

/// Extract the generated text from a raw backend response.
///
/// Priority: `summary_text`, then `generated_text`, then the first element
/// of a sequence (recursively), then string coercion of the raw value.
pub fn extract_generated_text(raw: &Value) -> String {
    match raw {
        Value::String(s) => s.clone(),
        Value::Object(map) => map
            .get("summary_text")
            .and_then(Value::as_str)
            .or_else(|| map.get("generated_text").and_then(Value::as_str))
            .map(str::to_owned)
            .unwrap_or_else(|| coerce(raw)),
        Value::Array(items) => match items.first() {
            Some(first) => extract_generated_text(first),
            None => coerce(raw),
        },
        other => coerce(other),
    }
}

fn coerce(raw: &Value) -> String {
    raw.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn bare_string() {
        assert_eq!(extract_generated_text(&json!("hello")), "hello");
    }

    #[test]
    fn mapping_with_summary_text() {
        let raw = json!({"summary_text": "a summary"});
        assert_eq!(extract_generated_text(&raw), "a summary");
    }

    #[test]
    fn mapping_with_generated_text() {
        let raw = json!({"generated_text": "generated output"});
        assert_eq!(extract_generated_text(&raw), "generated output");
    }

    #[test]
    fn summary_text_wins_over_generated_text() {
        let raw = json!({"generated_text": "second", "summary_text": "first"});
        assert_eq!(extract_generated_text(&raw), "first");
    }

    #[test]
    fn sequence_wrapping_mapping() {
        let raw = json!([{"summary_text": "wrapped"}]);
        assert_eq!(extract_generated_text(&raw), "wrapped");
    }

    #[test]
    fn sequence_wrapping_generated_text_mapping() {
        let raw = json!([{"generated_text": "wrapped gen"}]);
        assert_eq!(extract_generated_text(&raw), "wrapped gen");
    }

    #[test]
    fn sequence_wrapping_string() {
        let raw = json!(["plain element", "ignored"]);
        assert_eq!(extract_generated_text(&raw), "plain element");
    }

    #[test]
    fn mapping_without_known_keys_coerces() {
        let raw = json!({"text": "other key"});
        assert_eq!(extract_generated_text(&raw), r#"{"text":"other key"}"#);
    }

    #[test]
    fn non_string_summary_text_coerces_whole_value() {
        let raw = json!({"summary_text": 42});
        assert_eq!(extract_generated_text(&raw), r#"{"summary_text":42}"#);
    }

    #[test]
    fn number_coerces() {
        assert_eq!(extract_generated_text(&json!(42)), "42");
    }

    #[test]
    fn empty_sequence_coerces() {
        assert_eq!(extract_generated_text(&json!([])), "[]");
    }

    #[test]
    fn null_coerces() {
        assert_eq!(extract_generated_text(&json!(null)), "null");
    }
}
