//! JSON Array Extraction
//!
//! Recovers the JSON payload from free-form model output. Models are told to
//! answer with bare JSON but routinely wrap it in prose, markdown fences, or
//! commentary.
//!
//! Strategy:
//! 1. Parse the whole content as JSON
//! 2. Otherwise parse the greedy span from the first `[` to the last `]`
//!
//! Malformed JSON is never repaired here. A bad array is a hard failure that
//! the orchestrator's retry handles.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use tracing::debug;

use crate::types::{ValidationError, ValidationErrorKind};

static ARRAY_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\[.*\]").expect("array span pattern is valid"));

static CODE_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```(?:json)?\s*(.*?)```").expect("code fence pattern is valid")
});

/// Extract a JSON value, preferring a direct parse, then the bracketed array span
pub fn extract_json_array(content: &str) -> Result<Value, ValidationError> {
    if let Ok(value) = serde_json::from_str::<Value>(content) {
        return Ok(value);
    }

    debug!("Direct JSON parse failed, searching for array span");

    let span = ARRAY_SPAN.find(content).ok_or_else(|| {
        ValidationError::new(
            ValidationErrorKind::NoJsonArray,
            "AI response contains no JSON array",
        )
    })?;

    serde_json::from_str::<Value>(span.as_str()).map_err(|_| {
        ValidationError::new(
            ValidationErrorKind::MalformedJson,
            "AI response contains malformed JSON",
        )
    })
}

/// Strip a markdown code fence if one is present, returning the inner text
///
/// Used for object-shaped answers (description scoring) where the array
/// span search does not apply.
pub fn strip_code_fence(content: &str) -> &str {
    CODE_FENCE
        .captures(content)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .unwrap_or(content)
        .trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direct_parse() {
        let value = extract_json_array(r#"[{"name": "Tile"}]"#).unwrap();
        assert_eq!(value[0]["name"], "Tile");
    }

    #[test]
    fn test_fenced_array_with_prose() {
        let content = "Here you go:\n```json\n[{\"name\": \"Granite\", \"qty\": 200}]\n```";
        let value = extract_json_array(content).unwrap();
        assert!(value.is_array());
        assert_eq!(value[0]["qty"], 200);
    }

    #[test]
    fn test_thinking_text_before_array() {
        let content = "Let me think about quantities first.\n\n[{\"a\": 1}, {\"a\": 2}]\nHope this helps.";
        let value = extract_json_array(content).unwrap();
        assert_eq!(value.as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_no_brackets() {
        let err = extract_json_array("I cannot help with that.").unwrap_err();
        assert_eq!(err.kind, ValidationErrorKind::NoJsonArray);
        assert_eq!(err.to_string(), "AI response contains no JSON array");
    }

    #[test]
    fn test_malformed_array_is_not_repaired() {
        let err = extract_json_array("Result: [{\"name\": \"Tile\",}]").unwrap_err();
        assert_eq!(err.kind, ValidationErrorKind::MalformedJson);
        assert_eq!(err.to_string(), "AI response contains malformed JSON");
    }

    #[test]
    fn test_greedy_span_covers_first_to_last_bracket() {
        // Two separate arrays in prose make the greedy span invalid JSON
        let err = extract_json_array("first [1, 2] then [3]").unwrap_err();
        assert_eq!(err.kind, ValidationErrorKind::MalformedJson);
    }

    #[test]
    fn test_direct_object_passes_through() {
        let value = extract_json_array(r#"{"items": []}"#).unwrap();
        assert!(value.is_object());
    }

    #[test]
    fn test_strip_code_fence() {
        assert_eq!(strip_code_fence("```json\n{\"score\": 7}\n```"), "{\"score\": 7}");
        assert_eq!(strip_code_fence("```\n{}\n```"), "{}");
        assert_eq!(strip_code_fence("  {\"score\": 3} "), "{\"score\": 3}");
    }
}
