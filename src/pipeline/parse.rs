//! Parse LLM responses into raw transaction records.
//!
//! The model is instructed to return a bare JSON object, but LLMs sometimes
//! wrap output in markdown code fences regardless. A cheap deterministic
//! fence-strip runs before JSON parsing so the prompt stays focused on what
//! to extract, not on formatting edge-cases.
//!
//! Records come out as untrusted [`serde_json::Value`]s — type checking is
//! the validator's job, not this module's. The only structural requirements
//! here: the response parses as a JSON object, and `transactions`, when
//! present, is an array. A missing `transactions` field is an empty result,
//! not an error.

use crate::error::StmtError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

/// How much of a malformed response is kept for diagnostics.
const EXCERPT_CHARS: usize = 500;

static RE_OUTER_FENCES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^```(?:json)?\s*\n?(.*?)\n?```\s*$").unwrap());

/// Parse one model response into its raw transaction records.
///
/// # Errors
/// [`StmtError::AiExtraction`] when the response is empty, is not valid
/// JSON, is not a JSON object, or has a non-array `transactions` field.
/// The error carries a truncated excerpt of the raw response.
pub fn parse_transactions(raw: &str) -> Result<Vec<Value>, StmtError> {
    let cleaned = strip_fences(raw);

    if cleaned.trim().is_empty() {
        return Err(StmtError::AiExtraction {
            detail: "model returned an empty response".into(),
            excerpt: excerpt(raw),
        });
    }

    let json: Value = serde_json::from_str(cleaned.trim()).map_err(|e| StmtError::AiExtraction {
        detail: format!("failed to parse model response as JSON: {e}"),
        excerpt: excerpt(raw),
    })?;

    let object = json.as_object().ok_or_else(|| StmtError::AiExtraction {
        detail: "model response is valid JSON but not an object".into(),
        excerpt: excerpt(raw),
    })?;

    match object.get("transactions") {
        None => Ok(Vec::new()),
        Some(Value::Array(records)) => Ok(records.clone()),
        Some(other) => Err(StmtError::AiExtraction {
            detail: format!(
                "expected 'transactions' to be an array, got {}",
                type_name(other)
            ),
            excerpt: excerpt(raw),
        }),
    }
}

/// Strip a single outer markdown fence, if present.
fn strip_fences(input: &str) -> &str {
    match RE_OUTER_FENCES.captures(input.trim()) {
        Some(caps) => caps.get(1).map_or(input, |m| m.as_str()),
        None => input,
    }
}

/// First ~500 characters of the raw response, respecting char boundaries.
fn excerpt(raw: &str) -> String {
    raw.chars().take(EXCERPT_CHARS).collect()
}

fn type_name(v: &Value) -> &'static str {
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

    #[test]
    fn parses_plain_json_object() {
        let raw = r#"{"transactions": [{"date": "2024-03-15", "amount": -450.0}]}"#;
        let records = parse_transactions(raw).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["date"], "2024-03-15");
    }

    #[test]
    fn parses_fenced_json() {
        let raw = "```json\n{\"transactions\": [{\"amount\": 1.0}]}\n```";
        let records = parse_transactions(raw).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn parses_fence_without_language_tag() {
        let raw = "```\n{\"transactions\": []}\n```";
        assert!(parse_transactions(raw).unwrap().is_empty());
    }

    #[test]
    fn missing_transactions_field_is_empty_not_an_error() {
        let records = parse_transactions(r#"{"note": "nothing found"}"#).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn non_json_response_fails_with_excerpt() {
        let raw = "Sorry, I cannot process this.";
        match parse_transactions(raw) {
            Err(StmtError::AiExtraction { excerpt, .. }) => {
                assert_eq!(excerpt, raw);
            }
            other => panic!("expected AiExtraction, got {other:?}"),
        }
    }

    #[test]
    fn non_object_response_fails() {
        assert!(matches!(
            parse_transactions("[1, 2, 3]"),
            Err(StmtError::AiExtraction { .. })
        ));
    }

    #[test]
    fn non_array_transactions_field_fails() {
        let raw = r#"{"transactions": "none"}"#;
        match parse_transactions(raw) {
            Err(StmtError::AiExtraction { detail, .. }) => {
                assert!(detail.contains("a string"), "got: {detail}");
            }
            other => panic!("expected AiExtraction, got {other:?}"),
        }
    }

    #[test]
    fn empty_response_fails() {
        assert!(matches!(
            parse_transactions("   "),
            Err(StmtError::AiExtraction { .. })
        ));
    }

    #[test]
    fn excerpt_is_truncated_to_500_chars() {
        let raw = "z".repeat(2_000);
        match parse_transactions(&raw) {
            Err(StmtError::AiExtraction { excerpt, .. }) => {
                assert_eq!(excerpt.len(), 500);
            }
            other => panic!("expected AiExtraction, got {other:?}"),
        }
    }
}
