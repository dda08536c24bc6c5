//! Error types for the stmt2json library.
//!
//! Every pipeline stage fails fast with a typed [`StmtError`]; no stage
//! substitutes a default for a downstream failure. The two documented
//! permissive cases — empty input text and a chunk response missing the
//! `transactions` field — are successes with zero records, not errors.
//!
//! The taxonomy matters at the HTTP boundary: callers must be able to tell
//! "your file is unreadable" ([`StmtError::DocumentParse`], a client error)
//! from "the extraction model failed" ([`StmtError::AiExtraction`]) from
//! "the extracted data didn't match the schema"
//! ([`StmtError::SchemaValidation`]). The server maps each to a stable
//! status code.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the stmt2json library.
#[derive(Debug, Error)]
pub enum StmtError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("document not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("permission denied reading '{path}'")]
    PermissionDenied { path: PathBuf },

    /// HTTP URL was syntactically valid but download failed.
    #[error("failed to download '{url}': {reason}")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("download timed out after {secs}s for '{url}'\nIncrease --download-timeout.")]
    DownloadTimeout { url: String, secs: u64 },

    // ── Document errors ───────────────────────────────────────────────────
    /// The upstream text producer could not turn document bytes into text
    /// (corrupt file, unreadable encoding, zero extractable pages).
    #[error("failed to parse document: {detail}")]
    DocumentParse { detail: String },

    // ── Extraction errors ─────────────────────────────────────────────────
    /// The extraction call failed transport-side, timed out, or returned
    /// content that could not be parsed as the expected JSON object.
    ///
    /// `excerpt` holds the first ~500 characters of the raw model response
    /// so callers can diagnose what the model actually said.
    #[error("AI extraction failed: {detail}")]
    AiExtraction { detail: String, excerpt: String },

    /// The configured provider is not initialised (missing API key etc.).
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    // ── Validation errors ─────────────────────────────────────────────────
    /// The assembled payload does not conform to the target schema.
    ///
    /// Validation is all-or-nothing: every violating record/field is listed
    /// and no partial result is returned.
    #[error("schema validation failed: {}", render_violations(.violations))]
    SchemaValidation { violations: Vec<Violation> },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Invalid pipeline configuration (e.g. a zero chunk size).
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Join violations for the error display string.
fn render_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(Violation::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// One schema violation: which record, which field, what went wrong.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Violation {
    /// Zero-based index of the record in the aggregated transaction list.
    pub record: usize,
    /// The offending field, or `"$"` when the record itself is malformed.
    pub field: String,
    /// Human-readable description of the mismatch.
    pub detail: String,
}

impl Violation {
    /// Construct a violation for `transactions[record].field`.
    pub fn new(record: usize, field: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            record,
            field: field.into(),
            detail: detail.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "transactions[{}].{}: {}",
            self.record, self.field, self.detail
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn violation_display_names_record_and_field() {
        let v = Violation::new(2, "amount", "expected a number, got string");
        assert_eq!(
            v.to_string(),
            "transactions[2].amount: expected a number, got string"
        );
    }

    #[test]
    fn schema_validation_display_lists_every_violation() {
        let e = StmtError::SchemaValidation {
            violations: vec![
                Violation::new(0, "date", "not a valid ISO 8601 date"),
                Violation::new(1, "is_direct", "expected a boolean"),
            ],
        };
        let msg = e.to_string();
        assert!(msg.contains("transactions[0].date"), "got: {msg}");
        assert!(msg.contains("transactions[1].is_direct"), "got: {msg}");
    }

    #[test]
    fn ai_extraction_display() {
        let e = StmtError::AiExtraction {
            detail: "response was not valid JSON".into(),
            excerpt: "Sorry, I cannot process this.".into(),
        };
        assert!(e.to_string().contains("not valid JSON"));
    }

    #[test]
    fn download_timeout_display() {
        let e = StmtError::DownloadTimeout {
            url: "https://example.com/statement.pdf".into(),
            secs: 120,
        };
        assert!(e.to_string().contains("120s"));
    }
}
