//! Top-level extraction entry points.
//!
//! The pipeline is a single forward pass:
//!
//! ```text
//! Received → (Chunking if oversized) → Extracting (1..N calls)
//!          → Aggregating → Validating → {Succeeded | Failed(kind)}
//! ```
//!
//! No retries, no backward transitions. Every stage fails fast with a typed
//! [`StmtError`]; the two permissive cases (empty input, missing
//! `transactions` field in a chunk response) produce empty results instead.

use crate::config::ExtractionConfig;
use crate::error::StmtError;
use crate::pipeline::{chunk, input, llm, merge, validate};
use crate::schema::BankStatement;
use edgequake_llm::{LLMProvider, ProviderFactory};
use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Result of one pipeline invocation: the validated statement plus stats.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionOutput {
    /// The validated, typed statement.
    pub statement: BankStatement,
    /// Observability counters for this invocation.
    pub stats: ExtractionStats,
}

/// Counters describing one pipeline invocation.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExtractionStats {
    /// Number of chunks the input was split into (0 for empty input).
    pub chunks: usize,
    /// Raw records returned by the model across all chunks, pre-dedup.
    pub records_extracted: usize,
    /// Records surviving deduplication (= transactions in the statement).
    pub records_merged: usize,
    /// Wall-clock time of the whole invocation.
    pub total_duration_ms: u64,
    /// Wall-clock time spent in extraction calls.
    pub llm_duration_ms: u64,
}

/// Extract a validated statement from raw document text.
///
/// This is the primary entry point for the library. The LLM provider is
/// resolved from the config (see [`resolve_provider`]); use
/// [`run_pipeline`] directly when you already hold a provider handle.
///
/// Empty or whitespace-only text yields an empty statement, not an error —
/// no provider is contacted in that case.
///
/// # Example
/// ```rust,no_run
/// use stmt2json::{extract_statement, ExtractionConfig};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     // Provider auto-detected from OPENAI_API_KEY / ANTHROPIC_API_KEY / …
///     let config = ExtractionConfig::default();
///     let output = extract_statement("Statement Date: 31/03/2024\n…", &config).await?;
///     println!("{}", serde_json::to_string_pretty(&output.statement)?);
///     Ok(())
/// }
/// ```
pub async fn extract_statement(
    text: &str,
    config: &ExtractionConfig,
) -> Result<ExtractionOutput, StmtError> {
    if text.trim().is_empty() {
        debug!("input text is empty — returning an empty statement");
        return Ok(empty_output());
    }

    let provider = resolve_provider(config).await?;
    run_pipeline(&provider, text, config).await
}

/// Extract a validated statement from raw document bytes.
///
/// Picks an upstream text producer by content (PDF text layer or plain
/// text) before running the pipeline. A document with zero extractable
/// text fails with [`StmtError::DocumentParse`] and never reaches the
/// pipeline.
pub async fn extract_document(
    bytes: &[u8],
    config: &ExtractionConfig,
) -> Result<ExtractionOutput, StmtError> {
    let text = input::extract_document_text(bytes)?;
    extract_statement(&text, config).await
}

/// Synchronous wrapper around [`extract_statement`].
///
/// Creates a temporary tokio runtime internally.
pub fn extract_statement_sync(
    text: &str,
    config: &ExtractionConfig,
) -> Result<ExtractionOutput, StmtError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| StmtError::Internal(format!("failed to create tokio runtime: {e}")))?
        .block_on(extract_statement(text, config))
}

/// Run the pipeline against an explicit provider handle.
///
/// The provider is an explicit, caller-owned dependency — construct it once
/// at startup and pass it into every invocation; there is no process-global
/// client anywhere in this crate.
pub async fn run_pipeline(
    provider: &Arc<dyn LLMProvider>,
    text: &str,
    config: &ExtractionConfig,
) -> Result<ExtractionOutput, StmtError> {
    let total_start = Instant::now();

    // ── Step 1: Chunk ────────────────────────────────────────────────────
    let chunks = chunk::split_text(text, config.max_chars_per_chunk)?;
    if chunks.is_empty() {
        return Ok(empty_output());
    }
    info!(
        "extracting {} chars in {} chunk(s)",
        text.len(),
        chunks.len()
    );

    // ── Step 2: Extract, one call per chunk ──────────────────────────────
    // Calls run concurrently, but `buffered` (not `buffer_unordered`) hands
    // results back in chunk-submission order, keeping the aggregator's
    // first-seen winner deterministic regardless of completion order.
    let llm_start = Instant::now();
    let payloads: Vec<String> = chunks.iter().map(|c| c.text()).collect();
    let results: Vec<Result<Vec<serde_json::Value>, StmtError>> =
        stream::iter(payloads.into_iter().enumerate().map(|(idx, payload)| {
            let provider = Arc::clone(provider);
            async move { llm::extract_chunk(&provider, idx + 1, &payload, config).await }
        }))
        .buffered(config.concurrency)
        .collect()
        .await;
    let llm_duration_ms = llm_start.elapsed().as_millis() as u64;

    let mut chunk_records = Vec::with_capacity(results.len());
    for result in results {
        chunk_records.push(result?);
    }
    let records_extracted: usize = chunk_records.iter().map(Vec::len).sum();

    // ── Step 3: Aggregate ────────────────────────────────────────────────
    let merged = merge::merge_chunk_records(chunk_records);
    let records_merged = merged.len();
    debug!(
        "aggregated {} records into {} after dedup",
        records_extracted, records_merged
    );

    // ── Step 4: Validate ─────────────────────────────────────────────────
    let statement = validate::validate_statement(&merged)?;

    let stats = ExtractionStats {
        chunks: chunks.len(),
        records_extracted,
        records_merged,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
        llm_duration_ms,
    };
    info!(
        "extraction complete: {} transactions from {} chunk(s) in {}ms",
        statement.transactions.len(),
        stats.chunks,
        stats.total_duration_ms
    );

    Ok(ExtractionOutput { statement, stats })
}

fn empty_output() -> ExtractionOutput {
    ExtractionOutput {
        statement: BankStatement::empty(),
        stats: ExtractionStats::default(),
    }
}

/// Resolve the LLM provider, from most-specific to least-specific.
///
/// The fallback chain lets library users and CLI users each set exactly as
/// much or as little as they need:
///
/// 1. **Pre-built provider** (`config.provider`) — the caller constructed
///    and configured the provider entirely; we use it as-is. Useful in
///    tests or when the caller needs custom middleware.
///
/// 2. **Named provider + model** (`config.provider_name`) — reads the
///    corresponding API key (`OPENAI_API_KEY`, etc.) from the environment.
///
/// 3. **Environment pair** (`STMT2JSON_LLM_PROVIDER` + `STMT2JSON_MODEL`) —
///    the execution environment (Makefile, shell script, CI) chose for us.
///
/// 4. **Full auto-detection** (`ProviderFactory::from_env`) — scans known
///    API key variables and picks the first available provider, preferring
///    OpenAI when several keys are present.
pub async fn resolve_provider(
    config: &ExtractionConfig,
) -> Result<Arc<dyn LLMProvider>, StmtError> {
    // 1) User-provided provider takes priority
    if let Some(ref provider) = config.provider {
        return Ok(Arc::clone(provider));
    }

    // 2) Provider name + model
    if let Some(ref name) = config.provider_name {
        let model = config.model.as_deref().unwrap_or("gpt-4.1-nano");
        return create_provider(name, model);
    }

    // 3) Environment pair
    if let (Ok(prov), Ok(model)) = (
        std::env::var("STMT2JSON_LLM_PROVIDER"),
        std::env::var("STMT2JSON_MODEL"),
    ) {
        if !prov.is_empty() && !model.is_empty() {
            return create_provider(&prov, &model);
        }
    }

    // Prefer OpenAI explicitly when an OpenAI API key is present, so users
    // with multiple provider keys get a deterministic default.
    if let Ok(openai_key) = std::env::var("OPENAI_API_KEY") {
        if !openai_key.is_empty() {
            let model = config.model.as_deref().unwrap_or("gpt-4.1-nano");
            return create_provider("openai", model);
        }
    }

    let (llm_provider, _embedding) =
        ProviderFactory::from_env().map_err(|e| StmtError::ProviderNotConfigured {
            provider: "auto".to_string(),
            hint: format!(
                "No LLM provider could be auto-detected from environment.\n\
                Set OPENAI_API_KEY, ANTHROPIC_API_KEY, or configure a provider.\n\
                Error: {e}"
            ),
        })?;

    Ok(llm_provider)
}

/// Instantiate a named provider with the given model.
fn create_provider(
    provider_name: &str,
    model: &str,
) -> Result<Arc<dyn LLMProvider>, StmtError> {
    ProviderFactory::create_llm_provider(provider_name, model).map_err(|e| {
        StmtError::ProviderNotConfigured {
            provider: provider_name.to_string(),
            hint: format!("{e}"),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_text_yields_empty_statement_without_a_provider() {
        // No provider is configured and none is resolvable here; the empty
        // input short-circuit must fire before provider resolution.
        let config = ExtractionConfig::default();
        let output = extract_statement("", &config).await.unwrap();
        assert!(output.statement.transactions.is_empty());
        assert_eq!(output.stats.chunks, 0);
    }

    #[tokio::test]
    async fn whitespace_only_text_is_treated_as_empty() {
        let config = ExtractionConfig::default();
        let output = extract_statement("  \n\t\n ", &config).await.unwrap();
        assert!(output.statement.transactions.is_empty());
    }

    #[test]
    fn sync_wrapper_handles_empty_input() {
        let config = ExtractionConfig::default();
        let output = extract_statement_sync("", &config).unwrap();
        assert!(output.statement.transactions.is_empty());
    }
}
