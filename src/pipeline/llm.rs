//! LLM interaction: build extraction messages and call the provider.
//!
//! This module turns one chunk of statement text into a provider API call
//! and returns raw transaction records. It is intentionally thin — all
//! prompt engineering lives in [`crate::prompts`] and all response parsing
//! in [`crate::pipeline::parse`], so either can change without touching the
//! call logic here.
//!
//! Exactly one outbound call per invocation, wrapped in a bounded timeout
//! so a cancelled request never leaves an extraction hanging. There is no
//! retry loop at this layer: retry/backoff policy belongs to the provider
//! transport, not the pipeline contract.

use crate::config::ExtractionConfig;
use crate::error::StmtError;
use crate::prompts::{build_system_prompt, build_user_prompt, DEFAULT_EXAMPLE, DEFAULT_SYSTEM_PROMPT};
use crate::pipeline::parse;
use crate::schema::SCHEMA_HINT;
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider};
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tokio::time::{timeout, Duration};
use tracing::{debug, warn};

/// Extract raw transaction records from one chunk of statement text.
///
/// ## Message Layout
///
/// 1. **System message** — the extraction rules plus the target schema
///    description (or a caller-supplied override)
/// 2. **User message** — the worked example followed by the chunk payload
///
/// # Errors
/// [`StmtError::AiExtraction`] when the call fails transport-side, exceeds
/// `config.api_timeout_secs`, or returns a response that cannot be parsed
/// as the expected JSON object.
pub async fn extract_chunk(
    provider: &Arc<dyn LLMProvider>,
    chunk_num: usize,
    payload: &str,
    config: &ExtractionConfig,
) -> Result<Vec<Value>, StmtError> {
    let start = Instant::now();

    let instruction = config.system_prompt.as_deref().unwrap_or(DEFAULT_SYSTEM_PROMPT);
    let example = config.example.as_deref().unwrap_or(DEFAULT_EXAMPLE);

    let messages = vec![
        ChatMessage::system(build_system_prompt(instruction, SCHEMA_HINT)),
        ChatMessage::user(build_user_prompt(example, payload)),
    ];

    let options = build_options(config);
    let deadline = Duration::from_secs(config.api_timeout_secs);

    let response = match timeout(deadline, provider.chat(&messages, Some(&options))).await {
        Ok(Ok(response)) => response,
        Ok(Err(e)) => {
            warn!("chunk {}: extraction call failed — {}", chunk_num, e);
            return Err(StmtError::AiExtraction {
                detail: format!("extraction call failed: {e}"),
                excerpt: String::new(),
            });
        }
        Err(_) => {
            warn!(
                "chunk {}: extraction call timed out after {}s",
                chunk_num, config.api_timeout_secs
            );
            return Err(StmtError::AiExtraction {
                detail: format!(
                    "extraction call timed out after {}s",
                    config.api_timeout_secs
                ),
                excerpt: String::new(),
            });
        }
    };

    debug!(
        "chunk {}: {} input tokens, {} output tokens, {:?}",
        chunk_num,
        response.prompt_tokens,
        response.completion_tokens,
        start.elapsed()
    );

    parse::parse_transactions(&response.content)
}

/// Build `CompletionOptions` from the extraction config.
fn build_options(config: &ExtractionConfig) -> CompletionOptions {
    CompletionOptions {
        temperature: Some(config.temperature),
        max_tokens: Some(config.max_tokens),
        ..Default::default()
    }
}
