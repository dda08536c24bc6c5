//! # stmt2json
//!
//! Extract structured transaction data from bank statements using LLMs.
//!
//! ## Why this crate?
//!
//! Bank-statement PDFs defeat conventional parsers: every bank lays tables
//! out differently, text extraction often comes back column-by-column
//! instead of row-by-row, and dates drop the year. Instead of a parser per
//! bank, this crate hands the extracted text to an LLM with a strict JSON
//! schema, then re-validates everything the model returns before any caller
//! sees it.
//!
//! ## Pipeline Overview
//!
//! ```text
//! document
//!  │
//!  ├─ 1. Input     resolve path/URL, extract raw text (PDF text layer or plain text)
//!  ├─ 2. Chunk     split oversized text under a size bound, repeating the statement header
//!  ├─ 3. Extract   one LLM call per chunk (concurrent, bounded timeout)
//!  ├─ 4. Merge     deduplicate records across chunks by (date, transaction, amount)
//!  ├─ 5. Validate  all-or-nothing type check against the target schema
//!  └─ 6. Output    BankStatement + per-run stats
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use stmt2json::{extract_statement, ExtractionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Provider auto-detected from OPENAI_API_KEY / ANTHROPIC_API_KEY / …
//!     let config = ExtractionConfig::default();
//!     let output = extract_statement(statement_text(), &config).await?;
//!     for txn in &output.statement.transactions {
//!         println!("{} {:>10.2} {}", txn.date, txn.amount, txn.transaction);
//!     }
//!     Ok(())
//! }
//! # fn statement_text() -> &'static str { "" }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature  | Default | Description |
//! |----------|---------|-------------|
//! | `cli`    | on      | Enables the `stmt2json` binary (clap + anyhow + tracing-subscriber) |
//! | `pdf`    | on      | PDF text-layer extraction via `pdf-extract` |
//! | `server` | off     | Enables the `stmt2json-server` binary (axum upload API) |
//!
//! Disable defaults when using only the library:
//! ```toml
//! stmt2json = { version = "0.1", default-features = false }
//! ```
//!
//! ## Error taxonomy
//!
//! Callers can always tell the three failure families apart:
//! [`StmtError::DocumentParse`] (your file is unreadable),
//! [`StmtError::AiExtraction`] (the model call failed or returned garbage),
//! and [`StmtError::SchemaValidation`] (the extracted data didn't match the
//! schema, with every violation listed).

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod extract;
pub mod pipeline;
pub mod prompts;
pub mod schema;
#[cfg(feature = "server")]
pub mod server;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ExtractionConfig, ExtractionConfigBuilder};
pub use error::{StmtError, Violation};
pub use extract::{
    extract_document, extract_statement, extract_statement_sync, resolve_provider, run_pipeline,
    ExtractionOutput, ExtractionStats,
};
pub use pipeline::input::{PlainTextExtractor, TextExtractor};
pub use schema::{BankStatement, Category, Transaction};

#[cfg(feature = "pdf")]
pub use pipeline::input::PdfTextExtractor;
