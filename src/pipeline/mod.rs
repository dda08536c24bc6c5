//! Pipeline stages for statement extraction.
//!
//! Each submodule implements exactly one transformation step.
//! Keeping stages separate makes each independently testable and lets us
//! swap implementations (e.g. a different upstream text producer) without
//! touching other stages.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ chunk ──▶ llm ──▶ parse ──▶ merge ──▶ validate
//! (bytes)   (split)   (call)  (JSON)    (dedup)   (typed)
//! ```
//!
//! 1. [`input`]    — resolve a path/URL to bytes and extract raw text via
//!    the [`input::TextExtractor`] seam
//! 2. [`chunk`]    — split oversized text into bounded chunks, each carrying
//!    the shared statement header
//! 3. [`llm`]      — one extraction call per chunk with a bounded timeout;
//!    the only stage with network I/O
//! 4. [`parse`]    — fence-strip and JSON-parse the model response into
//!    untrusted records
//! 5. [`merge`]    — deduplicate records across chunks by
//!    `(date, transaction, amount)`
//! 6. [`validate`] — all-or-nothing type check into the final
//!    [`crate::schema::BankStatement`]

pub mod chunk;
pub mod input;
pub mod llm;
pub mod merge;
pub mod parse;
pub mod validate;
