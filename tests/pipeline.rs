//! Integration tests for the extraction pipeline.
//!
//! The offline tests compose the pure pipeline stages — chunking, response
//! parsing, aggregation, validation — end to end using canned model
//! responses; no network access required.
//!
//! The live tests at the bottom call a real LLM provider and are gated
//! behind the `STMT2JSON_E2E` environment variable so they do not run in CI
//! unless explicitly requested:
//!
//!   STMT2JSON_E2E=1 OPENAI_API_KEY=sk-... cargo test --test pipeline -- --nocapture

use serde_json::{json, Value};
use stmt2json::pipeline::{chunk, merge, parse, validate};
use stmt2json::{extract_statement, Category, ExtractionConfig, StmtError};

/// A plausible statement: header lines plus many transaction rows.
fn statement_text(rows: usize) -> String {
    let mut lines = vec![
        "MAYBANK BERHAD".to_string(),
        "Statement Date: 31/03/2024".to_string(),
        "Date | Transaction Description | Transaction Amount |".to_string(),
    ];
    for i in 0..rows {
        lines.push(format!(
            "{:02}/03 | TRANSFER TO A/C SHOP {i}* order {i} | {}.00+ |",
            (i % 28) + 1,
            (i + 1) * 10
        ));
    }
    lines.join("\n")
}

/// What the model would return for a chunk, as a raw response string.
fn model_response(records: &[Value]) -> String {
    json!({ "transactions": records }).to_string()
}

fn record(date: &str, name: &str, amount: f64) -> Value {
    json!({
        "date": date,
        "transaction": name,
        "amount": amount,
        "description": "order",
        "category": "transfer_out",
        "is_direct": true
    })
}

// ── Offline: stage composition ───────────────────────────────────────────────

#[test]
fn chunked_statement_flows_through_parse_merge_validate() {
    let text = statement_text(400);
    let chunks = chunk::split_text(&text, 6_000).unwrap();
    assert!(chunks.len() > 1, "expected a multi-chunk statement");

    // Every chunk repeats the statement header, so per-chunk extraction has
    // the statement date available for year inference.
    for c in &chunks {
        assert!(c.header.contains("Statement Date: 31/03/2024"));
    }

    // Simulate one model response per chunk; the boundary row appears in
    // two adjacent chunks, as happens when a row sits near a split point.
    let boundary = record("2024-03-15", "JOHN DOE", -450.0);
    let responses = vec![
        model_response(&[record("2024-03-01", "SHOP 1", -10.0), boundary.clone()]),
        model_response(&[boundary.clone(), record("2024-03-20", "SHOP 2", -20.0)]),
    ];

    let chunk_records: Vec<Vec<Value>> = responses
        .iter()
        .map(|r| parse::parse_transactions(r).unwrap())
        .collect();

    let merged = merge::merge_chunk_records(chunk_records);
    assert_eq!(merged.len(), 3, "boundary row must be deduplicated");

    let statement = validate::validate_statement(&merged).unwrap();
    assert_eq!(statement.transactions.len(), 3);
    assert_eq!(statement.transactions[1].transaction, "JOHN DOE");
    assert_eq!(statement.transactions[1].amount, -450.0);
    assert_eq!(statement.transactions[0].category, Category::TransferOut);
}

#[test]
fn malformed_model_response_fails_extraction_not_validation() {
    let result = parse::parse_transactions("Sorry, I cannot process this.");
    match result {
        Err(StmtError::AiExtraction { excerpt, .. }) => {
            assert!(excerpt.contains("Sorry"));
        }
        other => panic!("expected AiExtraction, got {other:?}"),
    }
}

#[test]
fn bad_field_in_one_chunk_fails_the_whole_request() {
    let good = parse::parse_transactions(&model_response(&[record(
        "2024-03-01",
        "SHOP 1",
        -10.0,
    )]))
    .unwrap();
    let mut bad_record = record("2024-03-02", "SHOP 2", -20.0);
    bad_record["amount"] = json!("not-a-number");
    let bad = parse::parse_transactions(&model_response(&[bad_record])).unwrap();

    let merged = merge::merge_chunk_records(vec![good, bad]);
    match validate::validate_statement(&merged) {
        Err(StmtError::SchemaValidation { violations }) => {
            assert_eq!(violations.len(), 1);
            assert_eq!(violations[0].record, 1);
            assert_eq!(violations[0].field, "amount");
        }
        other => panic!("expected SchemaValidation, got {other:?}"),
    }
}

#[test]
fn chunk_then_merge_is_idempotent_over_its_own_output() {
    let records = vec![
        record("2024-03-01", "A", 1.0),
        record("2024-03-02", "B", 2.0),
    ];
    let merged = merge::merge_chunk_records(vec![records]);
    assert_eq!(merge::merge_chunk_records(vec![merged.clone()]), merged);
}

// ── Offline: entry-point behaviour that needs no provider ────────────────────

#[tokio::test]
async fn empty_document_text_yields_empty_statement() {
    let config = ExtractionConfig::default();
    let output = extract_statement("", &config).await.unwrap();
    assert!(output.statement.transactions.is_empty());
    assert_eq!(output.stats.chunks, 0);
    assert_eq!(output.stats.records_extracted, 0);
}

// ── Live E2E (gated) ─────────────────────────────────────────────────────────

/// Skip this test unless STMT2JSON_E2E is set.
macro_rules! e2e_skip_unless_enabled {
    () => {
        if std::env::var("STMT2JSON_E2E").is_err() {
            println!("SKIP — set STMT2JSON_E2E=1 to run live e2e tests");
            return;
        }
    };
}

#[tokio::test]
async fn e2e_small_statement_extracts_and_validates() {
    e2e_skip_unless_enabled!();

    let text = "\
Statement Date: 31/03/2024
(Transaction)
Date | Transaction Description | Transaction Amount |
15/03 | TRANSFER FR A/C JOHN DOE* Friendly game payment | 450.00- |
25/03 | TRANSFER TO A/C CAROLYN BESSETE* Jersey payment | 100.00+ |";

    let config = ExtractionConfig::default();
    let output = extract_statement(text, &config)
        .await
        .expect("extraction should succeed");

    assert!(
        !output.statement.transactions.is_empty(),
        "expected at least one transaction"
    );
    assert_eq!(output.stats.chunks, 1, "small input must be one chunk");
    for txn in &output.statement.transactions {
        println!("{} {:>10.2} {}", txn.date, txn.amount, txn.transaction);
    }
}

#[tokio::test]
async fn e2e_oversized_statement_is_chunked_and_deduplicated() {
    e2e_skip_unless_enabled!();

    let text = statement_text(600);
    assert!(text.len() > 6_000);

    let config = ExtractionConfig::default();
    let output = extract_statement(&text, &config)
        .await
        .expect("extraction should succeed");

    assert!(output.stats.chunks > 1, "expected a chunked run");
    // Dedup guarantee: no two transactions share (date, name, amount).
    let mut keys: Vec<(String, String, String)> = output
        .statement
        .transactions
        .iter()
        .map(|t| (t.date.to_string(), t.transaction.clone(), format!("{}", t.amount)))
        .collect();
    let before = keys.len();
    keys.sort();
    keys.dedup();
    assert_eq!(keys.len(), before, "duplicate keys survived aggregation");
}
