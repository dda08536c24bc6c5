//! Prompts for LLM-based transaction extraction.
//!
//! Centralising every prompt here serves two purposes:
//!
//! 1. **Single source of truth** — changing the default behaviour (e.g.
//!    adding a category or tweaking the date rules) requires editing exactly
//!    one place.
//!
//! 2. **Testability** — unit tests can import and inspect prompts directly
//!    without a live model, making prompt regressions easy to catch.
//!
//! Callers can override both pieces via
//! [`crate::config::ExtractionConfig::system_prompt`] and
//! [`crate::config::ExtractionConfig::example`]; the constants here are used
//! only when no override is provided.

/// Default system instruction for bank-statement extraction.
///
/// The schema description is appended by [`build_system_prompt`] so prompt
/// text and schema stay independently editable.
pub const DEFAULT_SYSTEM_PROMPT: &str = r#"You are a bank statement data extraction expert. The extracted text might be out of order and unstructured — some of it may read column-by-column instead of row-by-row. Extract all transactions from the statement text and return ONLY valid JSON matching the schema.

Rules:
- Return ONLY valid JSON, no markdown, no explanation
- Extract every transaction row — do not skip any
- Format all dates as YYYY-MM-DD, using the statement year when only day/month is given
- Use decimal numbers for amounts; 2,200.00 means 2200.00, not 2.20
- Match dates with their corresponding descriptions and amounts
- Inflows (TRANSFER FR A/C, credit entries) must have a positive amount
- Outflows (TRANSFER TO A/C, debit entries) must have a negative amount
- Strip reference codes and noise from the transaction name; keep only the counterparty name
- Put the human-readable payment purpose or reference code in the description field
- Set is_direct to false if the transaction involves a payment gateway (e.g. TOYYIBPAY, SHOPEE, GRAB, FPX, BILLPLZ); otherwise set is_direct to true
- Assign a category from: transfer_in, transfer_out, payment"#;

/// Default worked example prepended to the user prompt.
///
/// One input/output pair anchors the date normalisation, sign convention,
/// and name/description split far more reliably than rules alone.
pub const DEFAULT_EXAMPLE: &str = r#"Example input:
"
Statement Date: 31/03/2024
(Transaction)
Date | Transaction Description | Transaction Amount |
15/03 | TRANSFER FR A/C JOHN DOE* Friendly game payment | 450.00- |
21/03 | TRANSFER TO A/C TOYYIBPAY SDN. BHD.* NPR4TADN040302414 MBB CT- | 380.00+ |
25/03 | TRANSFER TO A/C CAROLYN BESSETE* Jersey payment | 100.00+ |
"

Example output:
{
    "transactions": [
        {
            "date": "2024-03-15",
            "transaction": "TRANSFER FR A/C JOHN DOE",
            "amount": 450.00,
            "description": "Friendly game payment",
            "category": "transfer_in",
            "is_direct": true
        },
        {
            "date": "2024-03-21",
            "transaction": "TRANSFER TO A/C TOYYIBPAY SDN. BHD.",
            "amount": -380.00,
            "description": "NPR4TADN040302414 MBB CT",
            "category": "payment",
            "is_direct": false
        },
        {
            "date": "2024-03-25",
            "transaction": "TRANSFER TO A/C CAROLYN BESSETE",
            "amount": -100.00,
            "description": "Jersey payment",
            "category": "transfer_out",
            "is_direct": true
        }
    ]
}"#;

/// Assemble the full system message: instruction rules plus schema hint.
pub fn build_system_prompt(instruction: &str, schema_hint: &str) -> String {
    format!("{instruction}\n\nSchema to follow:\n{schema_hint}")
}

/// Assemble the user message: worked example plus the chunk payload.
pub fn build_user_prompt(example: &str, payload: &str) -> String {
    format!("{example}\n\nNow extract from this statement text:\n\n{payload}")
}
