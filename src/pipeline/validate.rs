//! Schema validation: turn untrusted records into a typed [`BankStatement`].
//!
//! The model's output is plausible-looking JSON, nothing more. Nothing
//! upstream has checked a single field, so every record is re-checked here,
//! eagerly, field by field. Validation is all-or-nothing: either every
//! record type-checks and a [`BankStatement`] is returned, or the whole
//! request fails with [`StmtError::SchemaValidation`] listing **every**
//! violation — not just the first — so a caller can fix their document (or
//! their prompt) in one round trip.

use crate::error::{StmtError, Violation};
use crate::schema::{BankStatement, Category, Transaction};
use chrono::NaiveDate;
use serde_json::Value;
use tracing::debug;

/// Validate aggregated records against the bank-statement schema.
///
/// # Errors
/// [`StmtError::SchemaValidation`] with one [`Violation`] per offending
/// record/field. No partial result is ever returned.
pub fn validate_statement(records: &[Value]) -> Result<BankStatement, StmtError> {
    let mut violations = Vec::new();
    let mut transactions = Vec::with_capacity(records.len());

    for (idx, record) in records.iter().enumerate() {
        if let Some(txn) = validate_record(idx, record, &mut violations) {
            transactions.push(txn);
        }
    }

    if !violations.is_empty() {
        return Err(StmtError::SchemaValidation { violations });
    }

    debug!("validated {} transactions", transactions.len());
    Ok(BankStatement { transactions })
}

/// Check one record; push every violation found and return the typed
/// transaction only when the record is fully clean.
fn validate_record(idx: usize, record: &Value, violations: &mut Vec<Violation>) -> Option<Transaction> {
    let Some(obj) = record.as_object() else {
        violations.push(Violation::new(idx, "$", "record is not a JSON object"));
        return None;
    };

    let date = match obj.get("date") {
        Some(Value::String(s)) => match NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            Ok(d) => Some(d),
            Err(_) => {
                violations.push(Violation::new(
                    idx,
                    "date",
                    format!("'{s}' is not a valid ISO 8601 date (expected YYYY-MM-DD)"),
                ));
                None
            }
        },
        Some(other) => {
            violations.push(type_violation(idx, "date", "a string", other));
            None
        }
        None => {
            violations.push(missing(idx, "date"));
            None
        }
    };

    let name = require_string(idx, obj, "transaction", violations);

    let amount = match obj.get("amount") {
        Some(v) => match v.as_f64() {
            Some(n) => Some(n),
            None => {
                violations.push(type_violation(idx, "amount", "a number", v));
                None
            }
        },
        None => {
            violations.push(missing(idx, "amount"));
            None
        }
    };

    let description = require_string(idx, obj, "description", violations);

    let category = match obj.get("category") {
        Some(Value::String(s)) => match Category::parse(s) {
            Some(c) => Some(c),
            None => {
                violations.push(Violation::new(
                    idx,
                    "category",
                    format!("'{s}' is not one of {:?}", Category::ALLOWED),
                ));
                None
            }
        },
        Some(other) => {
            violations.push(type_violation(idx, "category", "a string", other));
            None
        }
        None => {
            violations.push(missing(idx, "category"));
            None
        }
    };

    let is_direct = match obj.get("is_direct") {
        Some(Value::Bool(b)) => Some(*b),
        Some(other) => {
            violations.push(type_violation(idx, "is_direct", "a boolean", other));
            None
        }
        None => {
            violations.push(missing(idx, "is_direct"));
            None
        }
    };

    Some(Transaction {
        date: date?,
        transaction: name?,
        amount: amount?,
        description: description?,
        category: category?,
        is_direct: is_direct?,
    })
}

fn require_string(
    idx: usize,
    obj: &serde_json::Map<String, Value>,
    field: &'static str,
    violations: &mut Vec<Violation>,
) -> Option<String> {
    match obj.get(field) {
        Some(Value::String(s)) => Some(s.clone()),
        Some(other) => {
            violations.push(type_violation(idx, field, "a string", other));
            None
        }
        None => {
            violations.push(missing(idx, field));
            None
        }
    }
}

fn missing(idx: usize, field: &str) -> Violation {
    Violation::new(idx, field, "required field is missing")
}

fn type_violation(idx: usize, field: &str, expected: &str, got: &Value) -> Violation {
    let got_name = match got {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    };
    Violation::new(idx, field, format!("expected {expected}, got {got_name}"))
}
