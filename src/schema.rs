//! Target schema types: what a validated bank statement looks like.
//!
//! Everything coming back from the LLM is untrusted `serde_json::Value`
//! until it has passed through [`crate::pipeline::validate`]. The types here
//! are the *output* side of that boundary: fully typed, serialisable, and
//! never mutated after validation succeeds.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of transaction categories the extraction prompt allows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Money received (credit entry).
    TransferIn,
    /// Money sent to another account (debit entry).
    TransferOut,
    /// Purchase or bill settlement, typically via a payment gateway.
    Payment,
}

impl Category {
    /// All accepted wire values, in prompt order.
    pub const ALLOWED: [&'static str; 3] = ["transfer_in", "transfer_out", "payment"];

    /// Parse a wire value; `None` when outside the closed set.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "transfer_in" => Some(Category::TransferIn),
            "transfer_out" => Some(Category::TransferOut),
            "payment" => Some(Category::Payment),
            _ => None,
        }
    }

    /// The wire value for this category.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::TransferIn => "transfer_in",
            Category::TransferOut => "transfer_out",
            Category::Payment => "payment",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One validated transaction row.
///
/// Sign convention: inflows (`TRANSFER FR A/C`, credit entries) are positive,
/// outflows (`TRANSFER TO A/C`, debit entries) negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Transaction date, normalised to ISO 8601 by the extraction prompt.
    pub date: NaiveDate,
    /// Counterparty name, stripped of reference codes and noise.
    pub transaction: String,
    /// Signed amount.
    pub amount: f64,
    /// Human-readable payment purpose or reference code.
    pub description: String,
    /// Category from the closed set.
    pub category: Category,
    /// `false` when the transaction went through a payment gateway
    /// (TOYYIBPAY, SHOPEE, GRAB, FPX, BILLPLZ, …).
    pub is_direct: bool,
}

/// The validated result handed to the HTTP/CLI boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BankStatement {
    /// Transactions in first-seen order across all chunks.
    pub transactions: Vec<Transaction>,
}

impl BankStatement {
    /// A statement with no transactions (empty input text).
    pub fn empty() -> Self {
        Self {
            transactions: Vec::new(),
        }
    }
}

/// Compact schema description embedded in the extraction prompt.
///
/// Kept as a literal rather than generated so the prompt is stable across
/// refactors of the Rust types.
pub const SCHEMA_HINT: &str = r#"{
  "type": "object",
  "required": ["transactions"],
  "properties": {
    "transactions": {
      "type": "array",
      "items": {
        "type": "object",
        "required": ["date", "transaction", "amount", "description", "category", "is_direct"],
        "properties": {
          "date": { "type": "string", "format": "date", "description": "ISO 8601, YYYY-MM-DD" },
          "transaction": { "type": "string", "description": "counterparty name" },
          "amount": { "type": "number", "description": "signed decimal; inflow positive, outflow negative" },
          "description": { "type": "string" },
          "category": { "type": "string", "enum": ["transfer_in", "transfer_out", "payment"] },
          "is_direct": { "type": "boolean" }
        }
      }
    }
  }
}"#;

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Transaction {
        Transaction {
            date: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
            transaction: "JOHN DOE".into(),
            amount: -450.0,
            description: "Friendly game payment".into(),
            category: Category::TransferOut,
            is_direct: true,
        }
    }

    #[test]
    fn category_round_trip() {
        for name in Category::ALLOWED {
            let cat = Category::parse(name).unwrap();
            assert_eq!(cat.as_str(), name);
        }
        assert_eq!(Category::parse("groceries"), None);
    }

    #[test]
    fn transaction_serialises_date_as_iso_8601() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["date"], "2024-03-15");
        assert_eq!(json["category"], "transfer_out");
    }

    #[test]
    fn statement_serde_round_trip() {
        let statement = BankStatement {
            transactions: vec![sample()],
        };
        let json = serde_json::to_string(&statement).unwrap();
        let back: BankStatement = serde_json::from_str(&json).unwrap();
        assert_eq!(back, statement);
    }

    #[test]
    fn schema_hint_is_valid_json() {
        let v: serde_json::Value = serde_json::from_str(SCHEMA_HINT).unwrap();
        assert!(v["properties"]["transactions"].is_object());
    }
}
