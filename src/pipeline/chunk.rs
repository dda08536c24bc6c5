//! Text chunking: split oversized statement text under a size bound.
//!
//! Extracted statement text routinely exceeds what one LLM call handles
//! well. Splitting naively loses statement-level context (most importantly
//! the statement date, which the model needs to infer the year for day/month
//! rows). Every chunk therefore carries a shared header drawn from the top
//! of the document — duplicated per chunk, a deliberate trade-off for giving
//! each call the context it needs.
//!
//! ## Guarantees
//!
//! * Chunks preserve original line order and never overlap.
//! * Concatenating all chunk bodies reproduces every line of the input
//!   exactly once (headers are duplicated context, not content).
//! * `header.len() + body.len() <= max_chars` per chunk, except when a
//!   single line alone exceeds the budget — that line becomes its own
//!   oversized chunk. Lines are never split and never dropped.

use crate::error::StmtError;

/// How many lines from the top of the document are scanned for the header.
const HEADER_SCAN_LINES: usize = 10;

/// How many non-blank lines the header keeps.
const HEADER_KEEP_LINES: usize = 3;

/// A bounded-size segment of statement text with repeated header context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Shared context from the top of the document; may be empty.
    pub header: String,
    /// Newline-joined run of consecutive source lines.
    pub body: String,
}

impl Chunk {
    /// The payload submitted to the extraction service.
    pub fn text(&self) -> String {
        if self.header.is_empty() {
            self.body.clone()
        } else {
            format!("{}\n{}", self.header, self.body)
        }
    }

    /// Combined header + body length in characters.
    pub fn len(&self) -> usize {
        self.header.len() + self.body.len()
    }

    /// True when both header and body are empty.
    pub fn is_empty(&self) -> bool {
        self.header.is_empty() && self.body.is_empty()
    }
}

/// Split `text` into ordered chunks of at most `max_chars` characters each.
///
/// Empty or whitespace-only input yields an empty vector — the caller must
/// treat that as zero transactions, not an error.
///
/// # Errors
/// [`StmtError::InvalidConfig`] when `max_chars` is zero.
pub fn split_text(text: &str, max_chars: usize) -> Result<Vec<Chunk>, StmtError> {
    if max_chars == 0 {
        return Err(StmtError::InvalidConfig(
            "max_chars_per_chunk must be ≥ 1".into(),
        ));
    }
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }

    let lines: Vec<&str> = text.lines().collect();
    let header = derive_header(&lines);

    let mut chunks = Vec::new();
    let mut body_lines: Vec<&str> = Vec::new();
    // Running total per the budget: header plus (line length + 1) per line.
    let mut current_len = header.len();

    for &line in &lines {
        let line_cost = line.len() + 1;
        if !body_lines.is_empty() && current_len + line_cost > max_chars {
            chunks.push(Chunk {
                header: header.clone(),
                body: body_lines.join("\n"),
            });
            body_lines.clear();
            current_len = header.len();
        }
        body_lines.push(line);
        current_len += line_cost;
    }

    if !body_lines.is_empty() {
        chunks.push(Chunk {
            header,
            body: body_lines.join("\n"),
        });
    }

    Ok(chunks)
}

/// Shared header: the first up to 3 non-blank lines among the first 10.
fn derive_header(lines: &[&str]) -> String {
    lines
        .iter()
        .take(HEADER_SCAN_LINES)
        .filter(|l| !l.trim().is_empty())
        .take(HEADER_KEEP_LINES)
        .copied()
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_yields_no_chunks() {
        assert!(split_text("", 6000).unwrap().is_empty());
        assert!(split_text("   \n\n  \t\n", 6000).unwrap().is_empty());
    }

    #[test]
    fn zero_max_chars_is_a_config_error() {
        let result = split_text("some text", 0);
        assert!(matches!(result, Err(StmtError::InvalidConfig(_))));
    }

    #[test]
    fn small_text_yields_one_chunk_with_all_lines() {
        let text = "Statement Date: 31/03/2024\nDate | Description | Amount\n15/03 | LUNCH | 12.00-";
        let chunks = split_text(text, 6000).unwrap();
        assert_eq!(chunks.len(), 1);
        // Body holds the original lines; the header is duplicated context.
        assert_eq!(chunks[0].body, text);
        assert_eq!(chunks[0].header, text);
    }

    #[test]
    fn header_takes_first_three_non_blank_of_first_ten_lines() {
        let text = "\nBANK BERHAD\n\nStatement Date: 31/03/2024\nAccount: 1234\nrow 1\nrow 2";
        let chunks = split_text(text, 6000).unwrap();
        assert_eq!(
            chunks[0].header,
            "BANK BERHAD\nStatement Date: 31/03/2024\nAccount: 1234"
        );
    }

    #[test]
    fn header_scan_stops_at_line_ten() {
        // Nine blank lines push all content past the scan window except line 10.
        let mut text = "\n".repeat(9);
        text.push_str("only line in window\nnon-header row\nanother row");
        let chunks = split_text(&text, 6000).unwrap();
        assert_eq!(chunks[0].header, "only line in window");
    }

    #[test]
    fn bodies_reconstruct_every_line_exactly_once() {
        let lines: Vec<String> = (0..200).map(|i| format!("row {i} | SHOP {i} | 10.00-")).collect();
        let text = lines.join("\n");
        let chunks = split_text(&text, 500).unwrap();
        assert!(chunks.len() > 1);

        let rejoined: Vec<&str> = chunks.iter().flat_map(|c| c.body.lines()).collect();
        assert_eq!(rejoined, lines.iter().map(String::as_str).collect::<Vec<_>>());
    }

    #[test]
    fn chunks_respect_the_size_budget() {
        let lines: Vec<String> = (0..100).map(|i| format!("line number {i}")).collect();
        let text = lines.join("\n");
        let max = 400;
        for chunk in split_text(&text, max).unwrap() {
            assert!(chunk.len() <= max, "chunk of {} chars exceeds {max}", chunk.len());
        }
    }

    #[test]
    fn fifteen_thousand_chars_at_six_thousand_gives_three_chunks() {
        // 150 lines × (99 chars + newline) = 15 000 characters.
        let line = "x".repeat(99);
        let text = vec![line; 150].join("\n") + "\n";
        assert_eq!(text.len(), 15_000);

        let chunks = split_text(&text, 6_000).unwrap();
        assert_eq!(chunks.len(), 3);
        for chunk in &chunks {
            assert!(chunk.len() <= 6_000);
        }
    }

    #[test]
    fn oversized_line_becomes_its_own_chunk() {
        let huge = "y".repeat(700);
        let text = format!("header\nshort line\n{huge}\ntail line");
        let chunks = split_text(&text, 100).unwrap();

        // The oversized line is kept whole in a chunk of its own.
        let holder: Vec<&Chunk> = chunks.iter().filter(|c| c.body.contains(&huge)).collect();
        assert_eq!(holder.len(), 1);
        assert_eq!(holder[0].body, huge);

        // Nothing was dropped.
        let rejoined: Vec<&str> = chunks.iter().flat_map(|c| c.body.lines()).collect();
        assert_eq!(rejoined, vec!["header", "short line", huge.as_str(), "tail line"]);
    }

    #[test]
    fn chunk_text_joins_header_and_body() {
        let chunk = Chunk {
            header: "Statement Date: 31/03/2024".into(),
            body: "15/03 | LUNCH | 12.00-".into(),
        };
        assert_eq!(
            chunk.text(),
            "Statement Date: 31/03/2024\n15/03 | LUNCH | 12.00-"
        );

        let headerless = Chunk {
            header: String::new(),
            body: "15/03 | LUNCH | 12.00-".into(),
        };
        assert_eq!(headerless.text(), "15/03 | LUNCH | 12.00-");
    }
}
