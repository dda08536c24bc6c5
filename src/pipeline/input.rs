//! Input resolution and upstream text producers.
//!
//! Two concerns live here, both upstream of the pipeline proper:
//!
//! * **Resolution** — normalise a user-supplied path or URL to raw document
//!   bytes. URLs are downloaded with a bounded timeout.
//! * **Text extraction** — turn document bytes into a single string of
//!   statement text via the [`TextExtractor`] seam. The contract is
//!   `bytes -> String`: the string may be empty for plain text, and may be
//!   out of row/column order — the extraction prompt is written for that.
//!
//! OCR fallback is deliberately absent; a caller with scanned documents can
//! plug their own [`TextExtractor`] implementation.

use crate::error::StmtError;
use std::path::PathBuf;
use tracing::{debug, info};

/// An upstream text producer: document bytes in, extracted text out.
///
/// Failures surface as [`StmtError::DocumentParse`], which the HTTP
/// boundary maps to a client error — distinct from extraction and
/// validation failures.
pub trait TextExtractor: Send + Sync {
    /// Extract statement text from raw document bytes.
    fn extract_text(&self, bytes: &[u8]) -> Result<String, StmtError>;
}

/// Passthrough extractor for documents that already are plain text.
///
/// An empty document yields an empty string, which the pipeline turns into
/// an empty transaction list — not an error.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn extract_text(&self, bytes: &[u8]) -> Result<String, StmtError> {
        std::str::from_utf8(bytes)
            .map(str::to_owned)
            .map_err(|e| StmtError::DocumentParse {
                detail: format!("document is not valid UTF-8 text: {e}"),
            })
    }
}

/// PDF text-layer extractor backed by `pdf-extract`.
///
/// A PDF whose pages carry no extractable text (scanned images, zero pages)
/// is a [`StmtError::DocumentParse`] — the pipeline is never invoked for it.
#[cfg(feature = "pdf")]
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfTextExtractor;

#[cfg(feature = "pdf")]
impl TextExtractor for PdfTextExtractor {
    fn extract_text(&self, bytes: &[u8]) -> Result<String, StmtError> {
        let text = pdf_extract::extract_text_from_mem(bytes).map_err(|e| {
            StmtError::DocumentParse {
                detail: format!("failed to read PDF: {e}"),
            }
        })?;

        if text.trim().is_empty() {
            return Err(StmtError::DocumentParse {
                detail: "PDF has no extractable text".into(),
            });
        }

        Ok(text)
    }
}

/// Extract text from document bytes, picking an extractor by content.
///
/// PDF magic bytes route to [`PdfTextExtractor`] (or a
/// [`StmtError::DocumentParse`] when the `pdf` feature is disabled);
/// everything else is treated as plain text.
pub fn extract_document_text(bytes: &[u8]) -> Result<String, StmtError> {
    if bytes.starts_with(b"%PDF") {
        #[cfg(feature = "pdf")]
        {
            return PdfTextExtractor.extract_text(bytes);
        }
        #[cfg(not(feature = "pdf"))]
        {
            return Err(StmtError::DocumentParse {
                detail: "PDF input requires the 'pdf' feature".into(),
            });
        }
    }
    PlainTextExtractor.extract_text(bytes)
}

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Resolve the input string to raw document bytes.
///
/// If the input is a URL, download it with the given timeout.
/// If the input is a local file, read it from disk.
pub async fn resolve_input(input: &str, timeout_secs: u64) -> Result<Vec<u8>, StmtError> {
    if is_url(input) {
        download_url(input, timeout_secs).await
    } else {
        read_local(input)
    }
}

/// Read a local file, mapping I/O errors to the input-error taxonomy.
fn read_local(path_str: &str) -> Result<Vec<u8>, StmtError> {
    let path = PathBuf::from(path_str);

    match std::fs::read(&path) {
        Ok(bytes) => {
            debug!("read local document: {} ({} bytes)", path.display(), bytes.len());
            Ok(bytes)
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            Err(StmtError::PermissionDenied { path })
        }
        Err(_) => Err(StmtError::FileNotFound { path }),
    }
}

/// Download a URL and return the response body.
async fn download_url(url: &str, timeout_secs: u64) -> Result<Vec<u8>, StmtError> {
    info!("downloading document from: {}", url);

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| StmtError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let response = client.get(url).send().await.map_err(|e| {
        if e.is_timeout() {
            StmtError::DownloadTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            StmtError::DownloadFailed {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    })?;

    if !response.status().is_success() {
        return Err(StmtError::DownloadFailed {
            url: url.to_string(),
            reason: format!("HTTP {}", response.status()),
        });
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| StmtError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    debug!("downloaded {} bytes", bytes.len());
    Ok(bytes.to_vec())
}
