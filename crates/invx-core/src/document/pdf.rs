//! PDF text extraction using lopdf and pdf-extract.

use std::borrow::Cow;
use std::panic;

use lopdf::Document as PdfDocument;
use tracing::{debug, warn};

use super::{DocumentReader, Result};
use crate::error::DocumentError;
use crate::models::document::{Document, DocumentFormat};

/// PDF reader.
///
/// lopdf validates the file (and removes empty-password encryption) before
/// pdf-extract flattens the text. PDFs never yield tables.
#[derive(Debug, Clone, Default)]
pub struct PdfReader;

impl PdfReader {
    pub fn new() -> Self {
        Self
    }

    /// Load the PDF, returning bytes pdf-extract can read.
    fn prepare<'a>(&self, data: &'a [u8]) -> Result<Cow<'a, [u8]>> {
        let mut doc = PdfDocument::load_mem(data).map_err(|e| DocumentError::Parse(e.to_string()))?;

        let page_count = doc.get_pages().len();
        if page_count == 0 {
            return Err(DocumentError::NoPages);
        }
        debug!("Loaded PDF with {} pages", page_count);

        if !doc.is_encrypted() {
            return Ok(Cow::Borrowed(data));
        }

        if doc.decrypt("").is_err() {
            return Err(DocumentError::Encrypted);
        }
        debug!("Decrypted PDF with empty password");

        let mut decrypted = Vec::new();
        doc.save_to(&mut decrypted)
            .map_err(|e| DocumentError::Parse(format!("failed to save decrypted PDF: {}", e)))?;
        Ok(Cow::Owned(decrypted))
    }

    /// Flattened text of all pages.
    pub fn extract_text(&self, data: &[u8]) -> Result<String> {
        let data = self.prepare(data)?;

        // pdf-extract panics on some malformed font programs
        let extracted = panic::catch_unwind(|| pdf_extract::extract_text_from_mem(&data))
            .map_err(|_| DocumentError::TextExtraction("text extractor panicked".to_string()))?;
        let text = extracted.map_err(|e| DocumentError::TextExtraction(e.to_string()))?;

        if text.trim().is_empty() {
            warn!("PDF has no extractable text (scanned document?)");
        }
        Ok(normalize_page_breaks(&text))
    }
}

/// Replace form feeds between pages with newlines.
fn normalize_page_breaks(text: &str) -> String {
    text.replace('\u{000c}', "\n")
}

impl DocumentReader for PdfReader {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::Pdf
    }

    fn read(&self, data: &[u8]) -> Result<Document> {
        let text = self.extract_text(data)?;
        debug!("Extracted {} chars of PDF text", text.len());
        Ok(Document::new(DocumentFormat::Pdf, text))
    }
}
