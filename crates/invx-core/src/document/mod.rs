//! Document readers: turn PDF and Word files into [`Document`]s.

mod docx;
mod pdf;

pub use docx::DocxReader;
pub use pdf::PdfReader;

#[cfg(test)]
pub(crate) use docx::fixtures;

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::DocumentError;
use crate::models::document::{Document, DocumentFormat};

/// Result type for document reading.
pub type Result<T> = std::result::Result<T, DocumentError>;

/// Trait for document format readers.
pub trait DocumentReader {
    /// Format this reader understands.
    fn format(&self) -> DocumentFormat;

    /// Parse a document from its raw bytes.
    fn read(&self, data: &[u8]) -> Result<Document>;
}

/// Reader for a given format.
pub fn reader_for(format: DocumentFormat) -> Box<dyn DocumentReader + Send + Sync> {
    match format {
        DocumentFormat::Pdf => Box::new(PdfReader::new()),
        DocumentFormat::Docx => Box::new(DocxReader::new()),
    }
}

/// Detect the format of `path` from its extension.
pub fn detect_format(path: &Path) -> Result<DocumentFormat> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    DocumentFormat::from_extension(ext)
        .ok_or_else(|| DocumentError::UnsupportedFormat(path.display().to_string()))
}

/// Read and parse a document file. The file is fully read and closed before
/// parsing starts.
pub fn load_document(path: &Path) -> Result<Document> {
    let format = detect_format(path)?;
    let data = fs::read(path)?;
    debug!("Read {} bytes from {}", data.len(), path.display());
    reader_for(format).read(&data)
}
