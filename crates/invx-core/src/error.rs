//! Error types for the invx-core library.

use thiserror::Error;

/// Main error type for the invx library.
#[derive(Error, Debug)]
pub enum InvxError {
    /// Document reading error.
    #[error("document error: {0}")]
    Document(#[from] DocumentError),

    /// Field specification error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// CSV output error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors raised while turning a source file into a [`Document`](crate::Document).
#[derive(Error, Debug)]
pub enum DocumentError {
    /// File extension is not one of the supported formats.
    #[error("unsupported document format: {0}")]
    UnsupportedFormat(String),

    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The .docx package could not be opened.
    #[error("invalid Word package: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// Malformed WordprocessingML.
    #[error("malformed document XML: {0}")]
    Xml(#[from] quick_xml::Error),

    /// A required package part is missing.
    #[error("missing package part: {0}")]
    MissingPart(String),

    /// I/O error while reading the source.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A reader library panicked on this file.
    #[error("reader crashed: {0}")]
    Panicked(String),
}

/// Errors in field specifications. Field misses are never errors.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// Pattern failed to compile.
    #[error("invalid pattern for {field}: {reason}")]
    InvalidPattern { field: String, reason: String },

    /// Pattern compiles but has no group to capture the value.
    #[error("pattern for {field} has no capture group: {pattern}")]
    MissingCaptureGroup { field: String, pattern: String },

    /// Table strategy with an empty label.
    #[error("table strategy for {0} has an empty label")]
    EmptyLabel(String),

    /// Field spec with an empty name.
    #[error("field name must not be empty")]
    EmptyFieldName,

    /// Two field specs share a name.
    #[error("duplicate field: {0}")]
    DuplicateField(String),

    /// No fields configured.
    #[error("no fields configured")]
    NoFields,
}

/// Result type for the invx library.
pub type Result<T> = std::result::Result<T, InvxError>;
