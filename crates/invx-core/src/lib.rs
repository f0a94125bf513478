//! Core library for invoice field extraction.
//!
//! This crate provides:
//! - Document reading (PDF text, Word paragraphs and tables)
//! - Strategy-chain field extraction with a sentinel for misses
//! - Configurable field specs with a built-in invoice field set
//! - Batch processing of a directory into a CSV file

pub mod batch;
pub mod document;
pub mod error;
pub mod extraction;
pub mod models;
pub mod output;

pub use batch::{BatchProcessor, BatchReport, FailedDocument};
pub use document::{load_document, DocumentReader, DocxReader, PdfReader};
pub use error::{DocumentError, ExtractionError, InvxError, Result};
pub use extraction::{FieldExtractor, FieldSpec, FieldSpecConfig, NOT_FOUND};
pub use models::config::{BatchConfig, ExtractionConfig, InvxConfig};
pub use models::document::{Document, DocumentFormat, Table};
pub use models::result::{ExtractedField, ExtractionResult, MatchSource};
pub use output::{CsvOutput, DocumentRecord};
