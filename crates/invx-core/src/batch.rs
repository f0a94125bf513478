//! Batch processing: a directory of documents into one CSV file.

use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::document::{self, detect_format};
use crate::error::{DocumentError, Result};
use crate::extraction::FieldExtractor;
use crate::models::config::BatchConfig;
use crate::models::result::ExtractionResult;
use crate::output::{CsvOutput, DocumentRecord};

/// Outcome of reading and extracting one file.
pub type DocumentOutcome = std::result::Result<ExtractionResult, DocumentError>;

/// A document that could not be read.
#[derive(Debug, Clone)]
pub struct FailedDocument {
    pub path: PathBuf,
    pub error: String,
}

/// What a batch run produced.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    /// Rows written, in input order.
    pub records: Vec<DocumentRecord>,
    /// Unreadable documents, logged and left out.
    pub failures: Vec<FailedDocument>,
    /// Documents left out because no field matched.
    pub skipped: Vec<PathBuf>,
}

impl BatchReport {
    pub fn processed(&self) -> usize {
        self.records.len() + self.failures.len() + self.skipped.len()
    }
}

/// Supported documents directly inside `dir`, sorted by path.
pub fn discover_documents(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && detect_format(&path).is_ok() {
            files.push(path);
        }
    }
    files.sort();
    debug!("Found {} documents in {}", files.len(), dir.display());
    Ok(files)
}

/// Runs the field extractor over a set of documents and writes the CSV.
pub struct BatchProcessor {
    config: BatchConfig,
    extractor: FieldExtractor,
}

impl BatchProcessor {
    pub fn new(config: BatchConfig, extractor: FieldExtractor) -> Self {
        Self { config, extractor }
    }

    /// Documents in the configured input directory.
    pub fn discover(&self) -> Result<Vec<PathBuf>> {
        discover_documents(&self.config.input_dir)
    }

    /// Read one file and extract its fields.
    pub fn process_file(&self, path: &Path) -> DocumentOutcome {
        process_document(&self.extractor, path)
    }

    /// Turn per-file outcomes (in input order) into a report.
    ///
    /// Read failures are logged and dropped; all-miss results are dropped
    /// when `skip_empty` is set.
    pub fn assemble<I>(&self, outcomes: I) -> BatchReport
    where
        I: IntoIterator<Item = (PathBuf, DocumentOutcome)>,
    {
        let mut report = BatchReport::default();
        for (path, outcome) in outcomes {
            match outcome {
                Ok(result) if self.config.skip_empty && result.nothing_found() => {
                    warn!("No fields found in {}, leaving it out", path.display());
                    report.skipped.push(path);
                }
                Ok(result) => report.records.push(DocumentRecord { path, result }),
                Err(e) => {
                    warn!("Failed to process {}: {}", path.display(), e);
                    report.failures.push(FailedDocument {
                        path,
                        error: e.to_string(),
                    });
                }
            }
        }
        report
    }

    /// Write the report's records to the configured output path.
    pub fn write_output(&self, report: &BatchReport) -> Result<()> {
        CsvOutput::new(&self.extractor)
            .with_filename(self.config.include_filename)
            .write_file(&self.config.output_path, &report.records)
    }

    /// Process `files` sequentially and write the CSV.
    pub fn run_files(&self, files: &[PathBuf]) -> Result<BatchReport> {
        let outcomes = files
            .iter()
            .map(|path| (path.clone(), self.process_file(path)));
        let report = self.assemble(outcomes);
        self.write_output(&report)?;
        Ok(report)
    }

    /// Process the input directory and write the CSV.
    pub fn run(&self) -> Result<BatchReport> {
        let files = self.discover()?;
        info!(
            "Processing {} documents from {}",
            files.len(),
            self.config.input_dir.display()
        );
        self.run_files(&files)
    }
}

/// Read `path` and run `extractor` on it, logging around the pure extraction.
pub fn process_document(extractor: &FieldExtractor, path: &Path) -> DocumentOutcome {
    info!("Processing {}", path.display());
    let loaded = panic::catch_unwind(AssertUnwindSafe(|| document::load_document(path)))
        .map_err(|payload| DocumentError::Panicked(panic_message(payload.as_ref())))?;
    let doc = loaded?;

    let result = extractor.extract(&doc);
    for field in result.missing() {
        debug!("{}: no strategy matched {}", path.display(), field);
    }
    info!(
        "Extracted {}/{} fields from {}",
        result.found_count(),
        result.len(),
        path.display()
    );
    Ok(result)
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::document::{Document, DocumentFormat};

    fn processor(skip_empty: bool) -> BatchProcessor {
        let config = BatchConfig {
            skip_empty,
            ..BatchConfig::default()
        };
        BatchProcessor::new(config, FieldExtractor::builtin())
    }

    fn outcome(text: &str) -> DocumentOutcome {
        Ok(FieldExtractor::builtin().extract(&Document::new(DocumentFormat::Pdf, text)))
    }

    #[test]
    fn test_assemble_keeps_order_and_drops_failures() {
        let report = processor(false).assemble(vec![
            (PathBuf::from("c.pdf"), outcome("Invoice Number: C")),
            (PathBuf::from("a.pdf"), Err(DocumentError::NoPages)),
            (PathBuf::from("b.pdf"), outcome("Invoice Number: B")),
        ]);

        let paths: Vec<_> = report.records.iter().map(|r| r.path.clone()).collect();
        assert_eq!(paths, vec![PathBuf::from("c.pdf"), PathBuf::from("b.pdf")]);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].path, PathBuf::from("a.pdf"));
        assert_eq!(report.processed(), 3);
    }

    #[test]
    fn test_skip_empty_is_opt_in() {
        let outcomes = || {
            vec![
                (PathBuf::from("empty.pdf"), outcome("nothing here")),
                (PathBuf::from("full.pdf"), outcome("Due Date: 01/01/2025")),
            ]
        };

        let kept = processor(false).assemble(outcomes());
        assert_eq!(kept.records.len(), 2);
        assert!(kept.skipped.is_empty());

        let skipped = processor(true).assemble(outcomes());
        assert_eq!(skipped.records.len(), 1);
        assert_eq!(skipped.skipped, vec![PathBuf::from("empty.pdf")]);
    }

    #[test]
    fn test_discover_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.pdf", "a.DOCX", "notes.txt", "c.docx"] {
            fs::write(dir.path().join(name), b"x").unwrap();
        }
        fs::create_dir(dir.path().join("sub.pdf")).unwrap();

        let files = discover_documents(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, vec!["a.DOCX", "b.pdf", "c.docx"]);
    }

    #[test]
    fn test_oversized_docx_entry_does_not_stop_the_batch() {
        let dir = tempfile::tempdir().unwrap();
        let xml = r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body><w:p><w:r><w:t>Invoice Number: Z-9</w:t></w:r></w:p></w:body></w:document>"#;
        let huge = dir.path().join("a_huge.docx");
        fs::write(
            &huge,
            document::fixtures::package_claiming_size(xml.as_bytes(), 0xFFFF_FFFF_FFFF_FFF0),
        )
        .unwrap();
        fs::write(dir.path().join("b_plain.pdf"), b"not a pdf").unwrap();

        let files = discover_documents(dir.path()).unwrap();
        let outcomes: Vec<_> = files
            .iter()
            .map(|p| (p.clone(), process_document(&FieldExtractor::builtin(), p)))
            .collect();
        let report = processor(false).assemble(outcomes);

        assert_eq!(report.processed(), 2);
        for record in &report.records {
            assert_eq!(record.result.get("Invoice Number"), Some("Z-9"));
        }
    }

    #[test]
    fn test_panic_message_payloads() {
        let err = panic::catch_unwind(|| {
            panic!("boom");
        }).unwrap_err();
        assert_eq!(panic_message(err.as_ref()), "boom");

        let err = panic::catch_unwind(|| {
            panic!("{} {}", "bad", 7);
        }).unwrap_err();
        assert_eq!(panic_message(err.as_ref()), "bad 7");

        let err = panic::catch_unwind(|| {
            panic::panic_any(42u8);
        }).unwrap_err();
        assert_eq!(panic_message(err.as_ref()), "unknown panic");
    }

    #[test]
    fn test_discover_missing_dir_is_error() {
        assert!(discover_documents(Path::new("/nonexistent/invoices")).is_err());
    }
}
