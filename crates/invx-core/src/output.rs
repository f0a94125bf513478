//! CSV serialization of extraction results.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::Result;
use crate::extraction::FieldExtractor;
use crate::models::result::ExtractionResult;

/// Header of the optional file-name column.
pub const FILE_COLUMN: &str = "File";

/// One processed document, ready for output.
#[derive(Debug, Clone)]
pub struct DocumentRecord {
    pub path: PathBuf,
    pub result: ExtractionResult,
}

impl DocumentRecord {
    pub fn file_name(&self) -> &str {
        self.path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("")
    }
}

/// CSV layout: optional file column, then fields in spec order.
pub struct CsvOutput<'a> {
    extractor: &'a FieldExtractor,
    include_filename: bool,
}

impl<'a> CsvOutput<'a> {
    pub fn new(extractor: &'a FieldExtractor) -> Self {
        Self {
            extractor,
            include_filename: false,
        }
    }

    pub fn with_filename(mut self, include: bool) -> Self {
        self.include_filename = include;
        self
    }

    pub fn header(&self) -> Vec<&str> {
        let file = self.include_filename.then_some(FILE_COLUMN);
        file.into_iter().chain(self.extractor.field_names()).collect()
    }

    /// Write the header and one row per record.
    pub fn write<W: io::Write>(&self, writer: W, records: &[DocumentRecord]) -> Result<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record(self.header())?;

        for record in records {
            let file = self.include_filename.then(|| record.file_name());
            wtr.write_record(file.into_iter().chain(record.result.values()))?;
        }

        wtr.flush()?;
        Ok(())
    }

    /// Write to `path`, creating its parent directory first.
    pub fn write_file(&self, path: &Path, records: &[DocumentRecord]) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let file = fs::File::create(path)?;
        self.write(io::BufWriter::new(file), records)?;
        info!("Wrote {} rows to {}", records.len(), path.display());
        Ok(())
    }

    /// Render to a string (single-document output).
    pub fn render(&self, records: &[DocumentRecord]) -> Result<String> {
        let mut buf = Vec::new();
        self.write(&mut buf, records)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}
