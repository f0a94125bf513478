//! Configuration structures for the extraction pipeline.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{InvxError, Result};
use crate::extraction::rules::builtin_field_configs;
use crate::extraction::{FieldExtractor, FieldSpecConfig, NOT_FOUND};

/// Main configuration for the invx pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InvxConfig {
    /// Batch input/output configuration.
    pub batch: BatchConfig,

    /// Field extraction configuration.
    pub extraction: ExtractionConfig,
}

impl Default for InvxConfig {
    fn default() -> Self {
        Self {
            batch: BatchConfig::default(),
            extraction: ExtractionConfig::default(),
        }
    }
}

/// Batch processing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Directory scanned for documents.
    pub input_dir: PathBuf,

    /// Destination CSV file. Its parent directory is created if absent.
    pub output_path: PathBuf,

    /// Leave out documents where every field fell back to the sentinel.
    pub skip_empty: bool,

    /// Prefix each row with the source file name.
    pub include_filename: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("invoices"),
            output_path: PathBuf::from("invoices_data.csv"),
            skip_empty: false,
            include_filename: false,
        }
    }
}

/// Field extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Value written for fields no strategy matched ("NOT FOUND" or "").
    pub sentinel: String,

    /// Fields to extract, in CSV column order.
    pub fields: Vec<FieldSpecConfig>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            sentinel: NOT_FOUND.to_string(),
            fields: builtin_field_configs(),
        }
    }
}

impl ExtractionConfig {
    /// Compile the configured fields into an extractor.
    pub fn build_extractor(&self) -> Result<FieldExtractor> {
        let fields = self
            .fields
            .iter()
            .map(FieldSpecConfig::compile)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(FieldExtractor::new(fields)?.with_sentinel(self.sentinel.clone()))
    }
}

impl InvxConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| InvxError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content =
            serde_json::to_string_pretty(self).map_err(|e| InvxError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
