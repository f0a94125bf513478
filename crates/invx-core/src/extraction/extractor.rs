//! Strategy-chain field extractor.

use std::collections::HashSet;

use crate::error::ExtractionError;
use crate::models::document::Document;
use crate::models::result::{ExtractedField, ExtractionResult, MatchSource};

use super::field::FieldSpec;
use super::rules::builtin::BUILTIN_FIELDS;
use super::Result;

/// Default placeholder for fields no strategy could fill.
pub const NOT_FOUND: &str = "NOT FOUND";

/// Applies each field's strategy chain to a document.
///
/// Extraction is a pure function of the document and the field specs: the
/// extractor holds no per-document state and never logs.
#[derive(Debug, Clone)]
pub struct FieldExtractor {
    fields: Vec<FieldSpec>,
    sentinel: String,
}

impl FieldExtractor {
    /// Create an extractor over `fields`, in output order.
    pub fn new(fields: Vec<FieldSpec>) -> Result<Self> {
        if fields.is_empty() {
            return Err(ExtractionError::NoFields);
        }
        let mut seen = HashSet::new();
        for field in &fields {
            if !seen.insert(field.name()) {
                return Err(ExtractionError::DuplicateField(field.name().to_string()));
            }
        }
        Ok(Self {
            fields,
            sentinel: NOT_FOUND.to_string(),
        })
    }

    /// Extractor over the built-in invoice fields.
    pub fn builtin() -> Self {
        Self {
            fields: BUILTIN_FIELDS.clone(),
            sentinel: NOT_FOUND.to_string(),
        }
    }

    /// Set the placeholder used for unmatched fields.
    pub fn with_sentinel(mut self, sentinel: impl Into<String>) -> Self {
        self.sentinel = sentinel.into();
        self
    }

    pub fn sentinel(&self) -> &str {
        &self.sentinel
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Field names in output order (the CSV header).
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(FieldSpec::name)
    }

    /// Extract every configured field from `doc`.
    pub fn extract(&self, doc: &Document) -> ExtractionResult {
        let fields = self
            .fields
            .iter()
            .map(|spec| match extract_field(spec, doc) {
                Some((value, source)) => ExtractedField {
                    name: spec.name().to_string(),
                    value,
                    source: Some(source),
                },
                None => ExtractedField {
                    name: spec.name().to_string(),
                    value: self.sentinel.clone(),
                    source: None,
                },
            })
            .collect();
        ExtractionResult::new(fields)
    }
}

impl Default for FieldExtractor {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Text patterns first, then table scans; first non-empty value wins.
fn extract_field(spec: &FieldSpec, doc: &Document) -> Option<(String, MatchSource)> {
    let normalize = spec.normalization();

    for (strategy, pattern) in spec.text_patterns() {
        if let Some(raw) = pattern.capture(&doc.text) {
            let value = normalize.apply(raw);
            if !value.is_empty() {
                return Some((value, MatchSource::Text { strategy }));
            }
        }
    }

    for (strategy, rule) in spec.table_rules() {
        // Only the first labelled cell counts for a given rule.
        let Some((table, row, cell)) = rule.locate(&doc.tables) else {
            continue;
        };
        let value = rule
            .derive(&doc.tables[table], row, cell)
            .map(|raw| normalize.apply(raw))
            .unwrap_or_default();
        if !value.is_empty() {
            return Some((
                value,
                MatchSource::Table {
                    strategy,
                    table,
                    row,
                    cell,
                },
            ));
        }
    }

    None
}
