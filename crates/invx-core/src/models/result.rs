//! Per-document extraction result.

use serde::{Deserialize, Serialize};

/// Which strategy supplied a field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MatchSource {
    /// A text pattern matched the flattened text.
    Text {
        /// Index of the strategy within the field spec.
        strategy: usize,
    },
    /// A table scan hit a labelled cell.
    Table {
        strategy: usize,
        table: usize,
        row: usize,
        cell: usize,
    },
}

/// One field of an [`ExtractionResult`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedField {
    /// Field name from the field spec.
    pub name: String,
    /// Matched value, or the sentinel when nothing matched.
    pub value: String,
    /// Strategy that produced the value; `None` means the sentinel was used.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<MatchSource>,
}

impl ExtractedField {
    pub fn is_found(&self) -> bool {
        self.source.is_some()
    }
}

/// Field values for one document, in field-spec order.
///
/// Every configured field is present; misses carry the sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    fields: Vec<ExtractedField>,
}

impl ExtractionResult {
    pub(crate) fn new(fields: Vec<ExtractedField>) -> Self {
        Self { fields }
    }

    /// Value of a field by name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.value.as_str())
    }

    /// Full field record by name.
    pub fn field(&self, name: &str) -> Option<&ExtractedField> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn fields(&self) -> &[ExtractedField] {
        &self.fields
    }

    /// Values in field order, ready for a CSV row.
    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.value.as_str())
    }

    /// Names of fields that fell back to the sentinel.
    pub fn missing(&self) -> impl Iterator<Item = &str> {
        self.fields
            .iter()
            .filter(|f| !f.is_found())
            .map(|f| f.name.as_str())
    }

    pub fn found_count(&self) -> usize {
        self.fields.iter().filter(|f| f.is_found()).count()
    }

    /// True when no field matched.
    pub fn nothing_found(&self) -> bool {
        self.found_count() == 0
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }
}
