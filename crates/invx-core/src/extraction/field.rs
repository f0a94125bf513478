//! Field specifications: a named field plus its ordered strategy chain.

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::error::ExtractionError;
use crate::models::document::Table;

use super::Result;

/// How a raw captured value is cleaned up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Normalization {
    /// Trim each line and join non-empty lines with a single space.
    #[default]
    Collapse,
    /// Trim each line and join non-empty lines with ", " (addresses).
    CommaJoin,
}

impl Normalization {
    pub fn apply(&self, raw: &str) -> String {
        let separator = match self {
            Self::Collapse => " ",
            Self::CommaJoin => ", ",
        };
        raw.lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect::<Vec<_>>()
            .join(separator)
    }
}

/// Where a table strategy takes its value from, relative to the label cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableValue {
    /// Text after the first delimiter following the label, in the same cell.
    AfterDelimiter(char),
    /// The cell to the right of the label cell.
    NextCell,
    /// Cell at the given column of the next row.
    NextRow(usize),
}

/// A regex tried against the flattened document text.
#[derive(Debug, Clone)]
pub struct TextPattern {
    regex: Regex,
}

impl TextPattern {
    /// Compile a pattern for `field`. The pattern needs at least one group.
    pub fn new(field: &str, pattern: &str) -> Result<Self> {
        let regex = Regex::new(pattern).map_err(|e| ExtractionError::InvalidPattern {
            field: field.to_string(),
            reason: e.to_string(),
        })?;
        Self::from_regex(field, regex)
    }

    pub fn from_regex(field: &str, regex: Regex) -> Result<Self> {
        if regex.captures_len() < 2 {
            return Err(ExtractionError::MissingCaptureGroup {
                field: field.to_string(),
                pattern: regex.as_str().to_string(),
            });
        }
        Ok(Self { regex })
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Group 1 of the first match, if the group participated.
    pub fn capture<'t>(&self, text: &'t str) -> Option<&'t str> {
        self.regex
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    }
}

/// A label-driven scan over table cells.
#[derive(Debug, Clone)]
pub struct TableRule {
    label: String,
    matcher: Regex,
    value: TableValue,
}

impl TableRule {
    pub fn new(field: &str, label: &str, value: TableValue) -> Result<Self> {
        if label.trim().is_empty() {
            return Err(ExtractionError::EmptyLabel(field.to_string()));
        }
        let matcher = RegexBuilder::new(&regex::escape(label))
            .case_insensitive(true)
            .build()
            .map_err(|e| ExtractionError::InvalidPattern {
                field: field.to_string(),
                reason: e.to_string(),
            })?;
        Ok(Self {
            label: label.to_string(),
            matcher,
            value,
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn value(&self) -> TableValue {
        self.value
    }

    /// Whether the cell contains the label, ignoring case.
    pub fn matches(&self, cell: &str) -> bool {
        self.matcher.is_match(cell)
    }

    /// First cell containing the label, as `(table, row, cell)`.
    pub fn locate(&self, tables: &[Table]) -> Option<(usize, usize, usize)> {
        tables.iter().enumerate().find_map(|(t, table)| {
            table.rows.iter().enumerate().find_map(|(r, row)| {
                row.iter()
                    .position(|cell| self.matches(cell))
                    .map(|c| (t, r, c))
            })
        })
    }

    /// Raw value for a label hit at `(row, col)` of `table`.
    pub fn derive<'t>(&self, table: &'t Table, row: usize, col: usize) -> Option<&'t str> {
        match self.value {
            TableValue::AfterDelimiter(delimiter) => {
                let cell = table.cell(row, col)?;
                let after_label = &cell[self.matcher.find(cell)?.end()..];
                Some(match after_label.split_once(delimiter) {
                    Some((_, rest)) => rest,
                    None => after_label,
                })
            }
            TableValue::NextCell => table.cell(row, col + 1),
            TableValue::NextRow(column) => table.cell(row + 1, column),
        }
    }
}

/// One extraction technique in a field's chain.
#[derive(Debug, Clone)]
pub enum Strategy {
    Text(TextPattern),
    Table(TableRule),
}

/// A named field with its normalization and ordered strategies.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    name: String,
    normalize: Normalization,
    strategies: Vec<Strategy>,
}

impl FieldSpec {
    pub fn new(
        name: impl Into<String>,
        normalize: Normalization,
        strategies: Vec<Strategy>,
    ) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ExtractionError::EmptyFieldName);
        }
        Ok(Self {
            name,
            normalize,
            strategies,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn normalization(&self) -> Normalization {
        self.normalize
    }

    pub fn strategies(&self) -> &[Strategy] {
        &self.strategies
    }

    /// Text strategies with their index in the chain.
    pub fn text_patterns(&self) -> impl Iterator<Item = (usize, &TextPattern)> {
        self.strategies.iter().enumerate().filter_map(|(i, s)| match s {
            Strategy::Text(p) => Some((i, p)),
            Strategy::Table(_) => None,
        })
    }

    /// Table strategies with their index in the chain.
    pub fn table_rules(&self) -> impl Iterator<Item = (usize, &TableRule)> {
        self.strategies.iter().enumerate().filter_map(|(i, s)| match s {
            Strategy::Table(r) => Some((i, r)),
            Strategy::Text(_) => None,
        })
    }

    /// Serializable form of this spec.
    pub fn to_config(&self) -> FieldSpecConfig {
        FieldSpecConfig {
            name: self.name.clone(),
            normalize: self.normalize,
            strategies: self
                .strategies
                .iter()
                .map(|s| match s {
                    Strategy::Text(p) => StrategyConfig::Text {
                        pattern: p.as_str().to_string(),
                    },
                    Strategy::Table(r) => StrategyConfig::Table {
                        label: r.label.clone(),
                        value: r.value,
                    },
                })
                .collect(),
        }
    }
}

/// Strategy as written in a configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StrategyConfig {
    Text { pattern: String },
    Table { label: String, value: TableValue },
}

/// Field spec as written in a configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpecConfig {
    pub name: String,
    #[serde(default)]
    pub normalize: Normalization,
    pub strategies: Vec<StrategyConfig>,
}

impl FieldSpecConfig {
    /// Compile patterns and labels into a [`FieldSpec`].
    pub fn compile(&self) -> Result<FieldSpec> {
        let strategies = self
            .strategies
            .iter()
            .map(|s| match s {
                StrategyConfig::Text { pattern } => {
                    TextPattern::new(&self.name, pattern).map(Strategy::Text)
                }
                StrategyConfig::Table { label, value } => {
                    TableRule::new(&self.name, label, *value).map(Strategy::Table)
                }
            })
            .collect::<Result<Vec<_>>>()?;
        FieldSpec::new(self.name.clone(), self.normalize, strategies)
    }
}
