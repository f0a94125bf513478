//! Invoice field extraction module.

mod extractor;
pub mod field;
pub mod rules;

pub use extractor::{FieldExtractor, NOT_FOUND};
pub use field::{
    FieldSpec, FieldSpecConfig, Normalization, Strategy, StrategyConfig, TableRule, TableValue,
    TextPattern,
};

use crate::error::ExtractionError;

/// Result type for field specification operations.
pub type Result<T> = std::result::Result<T, ExtractionError>;
