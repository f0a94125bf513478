//! Built-in field set for the supported invoice layout.

use lazy_static::lazy_static;
use regex::Regex;

use super::patterns::*;
use crate::extraction::field::{
    FieldSpec, FieldSpecConfig, Normalization, Strategy, TableRule, TableValue, TextPattern,
};
use crate::extraction::Result;

pub const INVOICE_NUMBER_FIELD: &str = "Invoice Number";
pub const DUE_DATE_FIELD: &str = "Due Date";
pub const BILL_TO_FIELD: &str = "Bill To";
pub const PO_NUMBER_FIELD: &str = "PO Number";
pub const TOTAL_AMOUNT_DUE_FIELD: &str = "Total Amount Due";

/// Default CSV header order.
pub const DEFAULT_FIELD_ORDER: [&str; 5] = [
    INVOICE_NUMBER_FIELD,
    DUE_DATE_FIELD,
    BILL_TO_FIELD,
    PO_NUMBER_FIELD,
    TOTAL_AMOUNT_DUE_FIELD,
];

lazy_static! {
    pub static ref BUILTIN_FIELDS: Vec<FieldSpec> = builtin_fields().unwrap();
}

fn text(field: &str, regex: &Regex) -> Result<Strategy> {
    TextPattern::from_regex(field, regex.clone()).map(Strategy::Text)
}

fn table(field: &str, label: &str, value: TableValue) -> Result<Strategy> {
    TableRule::new(field, label, value).map(Strategy::Table)
}

fn builtin_fields() -> Result<Vec<FieldSpec>> {
    Ok(vec![
        FieldSpec::new(
            INVOICE_NUMBER_FIELD,
            Normalization::Collapse,
            vec![text(INVOICE_NUMBER_FIELD, &INVOICE_NUMBER)?],
        )?,
        FieldSpec::new(
            DUE_DATE_FIELD,
            Normalization::Collapse,
            vec![text(DUE_DATE_FIELD, &DUE_DATE)?],
        )?,
        FieldSpec::new(
            BILL_TO_FIELD,
            Normalization::CommaJoin,
            vec![
                text(BILL_TO_FIELD, &BILL_TO_BLOCK)?,
                text(BILL_TO_FIELD, &BILL_TO_NEXT_LINE)?,
                text(BILL_TO_FIELD, &BILL_TO_INLINE)?,
            ],
        )?,
        FieldSpec::new(
            PO_NUMBER_FIELD,
            Normalization::Collapse,
            vec![
                text(PO_NUMBER_FIELD, &PO_NUMBER)?,
                text(PO_NUMBER_FIELD, &PO_SERVICES_LINE)?,
                table(PO_NUMBER_FIELD, "PO Number", TableValue::AfterDelimiter(':'))?,
                table(PO_NUMBER_FIELD, "PO Number", TableValue::NextRow(0))?,
            ],
        )?,
        FieldSpec::new(
            TOTAL_AMOUNT_DUE_FIELD,
            Normalization::Collapse,
            vec![
                text(TOTAL_AMOUNT_DUE_FIELD, &TOTAL_AMOUNT_DUE)?,
                text(TOTAL_AMOUNT_DUE_FIELD, &TOTAL_AMOUNT_DUE_LOOSE)?,
            ],
        )?,
    ])
}

/// Built-in field set in its configuration-file form.
pub fn builtin_field_configs() -> Vec<FieldSpecConfig> {
    BUILTIN_FIELDS.iter().map(FieldSpec::to_config).collect()
}
