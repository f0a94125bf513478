//! Regex patterns for the built-in invoice fields.
//!
//! Every pattern captures the field value in group 1.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Invoice number: rest of the labelled line
    pub static ref INVOICE_NUMBER: Regex = Regex::new(
        r"Invoice Number:[ \t]*(\S.*)"
    ).unwrap();

    // Due date in MM/DD/YYYY form
    pub static ref DUE_DATE: Regex = Regex::new(
        r"Due Date:\s*(\d{2}/\d{2}/\d{4})"
    ).unwrap();

    // Bill-to address block, terminated by a blank line
    pub static ref BILL_TO_BLOCK: Regex = Regex::new(
        r"(?s)Bill To:[ \t]*\r?\n(.+?)\r?\n[ \t]*\r?\n"
    ).unwrap();

    // Bill-to party on the line after the label
    pub static ref BILL_TO_NEXT_LINE: Regex = Regex::new(
        r"Bill To:[ \t]*\r?\n\s*(\S.*)"
    ).unwrap();

    // Bill-to party on the label line
    pub static ref BILL_TO_INLINE: Regex = Regex::new(
        r"Bill To:[ \t]*(\S.*)"
    ).unwrap();

    // Purchase order number on a labelled line
    pub static ref PO_NUMBER: Regex = Regex::new(
        r"PO Number:[ \t]*(\S.*)"
    ).unwrap();

    // Some vendors put the PO reference on the services line
    pub static ref PO_SERVICES_LINE: Regex = Regex::new(
        r"Software Development services:\s*([\w\-/\.]+)"
    ).unwrap();

    // Total amount due, dollar sign required
    pub static ref TOTAL_AMOUNT_DUE: Regex = Regex::new(
        r"Total Amount Due\s*\$([\d,]+\.\d{2})"
    ).unwrap();

    // Looser total: optional colon and currency sign
    pub static ref TOTAL_AMOUNT_DUE_LOOSE: Regex = Regex::new(
        r"(?i)Total Amount Due:?[ \t]*\$?[ \t]*([\d,]+\.\d{2})"
    ).unwrap();
}
