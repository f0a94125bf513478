//! Integration tests for the batch pipeline.
//!
//! Word packages are assembled on the fly with `zip::ZipWriter`, so no
//! fixture files are needed.

use std::fs;
use std::io::{Cursor, Write};
use std::path::Path;

use invx_core::{BatchConfig, BatchProcessor, FieldExtractor, InvxConfig, InvxError};
use pretty_assertions::assert_eq;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

fn para(text: &str) -> String {
    format!(r#"<w:p><w:r><w:t xml:space="preserve">{}</w:t></w:r></w:p>"#, text)
}

fn row(cells: &[&str]) -> String {
    let cells: String = cells
        .iter()
        .map(|c| format!("<w:tc>{}</w:tc>", para(c)))
        .collect();
    format!("<w:tr>{}</w:tr>", cells)
}

fn write_docx(path: &Path, paragraphs: &[&str], rows: &[&[&str]]) {
    let mut body: String = paragraphs.iter().map(|p| para(p)).collect();
    if !rows.is_empty() {
        body.push_str("<w:tbl>");
        body.extend(rows.iter().map(|r| row(r)));
        body.push_str("</w:tbl>");
    }
    let xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{}</w:body></w:document>"#,
        body
    );

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    writer
        .start_file("word/document.xml", SimpleFileOptions::default())
        .unwrap();
    writer.write_all(xml.as_bytes()).unwrap();
    let data = writer.finish().unwrap().into_inner();
    fs::write(path, data).unwrap();
}

fn batch_config(input: &Path, output: &Path) -> BatchConfig {
    BatchConfig {
        input_dir: input.to_path_buf(),
        output_path: output.to_path_buf(),
        ..BatchConfig::default()
    }
}

fn read_rows(path: &Path) -> Vec<Vec<String>> {
    let mut reader = csv::Reader::from_path(path).unwrap();
    reader
        .records()
        .map(|r| r.unwrap().iter().map(str::to_string).collect())
        .collect()
}

#[test]
fn unreadable_document_is_skipped_not_fatal() {
    let input = tempfile::tempdir().unwrap();
    let out_dir = tempfile::tempdir().unwrap();
    let output = out_dir.path().join("csv").join("invoices_data.csv");

    write_docx(
        &input.path().join("a_first.docx"),
        &[
            "Invoice Number: INV-2024-001",
            "Due Date: 03/15/2024",
            "Bill To: Acme Corp",
            "Total Amount Due $1,250.00",
        ],
        &[&["PO Number: PO-998", "Qty", "Price"]],
    );
    fs::write(input.path().join("b_broken.pdf"), b"%PDF-1.4 truncated").unwrap();
    write_docx(
        &input.path().join("c_second.docx"),
        &["Invoice Number: INV-2024-002"],
        &[&["Qty", "Price"], &["2", "10.00"]],
    );

    let processor = BatchProcessor::new(
        batch_config(input.path(), &output),
        FieldExtractor::builtin(),
    );
    let report = processor.run().unwrap();

    assert_eq!(report.records.len(), 2);
    assert_eq!(report.failures.len(), 1);
    assert!(report.failures[0].path.ends_with("b_broken.pdf"));

    let header = csv::Reader::from_path(&output)
        .unwrap()
        .headers()
        .unwrap()
        .clone();
    assert_eq!(
        header.iter().collect::<Vec<_>>(),
        vec!["Invoice Number", "Due Date", "Bill To", "PO Number", "Total Amount Due"]
    );

    assert_eq!(
        read_rows(&output),
        vec![
            vec!["INV-2024-001", "03/15/2024", "Acme Corp", "PO-998", "1,250.00"],
            vec!["INV-2024-002", "NOT FOUND", "NOT FOUND", "NOT FOUND", "NOT FOUND"],
        ]
    );
}

#[test]
fn multi_line_po_number_and_skip_empty() {
    let input = tempfile::tempdir().unwrap();
    let output = input.path().join("out.csv");

    write_docx(
        &input.path().join("multi.docx"),
        &["Bill To:", "Globex Inc.", "500 Oak Ave", "", "Payment terms: net 30"],
        &[&["PO Number", "Date"], &["PO-4410", "01/02/2025"]],
    );
    write_docx(&input.path().join("empty.docx"), &["Thank you!"], &[]);

    let mut config = InvxConfig::default();
    config.batch = batch_config(input.path(), &output);
    config.batch.skip_empty = true;
    config.batch.include_filename = true;
    config.extraction.sentinel = String::new();

    let processor =
        BatchProcessor::new(config.batch.clone(), config.extraction.build_extractor().unwrap());
    let report = processor.run().unwrap();

    assert_eq!(report.skipped.len(), 1);
    assert_eq!(
        read_rows(&output),
        vec![vec!["multi.docx", "", "", "Globex Inc., 500 Oak Ave", "PO-4410", ""]]
    );
}

#[test]
fn unwritable_output_is_fatal() {
    let input = tempfile::tempdir().unwrap();
    write_docx(&input.path().join("a.docx"), &["Invoice Number: 1"], &[]);

    // A regular file where the output directory should be.
    let blocker = input.path().join("blocker");
    fs::write(&blocker, b"").unwrap();

    let processor = BatchProcessor::new(
        batch_config(input.path(), &blocker.join("out.csv")),
        FieldExtractor::builtin(),
    );
    assert!(matches!(processor.run(), Err(InvxError::Io(_))));
}

#[test]
fn repeated_runs_are_identical() {
    let input = tempfile::tempdir().unwrap();
    let output = input.path().join("out").join("result.csv");
    write_docx(
        &input.path().join("a.docx"),
        &["Invoice Number: X-1", "Total Amount Due $3.50"],
        &[&["PO Number: 77"]],
    );

    let processor = BatchProcessor::new(
        batch_config(input.path(), &output),
        FieldExtractor::builtin(),
    );
    processor.run().unwrap();
    let first = fs::read_to_string(&output).unwrap();
    processor.run().unwrap();
    let second = fs::read_to_string(&output).unwrap();

    assert_eq!(first, second);
}
