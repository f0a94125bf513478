//! Word (.docx) reading: body paragraphs and tables from `word/document.xml`.

use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::debug;
use zip::result::ZipError;
use zip::ZipArchive;

use super::{DocumentReader, Result};
use crate::error::DocumentError;
use crate::models::document::{Document, DocumentFormat, Table};

const DOCUMENT_PART: &str = "word/document.xml";

/// Word document reader.
///
/// Body paragraphs (those outside tables) become the document text, one
/// trimmed paragraph per line, empty paragraphs included. Each table becomes
/// rows of cells; a cell's text is its paragraphs joined by newlines.
/// Paragraphs inside text boxes are skipped.
#[derive(Debug, Clone, Default)]
pub struct DocxReader;

impl DocxReader {
    pub fn new() -> Self {
        Self
    }

    /// Read the main document part out of the package.
    fn document_xml(&self, data: &[u8]) -> Result<String> {
        let mut archive = ZipArchive::new(Cursor::new(data))?;
        let mut part = match archive.by_name(DOCUMENT_PART) {
            Ok(part) => part,
            Err(ZipError::FileNotFound) => {
                return Err(DocumentError::MissingPart(DOCUMENT_PART.to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        // The entry header sizes are untrusted
        let mut xml = String::new();
        part.read_to_string(&mut xml)?;
        Ok(xml)
    }
}

impl DocumentReader for DocxReader {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::Docx
    }

    fn read(&self, data: &[u8]) -> Result<Document> {
        let xml = self.document_xml(data)?;
        let (paragraphs, tables) = parse_document_xml(&xml)?;
        debug!(
            "Parsed Word document: {} paragraphs, {} tables",
            paragraphs.len(),
            tables.len()
        );
        Ok(Document::new(DocumentFormat::Docx, paragraphs.join("\n")).with_tables(tables))
    }
}

/// A table being assembled while its XML is streamed.
struct OpenTable {
    /// Slot reserved in the output so parents precede nested tables.
    index: usize,
    rows: Vec<Vec<String>>,
    row: Option<Vec<String>>,
    cell: Option<Vec<String>>,
}

#[derive(Default)]
struct BodyParser {
    paragraphs: Vec<String>,
    tables: Vec<Table>,
    open_tables: Vec<OpenTable>,
    paragraph: String,
    paragraph_depth: usize,
    in_run: bool,
    in_text: bool,
}

impl BodyParser {
    fn start_paragraph(&mut self) {
        self.paragraph_depth += 1;
        if self.paragraph_depth == 1 {
            self.paragraph.clear();
        }
    }

    fn end_paragraph(&mut self) {
        if self.paragraph_depth == 1 {
            let text = self.paragraph.trim().to_string();
            match self.open_tables.last_mut() {
                Some(table) => {
                    if let Some(cell) = table.cell.as_mut() {
                        cell.push(text);
                    }
                }
                None => self.paragraphs.push(text),
            }
        }
        self.paragraph_depth = self.paragraph_depth.saturating_sub(1);
    }

    fn push_text(&mut self, text: &str) {
        if self.paragraph_depth == 1 {
            self.paragraph.push_str(text);
        }
    }

    fn start_table(&mut self) {
        self.open_tables.push(OpenTable {
            index: self.tables.len(),
            rows: Vec::new(),
            row: None,
            cell: None,
        });
        self.tables.push(Table::default());
    }

    fn end_table(&mut self) {
        if let Some(open) = self.open_tables.pop() {
            self.tables[open.index] = Table::new(open.rows);
        }
    }

    fn start_row(&mut self) {
        if let Some(table) = self.open_tables.last_mut() {
            table.row = Some(Vec::new());
        }
    }

    fn end_row(&mut self) {
        if let Some(table) = self.open_tables.last_mut() {
            if let Some(row) = table.row.take() {
                table.rows.push(row);
            }
        }
    }

    fn start_cell(&mut self) {
        if let Some(table) = self.open_tables.last_mut() {
            table.cell = Some(Vec::new());
        }
    }

    fn end_cell(&mut self) {
        if let Some(table) = self.open_tables.last_mut() {
            let text = table
                .cell
                .take()
                .map(|paragraphs| paragraphs.join("\n").trim().to_string())
                .unwrap_or_default();
            table.row.get_or_insert_with(Vec::new).push(text);
        }
    }

    fn finish(mut self) -> (Vec<String>, Vec<Table>) {
        // Unterminated tables in truncated XML still keep their rows.
        while !self.open_tables.is_empty() {
            self.end_table();
        }
        (self.paragraphs, self.tables)
    }
}

/// Stream WordprocessingML into body paragraphs and tables.
pub(crate) fn parse_document_xml(xml: &str) -> Result<(Vec<String>, Vec<Table>)> {
    let mut reader = Reader::from_str(xml);
    let mut body = BodyParser::default();

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.name().as_ref() {
                b"w:p" => body.start_paragraph(),
                b"w:r" => body.in_run = true,
                b"w:t" => body.in_text = true,
                b"w:tbl" => body.start_table(),
                b"w:tr" => body.start_row(),
                b"w:tc" => body.start_cell(),
                _ => {}
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"w:p" => {
                    body.start_paragraph();
                    body.end_paragraph();
                }
                b"w:tc" => {
                    body.start_cell();
                    body.end_cell();
                }
                b"w:tab" if body.in_run => body.push_text("\t"),
                b"w:br" | b"w:cr" if body.in_run => body.push_text("\n"),
                _ => {}
            },
            Event::End(e) => match e.name().as_ref() {
                b"w:p" => body.end_paragraph(),
                b"w:r" => body.in_run = false,
                b"w:t" => body.in_text = false,
                b"w:tbl" => body.end_table(),
                b"w:tr" => body.end_row(),
                b"w:tc" => body.end_cell(),
                _ => {}
            },
            Event::Text(t) if body.in_text => {
                let text = t.unescape().map_err(quick_xml::Error::from)?;
                body.push_text(&text);
            }
            Event::CData(t) if body.in_text => {
                body.push_text(&String::from_utf8_lossy(&t));
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(body.finish())
}


#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use zip::write::SimpleFileOptions;
    use zip::{CompressionMethod, ZipWriter};

    fn wrap(body: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:body>{}</w:body>
</w:document>"#,
            body
        )
    }

    fn para(text: &str) -> String {
        format!(r#"<w:p><w:r><w:t xml:space="preserve">{}</w:t></w:r></w:p>"#, text)
    }

    fn cell(text: &str) -> String {
        format!("<w:tc>{}</w:tc>", para(text))
    }

    fn package(xml: &str) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
        writer.start_file(DOCUMENT_PART, options).unwrap();
        writer.write_all(xml.as_bytes()).unwrap();
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_paragraphs_become_lines() {
        let xml = wrap(&format!(
            "{}<w:p/>{}",
            para("  Invoice Number: INV-7 "),
            para("Due Date: 03/15/2024")
        ));
        let (paragraphs, tables) = parse_document_xml(&xml).unwrap();

        assert_eq!(paragraphs, vec!["Invoice Number: INV-7", "", "Due Date: 03/15/2024"]);
        assert!(tables.is_empty());
    }

    #[test]
    fn test_runs_tabs_breaks_and_entities() {
        let xml = wrap(
            r#"<w:p>
                 <w:pPr><w:tabs><w:tab w:val="left" w:pos="720"/></w:tabs></w:pPr>
                 <w:r><w:t>Bill</w:t></w:r><w:r><w:t xml:space="preserve"> To:</w:t><w:br/></w:r>
                 <w:r><w:t>Smith &amp; Sons</w:t><w:tab/><w:t>Ltd</w:t></w:r>
               </w:p>"#,
        );
        let (paragraphs, _) = parse_document_xml(&xml).unwrap();
        assert_eq!(paragraphs, vec!["Bill To:\nSmith & Sons\tLtd"]);
    }

    #[test]
    fn test_tables_are_separate_from_body() {
        let xml = wrap(&format!(
            "{}<w:tbl><w:tr>{}{}{}</w:tr><w:tr>{}<w:tc/>{}</w:tr></w:tbl>{}",
            para("Before"),
            cell("PO Number: PO-998"),
            cell("Qty"),
            cell("Price"),
            cell("1"),
            cell("5.00"),
            para("After"),
        ));
        let (paragraphs, tables) = parse_document_xml(&xml).unwrap();

        assert_eq!(paragraphs, vec!["Before", "After"]);
        assert_eq!(
            tables,
            vec![Table::from_rows([
                vec!["PO Number: PO-998", "Qty", "Price"],
                vec!["1", "", "5.00"],
            ])]
        );
    }

    #[test]
    fn test_multi_paragraph_cell() {
        let xml = wrap(&format!(
            "<w:tbl><w:tr><w:tc>{}{}</w:tc></w:tr></w:tbl>",
            para("PO Number:"),
            para("PO-1")
        ));
        let (_, tables) = parse_document_xml(&xml).unwrap();
        assert_eq!(tables[0].cell(0, 0), Some("PO Number:\nPO-1"));
    }

    #[test]
    fn test_nested_table_follows_parent() {
        let inner = format!("<w:tbl><w:tr>{}</w:tr></w:tbl>", cell("inner"));
        let xml = wrap(&format!(
            "<w:tbl><w:tr><w:tc>{}{}</w:tc>{}</w:tr></w:tbl>",
            para("outer"),
            inner,
            cell("right")
        ));
        let (_, tables) = parse_document_xml(&xml).unwrap();

        assert_eq!(
            tables,
            vec![
                Table::from_rows([vec!["outer", "right"]]),
                Table::from_rows([vec!["inner"]]),
            ]
        );
    }

    #[test]
    fn test_text_box_paragraphs_skipped() {
        let xml = wrap(
            r#"<w:p><w:r><w:t>Visible</w:t></w:r><w:r><w:pict><w:txbxContent>
                 <w:p><w:r><w:t>Hidden</w:t></w:r></w:p>
               </w:txbxContent></w:pict></w:r></w:p>"#,
        );
        let (paragraphs, _) = parse_document_xml(&xml).unwrap();
        assert_eq!(paragraphs, vec!["Visible"]);
    }

    #[test]
    fn test_read_package() {
        let xml = wrap(&format!(
            "{}<w:tbl><w:tr>{}</w:tr></w:tbl>",
            para("Invoice Number: INV-1"),
            cell("PO Number: 55")
        ));
        let doc = DocxReader::new().read(&package(&xml)).unwrap();

        assert_eq!(doc.format, DocumentFormat::Docx);
        assert_eq!(doc.text, "Invoice Number: INV-1");
        assert_eq!(doc.tables.len(), 1);
    }

    #[test]
    fn test_missing_document_part() {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file("word/styles.xml", SimpleFileOptions::default())
            .unwrap();
        let data = writer.finish().unwrap().into_inner();

        let err = DocxReader::new().read(&data).unwrap_err();
        assert!(matches!(err, DocumentError::MissingPart(_)));
    }

    #[test]
    fn test_oversized_entry_header_is_not_trusted() {
        let xml = wrap(&para("Invoice Number: Z-1"));
        let data = fixtures::package_claiming_size(xml.as_bytes(), 0xFFFF_FFFF_FFFF_FFF0);

        match DocxReader::new().read(&data) {
            Ok(doc) => assert_eq!(doc.text, "Invoice Number: Z-1"),
            Err(e) => assert!(matches!(e, DocumentError::Archive(_) | DocumentError::Io(_))),
        }
    }

    #[test]
    fn test_not_a_zip() {
        let err = DocxReader::new().read(b"plain text").unwrap_err();
        assert!(matches!(err, DocumentError::Archive(_)));
    }
}
