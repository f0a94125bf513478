//! Extract command - pull fields out of a single invoice file.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use serde::Serialize;
use tracing::{debug, info};

use invx_core::document::load_document;
use invx_core::models::document::DocumentFormat;
use invx_core::models::result::{ExtractedField, ExtractionResult, MatchSource};
use invx_core::output::{CsvOutput, DocumentRecord};
use invx_core::FieldExtractor;

use super::load_config;

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Input file (PDF or DOCX)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Placeholder for fields that were not found
    #[arg(long)]
    sentinel: Option<String>,

    /// Show which strategy matched each field (text format)
    #[arg(long)]
    show_sources: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    file: String,
    format: DocumentFormat,
    fields: &'a [ExtractedField],
}

pub async fn run(args: ExtractArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    // Check input file exists
    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let mut extraction = config.extraction;
    if let Some(sentinel) = args.sentinel.clone() {
        extraction.sentinel = sentinel;
    }
    let extractor = extraction.build_extractor()?;

    info!("Processing file: {}", args.input.display());
    let document = load_document(&args.input)?;
    let result = extractor.extract(&document);

    for field in result.missing() {
        debug!("No strategy matched {}", field);
    }

    let output = match args.format {
        OutputFormat::Json => format_json(&args, document.format, &result)?,
        OutputFormat::Csv => format_csv(&args, &extractor, result)?,
        OutputFormat::Text => format_text(&result, args.show_sources),
    };

    // Write output
    if let Some(output_path) = &args.output {
        if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        print!("{}", output);
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

fn format_json(
    args: &ExtractArgs,
    format: DocumentFormat,
    result: &ExtractionResult,
) -> anyhow::Result<String> {
    let output = JsonOutput {
        file: args.input.display().to_string(),
        format,
        fields: result.fields(),
    };
    Ok(serde_json::to_string_pretty(&output)? + "\n")
}

fn format_csv(
    args: &ExtractArgs,
    extractor: &FieldExtractor,
    result: ExtractionResult,
) -> anyhow::Result<String> {
    let record = DocumentRecord {
        path: args.input.clone(),
        result,
    };
    Ok(CsvOutput::new(extractor).render(&[record])?)
}

fn format_text(result: &ExtractionResult, show_sources: bool) -> String {
    let width = result
        .fields()
        .iter()
        .map(|f| f.name.chars().count())
        .max()
        .unwrap_or(0);

    let mut output = String::new();
    for field in result.fields() {
        let label = format!("{}:", field.name);
        output.push_str(&format!("{:<width$} {}", label, field.value, width = width + 1));
        if show_sources {
            output.push_str(&format!("  ({})", describe_source(field.source)));
        }
        output.push('\n');
    }
    output
}

fn describe_source(source: Option<MatchSource>) -> String {
    match source {
        Some(MatchSource::Text { strategy }) => format!("strategy {}, text", strategy + 1),
        Some(MatchSource::Table {
            strategy,
            table,
            row,
            cell,
        }) => format!(
            "strategy {}, table {} row {} cell {}",
            strategy + 1,
            table + 1,
            row + 1,
            cell + 1
        ),
        None => "not found".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use invx_core::models::document::{Document, Table};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_format_text_aligns_labels() {
        let doc = Document::new(DocumentFormat::Pdf, "Invoice Number: 12\nDue Date: 01/02/2025");
        let result = FieldExtractor::builtin().extract(&doc);
        let text = format_text(&result, false);

        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("Invoice Number:   12"));
        assert_eq!(lines.next(), Some("Due Date:         01/02/2025"));
        assert_eq!(text.lines().count(), 5);
    }

    #[test]
    fn test_describe_sources() {
        let doc = Document::new(DocumentFormat::Docx, "Invoice Number: 12")
            .with_tables(vec![Table::from_rows([vec!["Qty", "PO Number: 9"]])]);
        let result = FieldExtractor::builtin().extract(&doc);

        let text = format_text(&result, true);
        assert!(text.contains("(strategy 1, text)"));
        assert!(text.contains("(strategy 3, table 1 row 1 cell 2)"));
        assert!(text.contains("(not found)"));
    }
}
