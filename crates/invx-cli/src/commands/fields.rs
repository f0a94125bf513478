//! Fields command - list the compiled field set.

use console::style;

use invx_core::extraction::{FieldSpec, Normalization, Strategy, TableValue};

use super::load_config;

pub async fn run(config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let extractor = config.extraction.build_extractor()?;

    for (i, field) in extractor.fields().iter().enumerate() {
        if i > 0 {
            println!();
        }
        print!("{}", describe_field(field));
    }

    println!();
    println!(
        "Missing fields are written as {}",
        style(format!("{:?}", extractor.sentinel())).dim()
    );

    Ok(())
}

fn describe_field(field: &FieldSpec) -> String {
    let normalize = match field.normalization() {
        Normalization::Collapse => "collapse",
        Normalization::CommaJoin => "comma-join",
    };

    let mut out = format!(
        "{} {}\n",
        style(field.name()).bold(),
        style(format!("[{}]", normalize)).dim()
    );
    for (i, strategy) in field.strategies().iter().enumerate() {
        let line = match strategy {
            Strategy::Text(pattern) => format!("text   /{}/", pattern.as_str()),
            Strategy::Table(rule) => format!(
                "table  \"{}\" -> {}",
                rule.label(),
                describe_table_value(rule.value())
            ),
        };
        out.push_str(&format!("  {}. {}\n", i + 1, line));
    }
    out
}

fn describe_table_value(value: TableValue) -> String {
    match value {
        TableValue::AfterDelimiter(delim) => format!("after '{}' in the same cell", delim),
        TableValue::NextCell => "next cell".to_string(),
        TableValue::NextRow(col) => format!("next row, column {}", col + 1),
    }
}
