use std::io::IsTerminal;

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

/// Print one result record: serialized whole for JSON, field-by-field for
/// the human formats.
pub fn print_record(format: OutputFormat, record: &impl Serialize, fields: &[(&str, String)]) {
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(record).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["FIELD", "VALUE"]);
            for (name, value) in fields {
                table.add_row(vec![name.to_string(), value.clone()]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            let line: Vec<String> = fields
                .iter()
                .map(|(name, value)| format!("{name}={value}"))
                .collect();
            println!("{}", line.join(" "));
        }
    }
}

/// Print a homogeneous listing with one row per entry.
pub fn print_listing(
    format: OutputFormat,
    records: &impl Serialize,
    header: &[&str],
    rows: Vec<Vec<String>>,
) {
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(records).unwrap_or_else(|_| "[]".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(header.to_vec());
            for row in rows {
                table.add_row(row);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for row in rows {
                println!("{}", row.join(" "));
            }
        }
    }
}
