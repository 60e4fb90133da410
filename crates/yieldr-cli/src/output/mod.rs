pub mod csv_out;
pub mod minimal;
pub mod table;

use colored::Colorize;
use serde_json::Value;

use crate::OutputFormat;

/// Render a command result in the requested format.
///
/// Json and table carry the envelope warnings themselves. Csv and minimal
/// output stay machine-readable, so their warnings (an unconverged YTM, an
/// undiscounted zero-rate price) go to stderr instead.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => match serde_json::to_string_pretty(value) {
            Ok(s) => println!("{s}"),
            Err(e) => eprintln!("JSON serialization error: {e}"),
        },
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => {
            csv_out::print_csv(value);
            report_warnings(value);
        }
        OutputFormat::Minimal => {
            minimal::print_minimal(value);
            report_warnings(value);
        }
    }
}

fn report_warnings(value: &Value) {
    for warning in envelope_warnings(value) {
        eprintln!("{}: {}", "warning".yellow().bold(), warning);
    }
}

fn envelope_warnings(value: &Value) -> Vec<&str> {
    value
        .get("warnings")
        .and_then(Value::as_array)
        .map(|ws| ws.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default()
}
