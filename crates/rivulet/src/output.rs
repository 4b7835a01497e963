//! Output formatting: plain, JSON, compact JSON.
//!
//! Plain emits one value per line; the JSON formats render the structured
//! form of the same data.

use std::io::{self, Write};

use serde_json::Value;

use crate::cli::OutputFormat;

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a list of values: one per line for `plain`, the JSON form otherwise.
pub fn render_list(format: &OutputFormat, lines: &[String], json: &Value) -> String {
    match format {
        OutputFormat::Plain => lines.join("\n"),
        OutputFormat::Json => render_json(json, false),
        OutputFormat::JsonCompact => render_json(json, true),
    }
}

/// Render a single document. Plain falls back to pretty JSON.
pub fn render_document(format: &OutputFormat, json: &Value) -> String {
    render_json(json, matches!(format, OutputFormat::JsonCompact))
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

fn render_json(data: &Value, compact: bool) -> String {
    if compact {
        data.to_string()
    } else {
        format!("{data:#}")
    }
}
