//! Output formatting for query results and table descriptions.

use csvman_core::{TableInfo, TabularResult, Value};
use serde::Serialize;

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    Yaml,
    Markdown,
    Csv,
}

/// A described table together with its first rows.
#[derive(Debug, Serialize)]
pub struct TableSummary {
    #[serde(flatten)]
    pub info: TableInfo,
    pub sample: TabularResult,
}

/// Formats a query result in the requested output format.
pub fn format_result(result: &TabularResult, format: OutputFormat) -> Result<String, String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(result)
            .map(|s| s + "\n")
            .map_err(|e| format!("JSON serialization failed: {e}")),
        OutputFormat::Yaml => {
            serde_yaml::to_string(result).map_err(|e| format!("YAML serialization failed: {e}"))
        }
        OutputFormat::Markdown => Ok(result_to_markdown(result)),
        OutputFormat::Table => Ok(result_to_table(result)),
        OutputFormat::Csv => {
            let mut buf = Vec::new();
            csvman_interchange::write_csv(result, &mut buf)
                .map_err(|e| format!("CSV serialization failed: {e}"))?;
            String::from_utf8(buf).map_err(|e| format!("CSV serialization failed: {e}"))
        }
    }
}

/// Formats table summaries in the requested output format.
pub fn format_summaries(summaries: &[TableSummary], format: OutputFormat) -> Result<String, String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(summaries)
            .map(|s| s + "\n")
            .map_err(|e| format!("JSON serialization failed: {e}")),
        OutputFormat::Yaml => {
            serde_yaml::to_string(summaries).map_err(|e| format!("YAML serialization failed: {e}"))
        }
        OutputFormat::Markdown => Ok(summaries.iter().map(summary_to_markdown).collect()),
        OutputFormat::Table | OutputFormat::Csv => Ok(summaries
            .iter()
            .map(summary_to_table)
            .collect::<Vec<_>>()
            .join("\n")),
    }
}

fn display_cell(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Blob(bytes) => format!("<{} bytes>", bytes.len()),
        other => other.to_string().replace('\n', "\\n"),
    }
}

fn result_to_table(result: &TabularResult) -> String {
    if result.columns.is_empty() {
        return String::new();
    }
    let cells: Vec<Vec<String>> = result
        .rows
        .iter()
        .map(|row| row.iter().map(display_cell).collect())
        .collect();
    let widths: Vec<usize> = result
        .columns
        .iter()
        .enumerate()
        .map(|(i, name)| {
            cells
                .iter()
                .filter_map(|row| row.get(i))
                .map(|c| c.chars().count())
                .chain(std::iter::once(name.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    push_row(&mut out, result.columns.iter().map(String::as_str), &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    push_row(&mut out, rule.iter().map(String::as_str), &widths);
    for row in &cells {
        push_row(&mut out, row.iter().map(String::as_str), &widths);
    }
    out
}

fn push_row<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>, widths: &[usize]) {
    let line: Vec<String> = cells
        .zip(widths)
        .map(|(cell, width)| format!("{cell:<width$}"))
        .collect();
    out.push_str(line.join("  ").trim_end());
    out.push('\n');
}

fn result_to_markdown(result: &TabularResult) -> String {
    if result.columns.is_empty() {
        return String::new();
    }
    let escape = |s: &str| s.replace('|', "\\|");

    let mut out = String::new();
    let header: Vec<String> = result.columns.iter().map(|c| escape(c)).collect();
    out.push_str(&format!("| {} |\n", header.join(" | ")));
    out.push_str(&format!("|{}\n", "---|".repeat(result.columns.len())));
    for row in &result.rows {
        let cells: Vec<String> = row.iter().map(|v| escape(&display_cell(v))).collect();
        out.push_str(&format!("| {} |\n", cells.join(" | ")));
    }
    out
}

fn summary_to_table(summary: &TableSummary) -> String {
    let info = &summary.info;
    let mut out = String::new();

    out.push_str(&format!("Table: {}  Rows: {}\n", info.name, info.row_count));
    out.push_str("\nColumns:\n");
    let max_name = info
        .columns
        .iter()
        .map(|c| c.name.chars().count())
        .max()
        .unwrap_or(4);
    for column in &info.columns {
        out.push_str(&format!(
            "  {:<width$}  {}\n",
            column.name,
            column.declared_type,
            width = max_name
        ));
    }

    if !summary.sample.is_empty() {
        out.push_str(&format!("\nFirst {} rows:\n", summary.sample.row_count()));
        out.push_str(&result_to_table(&summary.sample));
    }
    out
}

fn summary_to_markdown(summary: &TableSummary) -> String {
    let info = &summary.info;
    let mut out = String::new();

    out.push_str(&format!("# {}\n\n", info.name));
    out.push_str(&format!("**Rows:** {}\n\n", info.row_count));
    out.push_str("| Column | Type |\n");
    out.push_str("|--------|------|\n");
    for column in &info.columns {
        out.push_str(&format!("| `{}` | {} |\n", column.name, column.declared_type));
    }
    out.push('\n');

    if !summary.sample.is_empty() {
        out.push_str("## Sample\n\n");
        out.push_str(&result_to_markdown(&summary.sample));
        out.push('\n');
    }
    out
}
