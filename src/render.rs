//! Presentation of execution results for the CLI.

use colored::Colorize;
use maungql_core::{ExecutionResult, ResultSet, Value};

/// Render a result as pretty JSON
pub fn to_json(result: &ExecutionResult) -> serde_json::Result<String> {
    serde_json::to_string_pretty(result)
}

/// Render a result for a terminal
pub fn render(result: &ExecutionResult) -> String {
    match result {
        ExecutionResult::Status(message) => message.green().to_string(),
        ExecutionResult::Rows(set) => render_table(set),
    }
}

fn cell(value: &Value) -> String {
    value.to_string()
}

/// Plain-text table with a header rule, followed by the row count message.
pub fn render_table(set: &ResultSet) -> String {
    let cells: Vec<Vec<String>> = set
        .rows
        .iter()
        .map(|row| row.iter().map(cell).collect())
        .collect();

    let mut widths: Vec<usize> = set.columns.iter().map(|c| c.chars().count()).collect();
    for row in &cells {
        for (i, text) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(i) {
                *width = (*width).max(text.chars().count());
            }
        }
    }

    let pad = |text: &str, width: usize| {
        let fill = width.saturating_sub(text.chars().count());
        format!("{}{}", text, " ".repeat(fill))
    };

    let mut out = String::new();
    let header: Vec<String> = set
        .columns
        .iter()
        .zip(&widths)
        .map(|(name, &w)| pad(name, w))
        .collect();
    out.push_str(&header.join(" | ").cyan().bold().to_string());
    out.push('\n');

    let rule: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
    out.push_str(&rule.join("-+-").dimmed().to_string());
    out.push('\n');

    for (row, values) in cells.iter().zip(&set.rows) {
        let line: Vec<String> = row
            .iter()
            .zip(values)
            .zip(&widths)
            .map(|((text, value), &w)| {
                let padded = pad(text, w);
                if value.is_null() {
                    padded.dimmed().to_string()
                } else {
                    padded
                }
            })
            .collect();
        out.push_str(&line.join(" | "));
        out.push('\n');
    }

    out.push_str(&set.message.dimmed().to_string());
    out
}
