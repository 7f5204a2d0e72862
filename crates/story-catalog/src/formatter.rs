//! Table rendering: aligned text and Markdown.

use std::fmt;
use std::str::FromStr;

use crate::table::TableModel;

/// Output format for a catalog listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Table,
    Markdown,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "table" => Ok(Self::Table),
            "markdown" | "md" => Ok(Self::Markdown),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown format '{other}'")),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Table => "table",
            Self::Markdown => "markdown",
            Self::Json => "json",
        })
    }
}

/// Render the visible rows of `table` as aligned text columns.
#[must_use]
pub fn format_table(table: &TableModel) -> String {
    let rows: Vec<&[String]> = table.visible_rows().map(|r| r.values()).collect();
    if rows.is_empty() {
        return "(no stories)".to_string();
    }

    let header = table.header();
    let mut widths: Vec<usize> = header.iter().map(|c| c.chars().count()).collect();
    for row in &rows {
        for (i, val) in row.iter().enumerate() {
            widths[i] = widths[i].max(val.chars().count());
        }
    }

    let mut output = String::new();

    let cells: Vec<String> = header
        .iter()
        .enumerate()
        .map(|(i, c)| pad(c, widths[i]))
        .collect();
    output.push_str(cells.join(" | ").trim_end());
    output.push('\n');

    let sep: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    output.push_str(&sep.join("-+-"));
    output.push('\n');

    for row in rows {
        let cells: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(i, v)| pad(v, widths[i]))
            .collect();
        output.push_str(cells.join(" | ").trim_end());
        output.push('\n');
    }

    output
}

/// Render the visible rows of `table` as a Markdown table.
#[must_use]
pub fn format_markdown(table: &TableModel) -> String {
    let mut rows = table.visible_rows().peekable();
    if rows.peek().is_none() {
        return "*No stories*\n".to_string();
    }

    let header = table.header();
    let mut output = String::new();

    output.push_str("| ");
    output.push_str(&header.join(" | "));
    output.push_str(" |\n");

    output.push_str("| ");
    let seps: Vec<&str> = header.iter().map(|_| "---").collect();
    output.push_str(&seps.join(" | "));
    output.push_str(" |\n");

    for row in rows {
        let vals: Vec<String> = row
            .values()
            .iter()
            .map(|v| v.trim().replace('|', "\\|"))
            .collect();
        output.push_str("| ");
        output.push_str(&vals.join(" | "));
        output.push_str(" |\n");
    }

    output
}

// `{:width$}` pads by chars, which keeps multibyte titles aligned.
fn pad(value: &str, width: usize) -> String {
    format!("{value:width$}")
}
