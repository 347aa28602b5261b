use std::io::{self, Write};

use anyhow::Result;
use colored::Colorize;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table, presets};
use serde::Serialize;

use crate::runner::{FileAction, TransformerResults};

/// Destination for the per-transform summary.
pub trait ReportSink {
    fn report(&mut self, transform: &str, results: &TransformerResults) -> Result<()>;
}

/// Build the per-file summary table for one transform.
pub fn render_table(results: &TransformerResults) -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_BORDERS_ONLY)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(
            ["File", "Action", "Additions", "Deletions", "Error"]
                .into_iter()
                .map(|h| Cell::new(h).add_attribute(Attribute::Bold)),
        );

    for (file, result) in results.changes.iter() {
        let color = match result.action {
            FileAction::Modified => Color::Green,
            FileAction::Skipped => Color::Yellow,
            FileAction::Error => Color::Red,
            FileAction::Unchanged => Color::DarkGrey,
        };
        table.add_row(vec![
            Cell::new(file),
            Cell::new(result.action).fg(color),
            Cell::new(result.additions),
            Cell::new(result.deletions),
            Cell::new(result.error.as_deref().unwrap_or("None")),
        ]);
    }

    table
}

/// Human-readable tables.
pub struct TableReport<W: Write> {
    out: W,
}

impl TableReport<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> TableReport<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ReportSink for TableReport<W> {
    fn report(&mut self, transform: &str, results: &TransformerResults) -> Result<()> {
        writeln!(self.out)?;
        writeln!(self.out, "{}", transform.bold())?;
        if results.changes.is_empty() {
            writeln!(self.out, "  {}", "No files were changed".dimmed())?;
        } else {
            writeln!(self.out, "{}", render_table(results))?;
        }
        if let Some(error) = &results.fatal_error {
            writeln!(self.out, "{} {error}", "Error:".red())?;
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct JsonLine<'a> {
    transform: &'a str,
    #[serde(flatten)]
    results: &'a TransformerResults,
}

/// One JSON object per line, for scripting.
pub struct JsonReport<W: Write> {
    out: W,
}

impl JsonReport<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> JsonReport<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ReportSink for JsonReport<W> {
    fn report(&mut self, transform: &str, results: &TransformerResults) -> Result<()> {
        serde_json::to_writer(&mut self.out, &JsonLine { transform, results })?;
        writeln!(self.out)?;
        Ok(())
    }
}
