//! CSV report writer

use crate::report::Report;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Column headers of the CSV report
pub const HEADERS: [&str; 5] = ["Identifier", "All Items", "Category1", "Category2", "Category3"];

/// Write the report as CSV to any sink
pub fn write_report<W: Write>(sink: W, report: &Report) -> Result<()> {
    write_rows(sink, &report.rows())
}

/// Write CSV rows under the fixed header
pub fn write_rows<W: Write>(sink: W, rows: &[[String; 5]]) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Necessary)
        .from_writer(sink);

    writer.write_record(HEADERS)?;
    for row in rows {
        writer.write_record(row)?;
    }
    writer.flush()?;

    Ok(())
}

/// Create (or overwrite) a CSV file with the report
pub fn write_report_to_path<P: AsRef<Path>>(path: P, report: &Report) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)
        .with_context(|| format!("Failed to create output file: {}", path.display()))?;
    write_report(file, report)
        .with_context(|| format!("Failed to write report to {}", path.display()))
}
