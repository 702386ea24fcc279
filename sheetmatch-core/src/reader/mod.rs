//! Excel/ODS file reader using calamine

use anyhow::{Context, Result};
use calamine::{Data, Range, Reader, Sheets, open_workbook_auto};
use chrono::NaiveDateTime;
use std::io::{Read, Seek};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub mod workbook;

pub use workbook::{CellValue, Table};

/// Minimum column count of the device table
pub const PRIMARY_MIN_COLUMNS: usize = 5;
/// Minimum column count of the model lookup table
pub const SECONDARY_MIN_COLUMNS: usize = 3;

/// Problems with the shape of a spreadsheet
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("Sheet '{sheet}' not found in {}", path.display())]
    SheetNotFound { path: PathBuf, sheet: String },

    #[error("Column '{column}' not found in sheet '{sheet}'.")]
    ColumnNotFound { sheet: String, column: String },

    #[error("No data found in sheet '{sheet}'.")]
    EmptySheet { sheet: String },

    #[error("Sheet '{sheet}' has {found} columns, at least {expected} are required")]
    TooFewColumns {
        sheet: String,
        found: usize,
        expected: usize,
    },
}

/// Read a sheet as a table; the first row is the header
pub fn read_table<P: AsRef<Path>>(path: P, sheet_name: &str) -> Result<Table> {
    let path = path.as_ref();
    let mut workbook: Sheets<_> = open_workbook_auto(path)
        .with_context(|| format!("Failed to open workbook: {}", path.display()))?;
    read_sheet(&mut workbook, path, sheet_name)
}

/// Read a data table that must be non-empty and at least `min_columns` wide
pub fn read_data_table<P: AsRef<Path>>(
    path: P,
    sheet_name: &str,
    min_columns: usize,
) -> Result<Table> {
    let table = read_table(path, sheet_name)?;
    check_data_table(&table, min_columns)?;
    Ok(table)
}

/// Read one column of a sheet as a sorted, de-duplicated identifier list
pub fn read_identifiers<P: AsRef<Path>>(
    path: P,
    sheet_name: &str,
    column: &str,
) -> Result<Vec<String>> {
    let table = read_table(path, sheet_name)?;
    Ok(identifiers_from_table(&table, column)?)
}

fn read_sheet<RS: Read + Seek>(
    workbook: &mut Sheets<RS>,
    path: &Path,
    sheet_name: &str,
) -> Result<Table> {
    if !workbook.sheet_names().iter().any(|name| name == sheet_name) {
        return Err(ReadError::SheetNotFound {
            path: path.to_path_buf(),
            sheet: sheet_name.to_string(),
        }
        .into());
    }

    let range = workbook
        .worksheet_range(sheet_name)
        .with_context(|| format!("Failed to read sheet '{}' in {}", sheet_name, path.display()))?;

    Ok(table_from_range(sheet_name, &range))
}

/// Convert a calamine range into a table, keeping absolute column positions
pub fn table_from_range(sheet_name: &str, range: &Range<Data>) -> Table {
    let Some((_, start_col)) = range.start() else {
        return Table::new(sheet_name, Vec::new(), Vec::new());
    };

    let mut rows = range.rows().map(|row| {
        // Ranges start at the first used cell; pad so column 0 is always "A"
        let mut cells = vec![CellValue::Empty; start_col as usize];
        cells.extend(row.iter().map(parse_cell_value));
        cells
    });

    let header = rows
        .next()
        .map(|cells| cells.iter().map(ToString::to_string).collect())
        .unwrap_or_default();

    Table::new(sheet_name, header, rows.collect())
}

/// Validate that a table has data rows and enough columns
pub fn check_data_table(table: &Table, min_columns: usize) -> Result<(), ReadError> {
    if table.is_empty() {
        return Err(ReadError::EmptySheet {
            sheet: table.sheet.clone(),
        });
    }

    let width = table.width();
    if width < min_columns {
        return Err(ReadError::TooFewColumns {
            sheet: table.sheet.clone(),
            found: width,
            expected: min_columns,
        });
    }

    Ok(())
}

/// Extract the identifiers of a header-named column
pub fn identifiers_from_table(table: &Table, column: &str) -> Result<Vec<String>, ReadError> {
    let col = table
        .column_index(column)
        .ok_or_else(|| ReadError::ColumnNotFound {
            sheet: table.sheet.clone(),
            column: column.to_string(),
        })?;

    let mut identifiers: Vec<String> = table
        .column_values(col)
        .map(ToString::to_string)
        .collect();
    identifiers.sort();
    identifiers.dedup();

    Ok(identifiers)
}

fn parse_cell_value(data: &Data) -> CellValue {
    match data {
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::String(s) => CellValue::from_text(s),
        Data::Bool(b) => CellValue::Boolean(*b),
        Data::Error(e) => CellValue::Error(e.to_string()),
        Data::Empty => CellValue::Empty,
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(value) => CellValue::DateTime(value),
            None => CellValue::Number(dt.as_f64()),
        },
        Data::DateTimeIso(s) => NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
            .map(CellValue::DateTime)
            .unwrap_or_else(|_| CellValue::Text(s.clone())),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
    }
}
