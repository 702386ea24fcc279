//! Table data structures

use chrono::NaiveDateTime;
use std::fmt;

/// Format used when a date-time cell is rendered as text
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A worksheet read as a header row plus data rows
#[derive(Debug, Clone, Default)]
pub struct Table {
    pub sheet: String,
    pub header: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl Table {
    pub fn new(sheet: impl Into<String>, header: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        Self {
            sheet: sheet.into(),
            header,
            rows,
        }
    }

    /// Build a table from plain text rows (header excluded)
    pub fn from_text_rows(sheet: &str, header: &[&str], rows: &[&[&str]]) -> Self {
        let rows = rows
            .iter()
            .map(|row| row.iter().map(|s| CellValue::from_text(s)).collect())
            .collect();
        Self::new(
            sheet,
            header.iter().map(|s| s.to_string()).collect(),
            rows,
        )
    }

    /// Number of columns, counting the widest of header and data rows
    pub fn width(&self) -> usize {
        self.rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(self.header.len()))
            .max()
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Find a column by its header text
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.header.iter().position(|h| h == name)
    }

    /// Get a cell, treating short rows as padded with empty cells
    pub fn cell(&self, row: usize, col: usize) -> &CellValue {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&CellValue::Empty)
    }

    /// Rendered text of a cell
    pub fn text(&self, row: usize, col: usize) -> String {
        self.cell(row, col).to_string()
    }

    /// Non-empty values of a column, in row order
    pub fn column_values(&self, col: usize) -> impl Iterator<Item = &CellValue> {
        self.rows
            .iter()
            .filter_map(move |r| r.get(col))
            .filter(|v| !v.is_empty())
    }
}

/// Cell value types
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Number(f64),
    Text(String),
    Boolean(bool),
    DateTime(NaiveDateTime),
    Error(String),
}

impl CellValue {
    pub fn from_text(s: &str) -> Self {
        if s.is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(s.to_string())
        }
    }

    /// Check if the cell is empty
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            CellValue::DateTime(dt) => Some(*dt),
            _ => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            // Whole numbers print without a trailing ".0"
            CellValue::Number(n) if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 => {
                write!(f, "{}", *n as i64)
            }
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Text(s) => f.write_str(s),
            CellValue::Boolean(b) => f.write_str(if *b { "TRUE" } else { "FALSE" }),
            CellValue::DateTime(dt) => write!(f, "{}", dt.format(DATETIME_FORMAT)),
            CellValue::Error(e) => f.write_str(e),
        }
    }
}
