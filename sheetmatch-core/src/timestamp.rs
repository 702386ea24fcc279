//! Record timestamps and their ordering

use crate::reader::CellValue;
use crate::reader::workbook::DATETIME_FORMAT;
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use std::cmp::Ordering;
use std::fmt;

const DATETIME_INPUT_FORMATS: [&str; 2] = [DATETIME_FORMAT, "%Y-%m-%dT%H:%M:%S"];
const DATE_INPUT_FORMATS: [&str; 2] = ["%Y-%m-%d", "%m/%d/%Y"];

/// A timestamp as it appears in the report, plus its parsed value when known.
///
/// Two timestamps compare chronologically when both parse, otherwise by their
/// text. Zero-padded `MM/DD/YYYY` values therefore still order correctly
/// across years.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timestamp {
    raw: String,
    value: Option<NaiveDateTime>,
}

impl Timestamp {
    pub fn parse(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let value = parse_datetime(raw.trim());
        Self { raw, value }
    }

    pub fn from_cell(cell: &CellValue) -> Self {
        match cell.as_datetime() {
            Some(value) => Self {
                raw: cell.to_string(),
                value: Some(value),
            },
            None => Self::parse(cell.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn value(&self) -> Option<NaiveDateTime> {
        self.value
    }

    pub fn is_later_than(&self, other: &Timestamp) -> bool {
        self.compare(other) == Ordering::Greater
    }

    pub fn compare(&self, other: &Timestamp) -> Ordering {
        match (self.value, other.value) {
            (Some(a), Some(b)) => a.cmp(&b),
            _ => self.raw.cmp(&other.raw),
        }
    }

    /// Year of a timestamp rendered exactly as `YYYY-MM-DD HH:MM:SS`
    pub fn report_year(&self) -> Option<i32> {
        NaiveDateTime::parse_from_str(&self.raw, DATETIME_FORMAT)
            .ok()
            .map(|dt| dt.year())
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    DATETIME_INPUT_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATE_INPUT_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}
