//! Spreadsheet decoding and text rendering.
//!
//! A workbook is decoded into one [`Sheet`] per worksheet. The first row of
//! each sheet provides the column headers; every following non-blank row
//! becomes a record keyed by those headers, with empty cells kept as
//! `null`. Date cells are rendered as display strings.
//!
//! Decoding failures are not errors for the caller: [`render_tabular`]
//! returns [`TabularRender::Fallback`] so the download can fall back to
//! returning the raw bytes.

use std::collections::HashSet;
use std::fmt;
use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};
use chrono::Timelike;
use serde_json::{Map, Number, Value};
use thiserror::Error;
use tracing::{debug, warn};

/// Header used for blank header cells.
const EMPTY_HEADER: &str = "__EMPTY";

#[derive(Error, Debug)]
pub enum SpreadsheetError {
    #[error("not a readable spreadsheet: {0}")]
    Unreadable(#[from] calamine::Error),

    #[error("cannot read sheet \"{name}\": {source}")]
    Sheet {
        name: String,
        #[source]
        source: calamine::Error,
    },
}

/// One worksheet.
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub name: String,
    /// Data rows keyed by header. Rows may differ in keys only if headers do.
    pub rows: Vec<Map<String, Value>>,
    /// Height of the occupied range, header row included.
    pub row_count: usize,
    /// Width of the occupied range.
    pub column_count: usize,
}

/// Decoded workbook.
#[derive(Debug, Clone, PartialEq)]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }
}

/// Decode `.xlsx`, `.xls`, `.xlsb` or `.ods` bytes.
pub fn decode(bytes: &[u8]) -> Result<Workbook, SpreadsheetError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;

    let mut sheets = Vec::new();
    for name in workbook.sheet_names() {
        let range = workbook
            .worksheet_range(&name)
            .map_err(|source| SpreadsheetError::Sheet {
                name: name.clone(),
                source,
            })?;
        sheets.push(decode_sheet(name, &range));
    }

    debug!(sheets = sheets.len(), "Spreadsheet decoded");
    Ok(Workbook { sheets })
}

fn decode_sheet(name: String, range: &Range<Data>) -> Sheet {
    // A sheet without an occupied range counts as a single empty cell.
    let (row_count, column_count) = if range.is_empty() {
        (1, 1)
    } else {
        range.get_size()
    };

    let mut rows_iter = range.rows();
    let headers = rows_iter.next().map(header_names).unwrap_or_default();

    let rows = rows_iter
        .filter(|row| row.iter().any(|cell| !matches!(cell, Data::Empty)))
        .map(|row| {
            headers
                .iter()
                .enumerate()
                .map(|(i, header)| {
                    let value = row.get(i).map(cell_value).unwrap_or(Value::Null);
                    (header.clone(), value)
                })
                .collect::<Map<String, Value>>()
        })
        .collect();

    Sheet {
        name,
        rows,
        row_count,
        column_count,
    }
}

/// Header names from the first row. Blank headers become `__EMPTY`,
/// repeated names get `_1`, `_2`, ... suffixes.
fn header_names(row: &[Data]) -> Vec<String> {
    let mut seen = HashSet::new();
    row.iter()
        .map(|cell| {
            let text = cell_text(cell);
            let base = if text.trim().is_empty() {
                EMPTY_HEADER.to_string()
            } else {
                text
            };

            let mut candidate = base.clone();
            let mut suffix = 1;
            while seen.contains(&candidate) {
                candidate = format!("{}_{}", base, suffix);
                suffix += 1;
            }
            seen.insert(candidate.clone());
            candidate
        })
        .collect()
}

fn cell_value(cell: &Data) -> Value {
    match cell {
        Data::Empty => Value::Null,
        Data::String(s) => Value::String(s.clone()),
        Data::Bool(b) => Value::Bool(*b),
        Data::Int(i) => Value::from(*i),
        Data::Float(f) => float_value(*f),
        Data::DateTime(_) | Data::DateTimeIso(_) | Data::DurationIso(_) | Data::Error(_) => {
            Value::String(cell_text(cell))
        }
    }
}

fn float_value(f: f64) -> Value {
    if f.fract() == 0.0 && f.abs() < 9_007_199_254_740_992.0 {
        Value::from(f as i64)
    } else {
        Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(f.to_string()))
    }
}

/// Display text of a cell.
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Bool(b) => b.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => float_value(*f).to_string(),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(ts) if ts.hour() == 0 && ts.minute() == 0 && ts.second() == 0 => {
                ts.format("%Y-%m-%d").to_string()
            }
            Some(ts) => ts.format("%Y-%m-%d %H:%M:%S").to_string(),
            None => dt.as_f64().to_string(),
        },
        Data::Error(e) => e.to_string(),
    }
}

/// Render a workbook as readable text.
pub fn format_workbook(workbook: &Workbook) -> String {
    let mut lines = vec![
        format!("Excel File: {} sheet(s)", workbook.sheet_count()),
        String::new(),
    ];

    for sheet in &workbook.sheets {
        lines.push(format!(
            "=== Sheet: \"{}\" ({} rows, {} columns) ===",
            sheet.name, sheet.row_count, sheet.column_count
        ));
        if sheet.rows.is_empty() {
            lines.push("(empty sheet)".to_string());
        } else {
            lines.push(serde_json::to_string_pretty(&sheet.rows).unwrap_or_default());
        }
        lines.push(String::new());
    }

    lines.join("\n")
}

/// Why a spreadsheet could not be rendered as a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackReason {
    pub message: String,
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Outcome of rendering spreadsheet bytes.
#[derive(Debug, Clone, PartialEq)]
pub enum TabularRender {
    /// Formatted table text
    Decoded(String),
    /// Bytes must be returned raw
    Fallback(FallbackReason),
}

/// Decode and format, turning decode failures into a fallback.
pub fn render_tabular(bytes: &[u8]) -> TabularRender {
    match decode(bytes) {
        Ok(workbook) => TabularRender::Decoded(format_workbook(&workbook)),
        Err(e) => {
            warn!(error = %e, "Spreadsheet decode failed, falling back to raw content");
            TabularRender::Fallback(FallbackReason {
                message: e.to_string(),
            })
        }
    }
}
