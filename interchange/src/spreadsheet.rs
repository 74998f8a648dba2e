//! Spreadsheet reading.
//!
//! The first worksheet is turned into the same text grid the CSV reader
//! produces, so spreadsheet and CSV uploads share header cleanup and type
//! inference. Nothing is written to disk.

use std::io::{Cursor, Read};

use calamine::{Data, Reader, open_workbook_auto_from_rs};
use csvman_core::format_real;
use tracing::debug;

use crate::error::{InterchangeError, Result};
use crate::import::Grid;

/// Text format for date and time cells.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Largest magnitude at which a whole float is still written as an integer.
const MAX_WHOLE_FLOAT: f64 = 9_007_199_254_740_992.0;

/// Reads the first worksheet of any workbook format calamine detects.
pub(crate) fn read_first_sheet<R: Read>(mut reader: R) -> Result<Grid> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;

    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;
    let sheet = workbook.sheet_names().first().cloned().unwrap_or_default();
    let range = match workbook.worksheet_range_at(0) {
        Some(range) => range?,
        None => return Err(InterchangeError::EmptyInput),
    };
    debug!(sheet = %sheet, rows = range.height(), columns = range.width(), "Read worksheet");

    let mut rows = range
        .rows()
        .map(|row| row.iter().map(cell_text).collect::<Vec<String>>());
    let header = rows.next().ok_or(InterchangeError::EmptyInput)?;
    Ok((header, rows.collect()))
}

/// Renders one cell as CSV text.
///
/// Workbooks store every number as a float, so whole values are written as
/// integers.
pub(crate) fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Int(i) => i.to_string(),
        Data::Float(f) => float_text(*f),
        Data::String(s) => s.clone(),
        Data::Bool(true) => "True".to_string(),
        Data::Bool(false) => "False".to_string(),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(datetime) if dt.is_datetime() => datetime.format(DATETIME_FORMAT).to_string(),
            _ => float_text(dt.as_f64()),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Error(_) | Data::Empty => String::new(),
    }
}

fn float_text(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() <= MAX_WHOLE_FLOAT {
        format!("{}", value as i64)
    } else {
        format_real(value)
    }
}
