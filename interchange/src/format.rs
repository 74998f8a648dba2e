//! Input format detection.

use std::fmt;
use std::path::Path;

use crate::error::{InterchangeError, Result};

/// Supported upload formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportFormat {
    /// Comma-separated text with a header row.
    Csv,
    /// First worksheet of an xlsx, xlsm, xlsb, xls or ods workbook.
    Spreadsheet,
}

const CSV_MIMES: &[&str] = &[
    "text/csv",
    "application/csv",
    "text/x-csv",
    "text/comma-separated-values",
    "text/plain",
];

const SPREADSHEET_MIMES: &[&str] = &[
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    "application/vnd.ms-excel",
    "application/vnd.ms-excel.sheet.macroenabled.12",
    "application/vnd.oasis.opendocument.spreadsheet",
];

impl ImportFormat {
    /// Detects the format from a declared mime type.
    ///
    /// Parameters such as `; charset=utf-8` are ignored, and so is case.
    pub fn from_mime(mime: &str) -> Result<Self> {
        let essence = mime
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        if CSV_MIMES.contains(&essence.as_str()) {
            Ok(ImportFormat::Csv)
        } else if SPREADSHEET_MIMES.contains(&essence.as_str()) {
            Ok(ImportFormat::Spreadsheet)
        } else {
            Err(InterchangeError::UnsupportedFormat(mime.to_string()))
        }
    }

    /// Detects the format from a file extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "csv" | "txt" => Ok(ImportFormat::Csv),
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Ok(ImportFormat::Spreadsheet),
            _ => Err(InterchangeError::UnsupportedFormat(
                path.display().to_string(),
            )),
        }
    }
}

impl fmt::Display for ImportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportFormat::Csv => f.write_str("csv"),
            ImportFormat::Spreadsheet => f.write_str("spreadsheet"),
        }
    }
}
