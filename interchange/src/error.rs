//! Error types for import and export.

use thiserror::Error;

/// Errors raised while reading or writing tabular files.
#[derive(Debug, Error)]
pub enum InterchangeError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Spreadsheet error: {0}")]
    SpreadsheetError(#[from] calamine::Error),

    /// Neither the declared mime type nor the file extension is supported.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// The input has no header row.
    #[error("Input is empty: no header row")]
    EmptyInput,

    #[error("Parse error at line {line}: {message}")]
    Parse { line: u64, message: String },
}

/// Convenience alias for results with [`InterchangeError`].
pub type Result<T> = std::result::Result<T, InterchangeError>;
