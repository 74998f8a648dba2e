//! File interchange for csvman.
//!
//! Turns uploaded CSV and spreadsheet files into typed
//! [`ImportBatch`](csvman_core::ImportBatch)es and writes query results back
//! out as CSV.
//!
//! # Import
//!
//! ```no_run
//! use std::path::Path;
//! use csvman_interchange::normalize_path;
//!
//! let batch = normalize_path(Path::new("orders.xlsx"), None).unwrap();
//! println!("{:?}", batch.head(5));
//! ```
//!
//! # Export
//!
//! ```no_run
//! use std::path::Path;
//! use csvman_core::TabularResult;
//! use csvman_interchange::export_csv;
//!
//! let result = TabularResult::new(vec!["id".into()]);
//! let path = export_csv(&result, Path::new("exports")).unwrap();
//! println!("wrote {}", path.display());
//! ```

mod error;
mod export;
mod format;
mod import;
mod spreadsheet;

pub use error::{InterchangeError, Result};
pub use export::{export_csv, export_filename, write_csv};
pub use format::ImportFormat;
pub use import::{normalize, normalize_path};
pub use spreadsheet::DATETIME_FORMAT;
