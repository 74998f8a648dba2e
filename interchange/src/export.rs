//! CSV export of query results.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use csvman_core::TabularResult;
use tracing::info;

use crate::error::Result;

/// File name for an export made at `now`: `query_result_<YYYYMMDD_HHMMSS>.csv`.
pub fn export_filename(now: NaiveDateTime) -> String {
    format!("query_result_{}.csv", now.format("%Y%m%d_%H%M%S"))
}

/// Writes `result` as CSV: one header row, no index column.
///
/// Nulls are written as empty fields; other values use their
/// [`Display`](csvman_core::Value) form. A result without columns writes
/// nothing.
pub fn write_csv<W: Write>(result: &TabularResult, writer: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    if !result.columns.is_empty() {
        writer.write_record(&result.columns)?;
        for row in &result.rows {
            writer.write_record(row.iter().map(|value| value.to_string()))?;
        }
    }
    writer.flush()?;
    Ok(())
}

/// Writes `result` to a timestamped file in `directory` and returns its path.
///
/// The directory is created if needed. Two exports within the same second
/// share a name; the later one overwrites the earlier.
pub fn export_csv(result: &TabularResult, directory: &Path) -> Result<PathBuf> {
    fs::create_dir_all(directory)?;
    let path = directory.join(export_filename(Local::now().naive_local()));
    write_csv(result, File::create(&path)?)?;
    info!(path = %path.display(), rows = result.row_count(), "Exported query result");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use csvman_core::Value;

    #[test]
    fn test_export_filename() {
        let now = NaiveDate::from_ymd_opt(2024, 3, 7)
            .unwrap()
            .and_hms_opt(9, 5, 1)
            .unwrap();
        assert_eq!(export_filename(now), "query_result_20240307_090501.csv");
    }

    #[test]
    fn test_write_csv() {
        let result = TabularResult::new(vec!["id".into(), "amount".into(), "note".into()])
            .with_rows(vec![
                vec![Value::Integer(1), Value::Real(20.0), Value::Text("a,b".into())],
                vec![Value::Integer(2), Value::Null, Value::Boolean(true)],
            ]);
        let mut out = Vec::new();
        write_csv(&result, &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "id,amount,note\n1,20.0,\"a,b\"\n2,,True\n"
        );
    }

    #[test]
    fn test_write_csv_without_columns() {
        let result = TabularResult {
            rows_affected: Some(3),
            ..TabularResult::default()
        };
        let mut out = Vec::new();
        write_csv(&result, &mut out).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_export_csv_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("exports");
        let result = TabularResult::new(vec!["n".into()]).with_rows(vec![vec![Value::Integer(5)]]);

        let path = export_csv(&result, &target).unwrap();
        assert_eq!(path.parent().unwrap(), target);
        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("query_result_") && name.ends_with(".csv"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "n\n5\n");
    }
}
