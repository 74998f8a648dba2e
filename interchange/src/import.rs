//! Normalizes uploaded files into an [`ImportBatch`].
//!
//! Both formats are first reduced to a grid of strings (a header row plus
//! data rows of the same width). The grid then goes through one shared
//! pipeline:
//!
//! 1. header cleanup: blank names become `Unnamed: <index>`, repeated names
//!    get `.1`, `.2`, ... suffixes;
//! 2. per-column type inference over the non-empty cells;
//! 3. conversion of every cell to a typed [`Value`].

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csvman_core::{ColumnKind, ImportBatch, TabularResult, Value};
use tracing::{debug, info};

use crate::error::{InterchangeError, Result};
use crate::format::ImportFormat;
use crate::spreadsheet;

/// A header row and the data rows below it, all as text.
pub(crate) type Grid = (Vec<String>, Vec<Vec<String>>);

/// Reads `reader` in the given format and returns a typed batch.
///
/// # Errors
///
/// - [`InterchangeError::EmptyInput`] if there is no header row.
/// - [`InterchangeError::Parse`] if a CSV row has more fields than the header.
/// - [`InterchangeError::CsvError`] / [`InterchangeError::SpreadsheetError`]
///   for malformed input.
///
/// # Examples
///
/// ```
/// use csvman_core::Value;
/// use csvman_interchange::{ImportFormat, normalize};
///
/// let batch = normalize("id,amount\n1,10.50\n2,\n".as_bytes(), ImportFormat::Csv).unwrap();
/// assert_eq!(batch.columns, vec!["id", "amount"]);
/// assert_eq!(batch.rows[0], vec![Value::Integer(1), Value::Real(10.5)]);
/// assert_eq!(batch.rows[1][1], Value::Null);
/// ```
pub fn normalize<R: Read>(reader: R, format: ImportFormat) -> Result<ImportBatch> {
    let (header, rows) = match format {
        ImportFormat::Csv => read_csv(reader)?,
        ImportFormat::Spreadsheet => spreadsheet::read_first_sheet(reader)?,
    };
    let batch = build_batch(header, rows);
    info!(
        format = %format,
        columns = batch.column_count(),
        rows = batch.row_count(),
        "Normalized input"
    );
    Ok(batch)
}

/// Opens and normalizes a file.
///
/// The format comes from `declared_mime` when one is given, otherwise from
/// the file extension.
pub fn normalize_path(path: &Path, declared_mime: Option<&str>) -> Result<ImportBatch> {
    let format = match declared_mime {
        Some(mime) => ImportFormat::from_mime(mime)?,
        None => ImportFormat::from_path(path)?,
    };
    debug!(path = %path.display(), format = %format, "Reading upload");
    normalize(File::open(path)?, format)
}

fn read_csv<R: Read>(reader: R) -> Result<Grid> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);
    let mut records = reader.records();

    let header: Vec<String> = match records.next() {
        Some(record) => record?.iter().map(String::from).collect(),
        None => return Err(InterchangeError::EmptyInput),
    };
    let width = header.len();

    let mut rows = Vec::new();
    for record in records {
        let record = record?;
        if record.len() > width {
            return Err(InterchangeError::Parse {
                line: record.position().map_or(0, |p| p.line()),
                message: format!("expected {width} fields, saw {}", record.len()),
            });
        }
        let mut row: Vec<String> = record.iter().map(String::from).collect();
        row.resize(width, String::new());
        rows.push(row);
    }
    Ok((header, rows))
}

/// Applies header cleanup and type inference to a grid.
pub(crate) fn build_batch(header: Vec<String>, rows: Vec<Vec<String>>) -> ImportBatch {
    let columns = normalize_headers(&header);
    let kinds: Vec<Option<ColumnKind>> = (0..columns.len())
        .map(|i| infer_kind(rows.iter().map(|row| row[i].as_str())))
        .collect();

    let rows = rows
        .into_iter()
        .map(|row| {
            row.into_iter()
                .zip(&kinds)
                .map(|(cell, kind)| typed_value(cell, *kind))
                .collect()
        })
        .collect();
    TabularResult::new(columns).with_rows(rows)
}

/// Makes header names non-blank and unique (ignoring ASCII case).
fn normalize_headers(header: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut suffixes: HashMap<String, usize> = HashMap::new();
    let mut names = Vec::with_capacity(header.len());

    for (index, raw) in header.iter().enumerate() {
        let raw = if index == 0 {
            raw.trim_start_matches('\u{feff}')
        } else {
            raw.as_str()
        };
        let base = if raw.trim().is_empty() {
            format!("Unnamed: {index}")
        } else {
            raw.to_string()
        };

        let mut name = base.clone();
        while seen.contains(&name.to_ascii_lowercase()) {
            let n = suffixes.entry(base.to_ascii_lowercase()).or_insert(0);
            *n += 1;
            name = format!("{base}.{n}");
        }
        seen.insert(name.to_ascii_lowercase());
        names.push(name);
    }
    names
}

/// Kind of a column, or `None` if every cell is empty.
fn infer_kind<'a>(cells: impl Iterator<Item = &'a str>) -> Option<ColumnKind> {
    cells
        .filter(|cell| !cell.is_empty())
        .map(cell_kind)
        .reduce(ColumnKind::join)
}

fn cell_kind(cell: &str) -> ColumnKind {
    let trimmed = cell.trim();
    if trimmed.parse::<i64>().is_ok() {
        ColumnKind::Integer
    } else if trimmed.parse::<f64>().is_ok_and(f64::is_finite) {
        ColumnKind::Real
    } else if trimmed.eq_ignore_ascii_case("true") || trimmed.eq_ignore_ascii_case("false") {
        ColumnKind::Boolean
    } else {
        ColumnKind::Text
    }
}

fn typed_value(cell: String, kind: Option<ColumnKind>) -> Value {
    if cell.is_empty() {
        return Value::Null;
    }
    let trimmed = cell.trim();
    match kind {
        Some(ColumnKind::Integer) => match trimmed.parse::<i64>() {
            Ok(i) => Value::Integer(i),
            Err(_) => Value::Text(cell),
        },
        Some(ColumnKind::Real) => match trimmed.parse::<f64>() {
            Ok(r) => Value::Real(r),
            Err(_) => Value::Text(cell),
        },
        Some(ColumnKind::Boolean) => Value::Boolean(trimmed.eq_ignore_ascii_case("true")),
        _ => Value::Text(cell),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn csv(input: &str) -> Result<ImportBatch> {
        normalize(input.as_bytes(), ImportFormat::Csv)
    }

    fn strings(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_inference_per_column() {
        let batch = csv("id,price,active,name\n1,2.5,TRUE,Widget\n2,3,false, Gadget \n").unwrap();
        assert_eq!(
            batch.column_kinds(),
            vec![
                ColumnKind::Integer,
                ColumnKind::Real,
                ColumnKind::Boolean,
                ColumnKind::Text
            ]
        );
        assert_eq!(
            batch.rows[1],
            vec![
                Value::Integer(2),
                Value::Real(3.0),
                Value::Boolean(false),
                Value::Text(" Gadget ".into()),
            ]
        );
    }

    #[test]
    fn test_numbers_are_trimmed() {
        let batch = csv("n\n 7 \n-3\n").unwrap();
        assert_eq!(
            batch.rows,
            vec![vec![Value::Integer(7)], vec![Value::Integer(-3)]]
        );
    }

    #[test]
    fn test_mixed_column_keeps_text_verbatim() {
        let batch = csv("code\n007\nA7\n").unwrap();
        assert_eq!(
            batch.rows,
            vec![vec![Value::Text("007".into())], vec![Value::Text("A7".into())]]
        );
    }

    #[test]
    fn test_empty_cells_are_null() {
        let batch = csv("a,b\n,x\n1,\n").unwrap();
        assert_eq!(batch.rows[0][0], Value::Null);
        assert_eq!(batch.rows[1][1], Value::Null);
        assert_eq!(batch.rows[1][0], Value::Integer(1));
    }

    #[test]
    fn test_short_rows_are_padded() {
        let batch = csv("a,b,c\n1\n").unwrap();
        assert_eq!(
            batch.rows,
            vec![vec![Value::Integer(1), Value::Null, Value::Null]]
        );
    }

    #[test]
    fn test_long_row_is_parse_error() {
        match csv("a,b\n1,2\n3,4,5\n").unwrap_err() {
            InterchangeError::Parse { line, .. } => assert_eq!(line, 3),
            other => panic!("expected Parse, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_input() {
        assert!(matches!(csv(""), Err(InterchangeError::EmptyInput)));
    }

    #[test]
    fn test_header_only() {
        let batch = csv("a,b\n").unwrap();
        assert_eq!(batch.columns, vec!["a", "b"]);
        assert!(batch.is_empty());
    }

    #[test]
    fn test_quoted_fields() {
        let batch = csv("note\n\"x,y\"\n\"say \"\"hi\"\"\"\n").unwrap();
        assert_eq!(
            batch.rows,
            vec![
                vec![Value::Text("x,y".into())],
                vec![Value::Text("say \"hi\"".into())]
            ]
        );
    }

    #[test]
    fn test_normalize_headers() {
        assert_eq!(
            normalize_headers(&strings(&["a", "", "A", "a", "  "])),
            vec!["a", "Unnamed: 1", "A.1", "a.2", "Unnamed: 4"]
        );
        assert_eq!(
            normalize_headers(&strings(&["x", "x.1", "x"])),
            vec!["x", "x.1", "x.2"]
        );
        assert_eq!(normalize_headers(&strings(&["\u{feff}id"])), vec!["id"]);
    }

    #[test]
    fn test_integer_overflow_widens_to_real() {
        let batch = csv("big\n99999999999999999999\n1\n").unwrap();
        assert_eq!(batch.column_kinds(), vec![ColumnKind::Real]);
    }

    #[test]
    fn test_nan_and_inf_are_text() {
        let batch = csv("v\nNaN\ninf\n").unwrap();
        assert_eq!(batch.column_kinds(), vec![ColumnKind::Text]);
    }
}
