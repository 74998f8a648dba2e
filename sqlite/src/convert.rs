//! Conversion between [`Value`] cells and SQLite values.

use csvman_core::{TabularResult, Value};
use rusqlite::types::{Value as SqlValue, ValueRef};
use rusqlite::{Params, Statement};

/// Converts a cell into an owned SQLite value for binding.
///
/// Booleans bind as the integers `1` and `0`.
pub(crate) fn to_sql_value(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Integer(i) => SqlValue::Integer(*i),
        Value::Real(f) => SqlValue::Real(*f),
        Value::Boolean(b) => SqlValue::Integer(i64::from(*b)),
        Value::Text(s) => SqlValue::Text(s.clone()),
        Value::Blob(b) => SqlValue::Blob(b.clone()),
    }
}

/// Converts a borrowed SQLite value into a cell.
pub(crate) fn from_value_ref(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Integer(i),
        ValueRef::Real(f) => Value::Real(f),
        ValueRef::Text(s) => Value::Text(String::from_utf8_lossy(s).into_owned()),
        ValueRef::Blob(b) => Value::Blob(b.to_vec()),
    }
}

/// Runs a prepared statement and collects every row.
pub(crate) fn read_rows<P: Params>(
    stmt: &mut Statement<'_>,
    params: P,
) -> rusqlite::Result<TabularResult> {
    let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
    let width = columns.len();
    let mut result = TabularResult::new(columns);

    let mut rows = stmt.query(params)?;
    while let Some(row) = rows.next()? {
        let mut values = Vec::with_capacity(width);
        for idx in 0..width {
            values.push(from_value_ref(row.get_ref(idx)?));
        }
        result.rows.push(values);
    }
    Ok(result)
}

/// Returns `true` if SQLite's numeric `CAST` would convert `text` without
/// losing it.
///
/// SQLite never fails a cast; `CAST('abc' AS REAL)` silently yields `0.0`.
/// Text counts as numeric when, after trimming, it parses as a finite number.
pub(crate) fn is_numeric_text(text: &str) -> bool {
    text.trim()
        .parse::<f64>()
        .map(f64::is_finite)
        .unwrap_or(false)
}

/// Returns `true` if `CAST(text AS INTEGER)` keeps the full value.
///
/// The integer cast reads only the leading integer digits, so `'10.50'`
/// becomes `10` and `'1e3'` becomes `1`. Whole decimals such as `'10.0'`
/// are kept.
pub(crate) fn is_integral_text(text: &str) -> bool {
    let trimmed = text.trim();
    if trimmed.parse::<i64>().is_ok() {
        return true;
    }
    if trimmed.contains(['e', 'E']) {
        return false;
    }
    trimmed
        .parse::<f64>()
        .map(is_integral_real)
        .unwrap_or(false)
}

/// Returns `true` if `value` converts to an `i64` without truncation.
pub(crate) fn is_integral_real(value: f64) -> bool {
    value.is_finite() && value.fract() == 0.0 && value.abs() < 9.223_372_036_854_776e18
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn test_boolean_binds_as_integer() {
        assert_eq!(to_sql_value(&Value::Boolean(true)), SqlValue::Integer(1));
        assert_eq!(to_sql_value(&Value::Boolean(false)), SqlValue::Integer(0));
    }

    #[test]
    fn test_read_rows_maps_storage_classes() {
        let conn = Connection::open_in_memory().unwrap();
        let mut stmt = conn
            .prepare("SELECT 1 AS i, 2.5 AS r, 'x' AS t, NULL AS n, x'00ff' AS b")
            .unwrap();
        let result = read_rows(&mut stmt, []).unwrap();

        assert_eq!(result.columns, vec!["i", "r", "t", "n", "b"]);
        assert_eq!(
            result.rows,
            vec![vec![
                Value::Integer(1),
                Value::Real(2.5),
                Value::Text("x".into()),
                Value::Null,
                Value::Blob(vec![0x00, 0xff]),
            ]]
        );
    }

    #[test]
    fn test_read_rows_keeps_columns_for_empty_result() {
        let conn = Connection::open_in_memory().unwrap();
        let mut stmt = conn.prepare("SELECT 1 AS a WHERE 0").unwrap();
        let result = read_rows(&mut stmt, []).unwrap();
        assert_eq!(result.columns, vec!["a"]);
        assert!(result.is_empty());
    }

    #[test]
    fn test_is_numeric_text() {
        assert!(is_numeric_text("10.50"));
        assert!(is_numeric_text(" 42 "));
        assert!(is_numeric_text("-1e3"));
        assert!(!is_numeric_text("abc"));
        assert!(!is_numeric_text(""));
        assert!(!is_numeric_text("NaN"));
        assert!(!is_numeric_text("inf"));
        assert!(!is_numeric_text("0x10"));
    }

    #[test]
    fn test_is_integral_text() {
        assert!(is_integral_text("42"));
        assert!(is_integral_text(" -7 "));
        assert!(is_integral_text("10.0"));
        assert!(!is_integral_text("10.50"));
        assert!(!is_integral_text("1e3"));
        assert!(!is_integral_text("abc"));
        assert!(!is_integral_text("1e30"));
    }

    #[test]
    fn test_integer_cast_truncates_in_sqlite() {
        let conn = Connection::open_in_memory().unwrap();
        let (text, real): (i64, i64) = conn
            .query_row("SELECT CAST('10.50' AS INTEGER), CAST(10.5 AS INTEGER)", [], |row| {
                Ok((row.get(0)?, row.get(1)?))
            })
            .unwrap();
        assert_eq!((text, real), (10, 10));
        assert!(!is_integral_text("10.50"));
        assert!(!is_integral_real(10.5));
        assert!(is_integral_real(20.0));
    }
}
