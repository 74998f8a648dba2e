//! Data model shared by the storage, migration and interchange crates.
//!
//! The central exchange shape is [`TabularResult`]: ordered column names with
//! aligned rows of [`Value`]s. Query results, table samples and normalized
//! imports ([`ImportBatch`]) all use it.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A single cell value.
///
/// Mirrors SQLite's storage classes, plus [`Value::Boolean`] for columns whose
/// values were inferred as booleans on import. Booleans are stored as the
/// integers `1` and `0`.
///
/// The `Display` impl renders the delimited-text form used for CSV export:
/// nulls are empty, whole reals keep one decimal place, and booleans are
/// `True`/`False`.
///
/// # Examples
///
/// ```
/// use csvman_core::Value;
///
/// assert_eq!(Value::Real(20.0).to_string(), "20.0");
/// assert_eq!(Value::Boolean(true).to_string(), "True");
/// assert_eq!(Value::Null.to_string(), "");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Boolean(bool),
    Text(String),
    Blob(Vec<u8>),
}

impl Value {
    /// Returns the column kind this value belongs to, or `None` for nulls.
    pub fn kind(&self) -> Option<ColumnKind> {
        match self {
            Value::Null => None,
            Value::Integer(_) => Some(ColumnKind::Integer),
            Value::Real(_) => Some(ColumnKind::Real),
            Value::Boolean(_) => Some(ColumnKind::Boolean),
            Value::Text(_) => Some(ColumnKind::Text),
            Value::Blob(_) => Some(ColumnKind::Blob),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Real(r) => f.write_str(&format_real(*r)),
            Value::Boolean(true) => f.write_str("True"),
            Value::Boolean(false) => f.write_str("False"),
            Value::Text(s) => f.write_str(s),
            Value::Blob(b) => f.write_str(&String::from_utf8_lossy(b)),
        }
    }
}

/// Formats a real so that it re-parses as a real.
///
/// Whole numbers keep a trailing `.0` (`20.0`, not `20`), which keeps a
/// real column real after an export/import round trip.
pub fn format_real(value: f64) -> String {
    let text = format!("{value}");
    if value.is_finite() && text.parse::<i64>().is_ok() {
        format!("{text}.0")
    } else {
        text
    }
}

/// Inferred kind of a column of values.
///
/// Used to pick the declared SQL type when a table is created from data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnKind {
    Integer,
    Real,
    Boolean,
    Text,
    Blob,
}

impl ColumnKind {
    /// Declared SQL type used when creating a column of this kind.
    pub fn declared_type(self) -> &'static str {
        match self {
            ColumnKind::Integer => "INTEGER",
            ColumnKind::Real => "REAL",
            ColumnKind::Boolean => "BOOLEAN",
            ColumnKind::Text => "TEXT",
            ColumnKind::Blob => "BLOB",
        }
    }

    /// Combines two kinds observed in the same column.
    ///
    /// Integers widen to reals; any other mix falls back to text.
    pub fn join(self, other: ColumnKind) -> ColumnKind {
        use ColumnKind::*;
        match (self, other) {
            (a, b) if a == b => a,
            (Integer, Real) | (Real, Integer) => Real,
            _ => Text,
        }
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.declared_type())
    }
}

/// SQLite type affinity of a declared column type.
///
/// Computed with SQLite's own substring rules, in order: `INT` gives
/// integer; `CHAR`, `CLOB` or `TEXT` give text; `BLOB` or an empty type give
/// blob; `REAL`, `FLOA` or `DOUB` give real; anything else is numeric.
///
/// # Examples
///
/// ```
/// use csvman_core::TypeAffinity;
///
/// assert_eq!(TypeAffinity::of("FLOAT(30,4)"), TypeAffinity::Real);
/// assert_eq!(TypeAffinity::of("VARCHAR(255)"), TypeAffinity::Text);
/// assert_eq!(TypeAffinity::of("BOOLEAN"), TypeAffinity::Numeric);
/// assert!(TypeAffinity::of("BOOLEAN").is_numeric());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeAffinity {
    Integer,
    Text,
    Blob,
    Real,
    Numeric,
}

impl TypeAffinity {
    pub fn of(declared_type: &str) -> TypeAffinity {
        let upper = declared_type.to_ascii_uppercase();
        if upper.contains("INT") {
            TypeAffinity::Integer
        } else if upper.contains("CHAR") || upper.contains("CLOB") || upper.contains("TEXT") {
            TypeAffinity::Text
        } else if upper.contains("BLOB") || upper.trim().is_empty() {
            TypeAffinity::Blob
        } else if upper.contains("REAL") || upper.contains("FLOA") || upper.contains("DOUB") {
            TypeAffinity::Real
        } else {
            TypeAffinity::Numeric
        }
    }

    /// Returns `true` for affinities that convert text to numbers.
    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            TypeAffinity::Integer | TypeAffinity::Real | TypeAffinity::Numeric
        )
    }
}

/// A column as reported by table introspection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
    /// Declared type exactly as stored in the table definition.
    pub declared_type: String,
}

impl ColumnInfo {
    pub fn new(name: impl Into<String>, declared_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            declared_type: declared_type.into(),
        }
    }
}

/// Schema and size of one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableInfo {
    pub name: String,
    pub columns: Vec<ColumnInfo>,
    pub row_count: u64,
}

impl TableInfo {
    /// Looks up a column by name, ignoring ASCII case as SQLite does.
    pub fn column(&self, name: &str) -> Option<&ColumnInfo> {
        self.columns
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }
}

/// Import or write mode for [`TabularResult`] data landing in a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportMode {
    /// Keep existing rows and add the new ones.
    #[default]
    Append,
    /// Drop the table and recreate it from the data.
    Replace,
}

impl fmt::Display for ImportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportMode::Append => f.write_str("append"),
            ImportMode::Replace => f.write_str("replace"),
        }
    }
}

/// Ordered named columns with aligned rows.
///
/// # Examples
///
/// ```
/// use csvman_core::{ColumnKind, TabularResult, Value};
///
/// let result = TabularResult::new(vec!["id".into(), "amount".into()])
///     .with_rows(vec![
///         vec![Value::Integer(1), Value::Real(10.5)],
///         vec![Value::Integer(2), Value::Integer(20)],
///     ]);
///
/// assert_eq!(result.row_count(), 2);
/// assert_eq!(result.column_kinds(), vec![ColumnKind::Integer, ColumnKind::Real]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TabularResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
    /// Rows changed by a statement that produced no result columns.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows_affected: Option<usize>,
}

/// Normalized output of the import adapter, ready to be written to a table.
pub type ImportBatch = TabularResult;

impl TabularResult {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
            rows_affected: None,
        }
    }

    pub fn with_rows(mut self, rows: Vec<Vec<Value>>) -> Self {
        self.rows = rows;
        self
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Returns `true` when there are no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterates the values of one column.
    pub fn column_values(&self, index: usize) -> impl Iterator<Item = &Value> + '_ {
        self.rows.iter().filter_map(move |row| row.get(index))
    }

    /// Infers the kind of every column from its non-null values.
    ///
    /// A column with only nulls is [`ColumnKind::Text`].
    pub fn column_kinds(&self) -> Vec<ColumnKind> {
        (0..self.columns.len())
            .map(|idx| {
                self.column_values(idx)
                    .filter_map(Value::kind)
                    .reduce(ColumnKind::join)
                    .unwrap_or(ColumnKind::Text)
            })
            .collect()
    }

    /// Returns a copy holding only the first `n` rows.
    pub fn head(&self, n: usize) -> TabularResult {
        TabularResult {
            columns: self.columns.clone(),
            rows: self.rows.iter().take(n).cloned().collect(),
            rows_affected: self.rows_affected,
        }
    }
}
