//! Per-call access to one SQLite database file.
//!
//! [`Database`] is only a path. Every operation opens its own connection and
//! drops it before returning, so one logical operation is one connection
//! lifetime and nothing is shared between calls.
//!
//! # Example
//!
//! ```no_run
//! use csvman_core::{ImportMode, TabularResult, Value};
//! use csvman_sqlite::Database;
//!
//! let db = Database::new("sales.db");
//! let data = TabularResult::new(vec!["id".into(), "amount".into()])
//!     .with_rows(vec![vec![Value::Integer(1), Value::Text("10.50".into())]]);
//!
//! db.write_table("orders", &data, ImportMode::Replace).unwrap();
//! let info = db.describe_table("orders").unwrap();
//! println!("{} rows in {}", info.row_count, info.name);
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use csvman_core::{
    ColumnInfo, ImportMode, TableInfo, TabularResult, quote_identifier, validate_identifier,
};
use rusqlite::{Connection, OpenFlags, params_from_iter};
use serde::Serialize;
use tracing::{debug, info};

use crate::convert::{read_rows, to_sql_value};
use crate::error::{Result, StorageError};
use crate::schema::{
    count_rows, create_table_sql, drop_table_sql, find_table, insert_sql, resolve_table,
    table_columns, table_names,
};

/// A SQLite database identified by its file path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Database {
    path: PathBuf,
}

/// Outcome of [`Database::write_table`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WriteReport {
    /// Table name as stored after the write.
    pub table: String,
    pub mode: ImportMode,
    pub rows_written: usize,
    /// Whether the table was (re)created by this write.
    pub created: bool,
}

impl Database {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns `true` if the database file exists.
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Opens a connection, creating the file if needed.
    pub(crate) fn connect(&self) -> Result<Connection> {
        debug!(path = %self.path.display(), "Opening database");
        Ok(Connection::open(&self.path)?)
    }

    /// Opens a connection to a database that must already exist.
    pub(crate) fn connect_existing(&self) -> Result<Connection> {
        if !self.exists() {
            return Err(StorageError::DatabaseNotFound(self.path.clone()));
        }
        debug!(path = %self.path.display(), "Opening existing database");
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_URI
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        Ok(Connection::open_with_flags(&self.path, flags)?)
    }

    /// Lists table names in creation order.
    ///
    /// A database that does not exist yet has no tables; the file is not
    /// created.
    pub fn list_tables(&self) -> Result<Vec<String>> {
        if !self.exists() {
            return Ok(Vec::new());
        }
        let conn = self.connect_existing()?;
        table_names(&conn)
    }

    /// Returns the ordered columns and an eager row count of one table.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::DatabaseNotFound`] if the file is missing and
    /// [`StorageError::TableNotFound`] if the table is unknown.
    pub fn describe_table(&self, table: &str) -> Result<TableInfo> {
        let conn = self.connect_existing()?;
        describe(&conn, table)
    }

    /// Describes every table, in creation order, over one connection.
    pub fn describe_all(&self) -> Result<Vec<TableInfo>> {
        if !self.exists() {
            return Ok(Vec::new());
        }
        let conn = self.connect_existing()?;
        table_names(&conn)?
            .iter()
            .map(|name| describe(&conn, name))
            .collect()
    }

    /// Returns at most `limit` rows of a table in storage order.
    pub fn sample_rows(&self, table: &str, limit: usize) -> Result<TabularResult> {
        let conn = self.connect_existing()?;
        let table = resolve_table(&conn, table)?;
        let mut stmt = conn.prepare(&format!(
            "SELECT * FROM {} LIMIT ?1",
            quote_identifier(&table)
        ))?;
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        Ok(read_rows(&mut stmt, [limit])?)
    }

    /// Writes `data` into `table`.
    ///
    /// - [`ImportMode::Append`] onto an existing table requires the data to
    ///   carry exactly the table's columns (in any order, ignoring ASCII
    ///   case); rows are inserted by column name. Appending to a missing
    ///   table creates it.
    /// - [`ImportMode::Replace`] drops any existing table and recreates it
    ///   with the declared types inferred from `data`.
    ///
    /// The whole write is one transaction: on error the database is left as
    /// it was.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::SchemaMismatch`] for an incompatible append or
    /// a row whose width differs from the header, and
    /// [`StorageError::DuplicateColumn`] if `data` names a column twice.
    pub fn write_table(
        &self,
        table: &str,
        data: &TabularResult,
        mode: ImportMode,
    ) -> Result<WriteReport> {
        validate_identifier(table)?;
        check_columns(data)?;
        check_row_widths(table, data)?;

        let mut conn = self.connect()?;
        let tx = conn.transaction()?;

        let (target, created) = match (mode, find_table(&tx, table)?) {
            (ImportMode::Append, Some(existing)) => {
                let columns = table_columns(&tx, &existing)?;
                check_append_compatible(&existing, &columns, data)?;
                (existing, false)
            }
            (ImportMode::Replace, Some(existing)) => {
                debug!(table = %existing, "Dropping table for replace");
                tx.execute(&drop_table_sql(&existing), [])?;
                tx.execute(&create_table_sql(table, &inferred_columns(data)), [])?;
                (table.to_string(), true)
            }
            (_, None) => {
                tx.execute(&create_table_sql(table, &inferred_columns(data)), [])?;
                (table.to_string(), true)
            }
        };

        {
            let mut stmt = tx.prepare(&insert_sql(&target, &data.columns))?;
            for row in &data.rows {
                stmt.execute(params_from_iter(row.iter().map(to_sql_value)))?;
            }
        }
        tx.commit()?;

        info!(
            table = %target,
            mode = %mode,
            rows = data.row_count(),
            created,
            "Wrote table"
        );
        Ok(WriteReport {
            table: target,
            mode,
            rows_written: data.row_count(),
            created,
        })
    }

    /// Drops a table. Irreversible.
    pub fn drop_table(&self, table: &str) -> Result<()> {
        let conn = self.connect_existing()?;
        let table = resolve_table(&conn, table)?;
        conn.execute(&drop_table_sql(&table), [])?;
        info!(table = %table, path = %self.path.display(), "Dropped table");
        Ok(())
    }
}

fn describe(conn: &Connection, table: &str) -> Result<TableInfo> {
    let name = resolve_table(conn, table)?;
    let columns = table_columns(conn, &name)?;
    let row_count = count_rows(conn, &name)?;
    Ok(TableInfo {
        name,
        columns,
        row_count,
    })
}

/// Column definitions for a table created from `data`.
fn inferred_columns(data: &TabularResult) -> Vec<ColumnInfo> {
    data.columns
        .iter()
        .zip(data.column_kinds())
        .map(|(name, kind)| ColumnInfo::new(name.clone(), kind.declared_type()))
        .collect()
}

fn check_columns(data: &TabularResult) -> Result<()> {
    let mut seen = HashSet::new();
    for name in &data.columns {
        validate_identifier(name)?;
        if !seen.insert(name.to_ascii_lowercase()) {
            return Err(StorageError::DuplicateColumn(name.clone()));
        }
    }
    Ok(())
}

fn check_row_widths(table: &str, data: &TabularResult) -> Result<()> {
    let width = data.column_count();
    if let Some((idx, row)) = data.rows.iter().enumerate().find(|(_, r)| r.len() != width) {
        return Err(StorageError::SchemaMismatch {
            table: table.to_string(),
            detail: format!(
                "row {idx} has {} values but data has {width} columns",
                row.len()
            ),
        });
    }
    Ok(())
}

fn check_append_compatible(table: &str, columns: &[ColumnInfo], data: &TabularResult) -> Result<()> {
    let existing: HashSet<String> = columns.iter().map(|c| c.name.to_ascii_lowercase()).collect();
    let incoming: HashSet<String> = data.columns.iter().map(|c| c.to_ascii_lowercase()).collect();
    if existing == incoming {
        return Ok(());
    }
    let table_names: Vec<&str> = columns.iter().map(|c| c.name.as_str()).collect();
    Err(StorageError::SchemaMismatch {
        table: table.to_string(),
        detail: format!(
            "table has columns [{}] but data has [{}]",
            table_names.join(", "),
            data.columns.join(", ")
        ),
    })
}
