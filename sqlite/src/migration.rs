//! Column type migration by table rebuild.
//!
//! SQLite cannot change a column's declared type in place, so
//! [`Database::change_column_type`] rebuilds the table:
//!
//! 1. read the ordered column list;
//! 2. replace the target column's type, keep every other definition;
//! 3. create the shadow table `<table>_new` with those definitions;
//! 4. copy every row, casting only the target column;
//! 5. drop the original table;
//! 6. rename the shadow table into place.
//!
//! Steps 3–6 run in one transaction, and the copied row count is checked
//! against the original before the drop. Any failure rolls everything back,
//! leaving the original table queryable.
//!
//! The shadow name is not made unique: if `<table>_new` already exists the
//! migration stops with [`StorageError::NameCollision`] and the caller has to
//! rename or drop that table first.
//!
//! Only column names and declared types survive the rebuild; constraints,
//! defaults and indexes of the original table are not carried over.

use csvman_core::{ColumnInfo, TypeAffinity, format_real, quote_identifier, resolve_identifier};
use rusqlite::Connection;
use rusqlite::types::ValueRef;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::convert::{is_integral_real, is_integral_text, is_numeric_text};
use crate::database::Database;
use crate::error::{Result, StorageError};
use crate::schema::{
    copy_with_cast_sql, count_rows, create_table_sql, drop_table_sql, find_table,
    rename_table_sql, resolve_table, shadow_table_name, table_columns,
};

/// Summary of a completed column type change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationReport {
    pub table: String,
    pub column: String,
    pub previous_type: String,
    pub new_type: String,
    pub rows_copied: u64,
}

impl Database {
    /// Changes the declared type of one column, converting its values.
    ///
    /// `new_type` is passed through verbatim to `CREATE TABLE` and `CAST`;
    /// an unusable type surfaces as the engine's error. Each statement is
    /// executed on its own, so the type string cannot add statements.
    ///
    /// # Errors
    ///
    /// - [`StorageError::TableNotFound`] / [`StorageError::ColumnNotFound`]
    ///   for unknown names.
    /// - [`StorageError::NameCollision`] if `<table>_new` already exists.
    /// - [`StorageError::CastError`] if `new_type` converts text to numbers
    ///   and an existing value is not numeric, or if `new_type` has integer
    ///   affinity and a value has a fractional part. SQLite's `CAST` would
    ///   silently turn the former into `0` and truncate the latter.
    /// - [`StorageError::MigrationError`] if the copy lost rows.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use csvman_sqlite::Database;
    ///
    /// let db = Database::new("sales.db");
    /// let report = db.change_column_type("orders", "amount", "FLOAT(30,4)").unwrap();
    /// assert_eq!(report.previous_type, "TEXT");
    /// ```
    pub fn change_column_type(
        &self,
        table: &str,
        column: &str,
        new_type: &str,
    ) -> Result<MigrationReport> {
        let mut conn = self.connect_existing()?;

        let table = resolve_table(&conn, table)?;
        let columns = table_columns(&conn, &table)?;
        let target = resolve_identifier(columns.iter().map(|c| c.name.as_str()), column)
            .map(String::from)
            .ok_or_else(|| StorageError::ColumnNotFound {
                table: table.clone(),
                column: column.to_string(),
            })?;

        let shadow = shadow_table_name(&table);
        if let Some(existing) = find_table(&conn, &shadow)? {
            warn!(table = %table, shadow = %existing, "Shadow table already exists");
            return Err(StorageError::NameCollision(existing));
        }

        check_castable(&conn, &table, &target, new_type)?;

        let mut previous_type = String::new();
        let rebuilt: Vec<ColumnInfo> = columns
            .iter()
            .map(|c| {
                if c.name == target {
                    previous_type = c.declared_type.clone();
                    ColumnInfo::new(c.name.clone(), new_type)
                } else {
                    c.clone()
                }
            })
            .collect();

        let tx = conn.transaction()?;
        debug!(table = %table, shadow = %shadow, "Creating shadow table");
        tx.execute(&create_table_sql(&shadow, &rebuilt), [])?;

        let copied = tx.execute(
            &copy_with_cast_sql(&table, &shadow, &columns, &target, new_type),
            [],
        )? as u64;
        let original = count_rows(&tx, &table)?;
        if copied != original {
            return Err(StorageError::MigrationError(format!(
                "copied {copied} of {original} rows from '{table}'"
            )));
        }

        tx.execute(&drop_table_sql(&table), [])?;
        tx.execute(&rename_table_sql(&shadow, &table), [])?;
        tx.commit()?;

        info!(
            table = %table,
            column = %target,
            from = %previous_type,
            to = new_type,
            rows = copied,
            "Changed column type"
        );
        Ok(MigrationReport {
            table,
            column: target,
            previous_type,
            new_type: new_type.to_string(),
            rows_copied: copied,
        })
    }
}

/// Rejects the migration if a numeric cast would destroy an existing value.
///
/// Any numeric target rejects text that is not a number. An integer target
/// also rejects values with a fractional part, which `CAST` would truncate.
fn check_castable(conn: &Connection, table: &str, column: &str, new_type: &str) -> Result<()> {
    let affinity = TypeAffinity::of(new_type);
    if !affinity.is_numeric() {
        return Ok(());
    }
    let integer = affinity == TypeAffinity::Integer;

    let quoted = quote_identifier(column);
    let mut stmt = conn.prepare(&format!(
        "SELECT {quoted} FROM {} WHERE {quoted} IS NOT NULL",
        quote_identifier(table)
    ))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let bad = match row.get_ref(0)? {
            ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
                let text = String::from_utf8_lossy(bytes);
                let ok = if integer {
                    is_integral_text(&text)
                } else {
                    is_numeric_text(&text)
                };
                (!ok).then(|| text.into_owned())
            }
            ValueRef::Real(f) if integer && !is_integral_real(f) => Some(format_real(f)),
            _ => None,
        };
        if let Some(value) = bad {
            return Err(StorageError::CastError {
                column: column.to_string(),
                value,
                target_type: new_type.to_string(),
            });
        }
    }
    Ok(())
}
