//! Schema introspection and SQL generation.
//!
//! Introspection reads `sqlite_master` and `pragma_table_info`. Generated
//! statements quote every identifier with
//! [`quote_identifier`](csvman_core::quote_identifier); callers resolve
//! existing names through [`resolve_table`] before building SQL for them.

use csvman_core::{ColumnInfo, quote_identifier, resolve_identifier};
use rusqlite::{Connection, params};

use crate::error::{Result, StorageError};

/// Suffix appended to a table name for the rebuild copy during migration.
pub const SHADOW_SUFFIX: &str = "_new";

/// Name of the shadow table used while rebuilding `table`.
pub fn shadow_table_name(table: &str) -> String {
    format!("{table}{SHADOW_SUFFIX}")
}

/// Lists user tables in `sqlite_master` order.
pub(crate) fn table_names(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite\\_%' ESCAPE '\\' ORDER BY rowid",
    )?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(names)
}

/// Resolves a table name against the schema, returning it as stored.
pub(crate) fn find_table(conn: &Connection, name: &str) -> Result<Option<String>> {
    let names = table_names(conn)?;
    Ok(resolve_identifier(names.iter().map(String::as_str), name).map(String::from))
}

/// Like [`find_table`], but a missing table is an error.
pub(crate) fn resolve_table(conn: &Connection, name: &str) -> Result<String> {
    find_table(conn, name)?.ok_or_else(|| StorageError::TableNotFound(name.to_string()))
}

/// Reads the ordered column list of an existing table.
pub(crate) fn table_columns(conn: &Connection, table: &str) -> Result<Vec<ColumnInfo>> {
    let mut stmt = conn.prepare("SELECT name, type FROM pragma_table_info(?1) ORDER BY cid")?;
    let columns = stmt
        .query_map(params![table], |row| {
            Ok(ColumnInfo::new(
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
            ))
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(columns)
}

/// Counts rows in an existing table.
pub(crate) fn count_rows(conn: &Connection, table: &str) -> Result<u64> {
    let count: i64 = conn.query_row(
        &format!("SELECT COUNT(*) FROM {}", quote_identifier(table)),
        [],
        |row| row.get(0),
    )?;
    Ok(count as u64)
}

/// Generates `CREATE TABLE` for the given column definitions.
pub fn create_table_sql(table: &str, columns: &[ColumnInfo]) -> String {
    let defs: Vec<String> = columns
        .iter()
        .map(|c| {
            if c.declared_type.trim().is_empty() {
                quote_identifier(&c.name)
            } else {
                format!("{} {}", quote_identifier(&c.name), c.declared_type)
            }
        })
        .collect();
    format!(
        "CREATE TABLE {} ({})",
        quote_identifier(table),
        defs.join(", ")
    )
}

/// Generates `DROP TABLE`.
pub fn drop_table_sql(table: &str) -> String {
    format!("DROP TABLE {}", quote_identifier(table))
}

/// Generates a positional `INSERT` naming every column.
pub fn insert_sql(table: &str, columns: &[String]) -> String {
    let names: Vec<String> = columns.iter().map(|c| quote_identifier(c)).collect();
    let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("?{i}")).collect();
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        quote_identifier(table),
        names.join(", "),
        placeholders.join(", ")
    )
}

/// Generates the copy step of a column rebuild.
///
/// Every column is selected in its original order; only `target` is wrapped
/// in `CAST(... AS new_type)`.
pub fn copy_with_cast_sql(
    source: &str,
    dest: &str,
    columns: &[ColumnInfo],
    target: &str,
    new_type: &str,
) -> String {
    let names: Vec<String> = columns.iter().map(|c| quote_identifier(&c.name)).collect();
    let selects: Vec<String> = columns
        .iter()
        .map(|c| {
            let quoted = quote_identifier(&c.name);
            if c.name == target {
                format!("CAST({quoted} AS {new_type})")
            } else {
                quoted
            }
        })
        .collect();
    format!(
        "INSERT INTO {} ({}) SELECT {} FROM {}",
        quote_identifier(dest),
        names.join(", "),
        selects.join(", "),
        quote_identifier(source)
    )
}

/// Generates `ALTER TABLE ... RENAME TO ...`.
pub fn rename_table_sql(from: &str, to: &str) -> String {
    format!(
        "ALTER TABLE {} RENAME TO {}",
        quote_identifier(from),
        quote_identifier(to)
    )
}
